use thiserror::Error;

use timberline_core::{DomainError, UserId};

use crate::Caller;

/// Authorization failure: the caller does not hold the role a transition implies.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("caller is not the owner of this {0}")]
    NotOwner(&'static str),

    #[error("caller is not the professional assigned to this project")]
    NotAssignee,

    #[error("caller is not the recipient of this inquiry")]
    NotRecipient,
}

impl From<AuthzError> for DomainError {
    fn from(value: AuthzError) -> Self {
        DomainError::permission_denied(value.to_string())
    }
}

/// Require the caller to be the owner of a document.
///
/// - No IO
/// - No panics
pub fn ensure_owner(caller: &Caller, owner_id: UserId, what: &'static str) -> Result<(), AuthzError> {
    if caller.is(owner_id) {
        Ok(())
    } else {
        Err(AuthzError::NotOwner(what))
    }
}

/// Require the caller to be the professional currently assigned to a project.
///
/// An unassigned project has no assignee, so every caller is rejected.
pub fn ensure_assignee(caller: &Caller, assignee: Option<UserId>) -> Result<(), AuthzError> {
    match assignee {
        Some(id) if caller.is(id) => Ok(()),
        _ => Err(AuthzError::NotAssignee),
    }
}

/// Require the caller to be the professional an inquiry was sent to.
pub fn ensure_recipient(caller: &Caller, recipient_id: UserId) -> Result<(), AuthzError> {
    if caller.is(recipient_id) {
        Ok(())
    } else {
        Err(AuthzError::NotRecipient)
    }
}
