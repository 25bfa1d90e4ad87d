use timberline_auth::{Caller, RoleKind};
use timberline_core::UserId;

/// Authenticated caller of a request.
///
/// Inserted by the auth middleware; present for every route except `/health`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CallerContext {
    caller: Caller,
}

impl CallerContext {
    pub fn new(caller: Caller) -> Self {
        Self { caller }
    }

    pub fn caller(&self) -> &Caller {
        &self.caller
    }

    pub fn user_id(&self) -> UserId {
        self.caller.user_id
    }

    pub fn role(&self) -> RoleKind {
        self.caller.role
    }
}
