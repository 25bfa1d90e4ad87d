//! Optimistic read-decide-commit loop shared by the workflows.

use timberline_auth::AuthzError;
use timberline_core::DomainError;

use crate::document_store::StoreError;
use crate::error::ServiceError;

/// Outcome of one attempt: a stale read is retried, anything else is final.
#[derive(Debug)]
pub(crate) enum AttemptError {
    Stale(String),
    Failed(ServiceError),
}

impl From<StoreError> for AttemptError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Conflict(msg) => AttemptError::Stale(msg),
            other => AttemptError::Failed(other.into()),
        }
    }
}

impl From<ServiceError> for AttemptError {
    fn from(value: ServiceError) -> Self {
        AttemptError::Failed(value)
    }
}

impl From<DomainError> for AttemptError {
    fn from(value: DomainError) -> Self {
        AttemptError::Failed(value.into())
    }
}

impl From<AuthzError> for AttemptError {
    fn from(value: AuthzError) -> Self {
        AttemptError::Failed(value.into())
    }
}

impl From<serde_json::Error> for AttemptError {
    fn from(value: serde_json::Error) -> Self {
        AttemptError::Failed(value.into())
    }
}

/// Run `attempt` until it commits, fails for a real reason, or `max_attempts`
/// stale reads have been seen.
///
/// Every retry re-reads and re-validates, so a loser of a race normally
/// reports the guard that now rejects it rather than the conflict itself.
pub(crate) fn commit_with_retry<T>(
    operation: &'static str,
    max_attempts: u32,
    mut attempt: impl FnMut() -> Result<T, AttemptError>,
) -> Result<T, ServiceError> {
    let max_attempts = max_attempts.max(1);
    let mut tries = 0;
    loop {
        tries += 1;
        match attempt() {
            Ok(value) => return Ok(value),
            Err(AttemptError::Failed(err)) => return Err(err),
            Err(AttemptError::Stale(msg)) if tries < max_attempts => {
                tracing::debug!(operation, attempt = tries, conflict = %msg, "stale read; retrying");
            }
            Err(AttemptError::Stale(msg)) => {
                tracing::warn!(operation, attempts = tries, conflict = %msg, "giving up after repeated conflicts");
                return Err(ServiceError::failed_precondition(format!(
                    "{operation}: document changed concurrently, reload and try again"
                )));
            }
        }
    }
}
