//! Error surface of every marketplace workflow.

use serde::Serialize;
use thiserror::Error;

use timberline_auth::AuthzError;
use timberline_core::DomainError;

use crate::document_store::StoreError;

/// Caller-visible failure category.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    Unauthenticated,
    InvalidArgument,
    NotFound,
    PermissionDenied,
    FailedPrecondition,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Unauthenticated => "unauthenticated",
            ErrorKind::InvalidArgument => "invalid-argument",
            ErrorKind::NotFound => "not-found",
            ErrorKind::PermissionDenied => "permission-denied",
            ErrorKind::FailedPrecondition => "failed-precondition",
            ErrorKind::Internal => "internal",
        }
    }
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct ServiceError {
    kind: ErrorKind,
    message: String,
    retryable: bool,
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthenticated, message)
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PermissionDenied, message)
    }

    pub fn failed_precondition(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::FailedPrecondition, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Only transient store failures are worth retrying.
    pub fn is_retryable(&self) -> bool {
        self.retryable
    }
}

impl From<DomainError> for ServiceError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => Self::invalid_argument(msg),
            DomainError::NotFound(msg) => Self::not_found(msg),
            DomainError::PermissionDenied(msg) => Self::permission_denied(msg),
            DomainError::FailedPrecondition(msg) => Self::failed_precondition(msg),
            DomainError::InvariantViolation(msg) => Self::internal(msg),
        }
    }
}

impl From<AuthzError> for ServiceError {
    fn from(value: AuthzError) -> Self {
        Self::permission_denied(value.to_string())
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Conflict(msg) => Self::failed_precondition(msg),
            StoreError::AlreadyExists(msg) => Self::failed_precondition(format!("already exists: {msg}")),
            StoreError::Missing(msg) => Self::not_found(msg),
            StoreError::Serialization(msg) => Self::internal(msg),
            StoreError::Unavailable(msg) => Self {
                kind: ErrorKind::Internal,
                message: msg,
                retryable: true,
            },
        }
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(value: serde_json::Error) -> Self {
        Self::internal(format!("document decoding failed: {value}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_most_specific_kind() {
        let cases = [
            (DomainError::validation("x"), ErrorKind::InvalidArgument),
            (DomainError::invalid_id("x"), ErrorKind::InvalidArgument),
            (DomainError::not_found("x"), ErrorKind::NotFound),
            (DomainError::permission_denied("x"), ErrorKind::PermissionDenied),
            (DomainError::precondition("x"), ErrorKind::FailedPrecondition),
            (DomainError::invariant("x"), ErrorKind::Internal),
        ];
        for (err, kind) in cases {
            assert_eq!(ServiceError::from(err).kind(), kind);
        }
    }

    #[test]
    fn only_unavailable_store_is_retryable() {
        assert!(ServiceError::from(StoreError::Unavailable("down".into())).is_retryable());
        assert!(!ServiceError::from(StoreError::Conflict("stale".into())).is_retryable());
        assert!(!ServiceError::from(DomainError::precondition("assigned")).is_retryable());
    }

    #[test]
    fn kind_wire_names() {
        assert_eq!(
            serde_json::to_value(ErrorKind::FailedPrecondition).unwrap(),
            serde_json::json!("failed-precondition")
        );
        assert_eq!(ErrorKind::PermissionDenied.to_string(), "permission-denied");
    }
}
