use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use timberline_infra::{ErrorKind, ServiceError};

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Unauthenticated => StatusCode::UNAUTHORIZED,
        ErrorKind::InvalidArgument => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::PermissionDenied => StatusCode::FORBIDDEN,
        ErrorKind::FailedPrecondition => StatusCode::PRECONDITION_FAILED,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn json_error(kind: ErrorKind, message: &str) -> Response {
    (
        status_for(kind),
        Json(json!({
            "success": false,
            "error": {
                "kind": kind,
                "message": message,
            }
        })),
    )
        .into_response()
}

/// Internal failures are logged and replaced by a generic message.
pub fn service_error_to_response(err: ServiceError) -> Response {
    match err.kind() {
        ErrorKind::Internal => {
            tracing::error!(error = %err, "internal error");
            json_error(ErrorKind::Internal, "internal error")
        }
        kind => {
            tracing::debug!(%kind, message = err.message(), "request rejected");
            json_error(kind, err.message())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_has_a_distinct_status() {
        let kinds = [
            ErrorKind::Unauthenticated,
            ErrorKind::InvalidArgument,
            ErrorKind::NotFound,
            ErrorKind::PermissionDenied,
            ErrorKind::FailedPrecondition,
            ErrorKind::Internal,
        ];
        let mut statuses: Vec<u16> = kinds.iter().map(|k| status_for(*k).as_u16()).collect();
        statuses.sort_unstable();
        statuses.dedup();
        assert_eq!(statuses.len(), kinds.len());
    }

    #[test]
    fn internal_errors_hide_their_message() {
        let response = service_error_to_response(ServiceError::internal("document is corrupt"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = service_error_to_response(ServiceError::failed_precondition("already assigned"));
        assert_eq!(response.status(), StatusCode::PRECONDITION_FAILED);
    }
}
