use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::State,
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use timberline_auth::JwtValidator;
use timberline_infra::ServiceError;

use crate::app::errors;
use crate::context::CallerContext;

#[derive(Clone)]
pub struct AuthState {
    pub jwt: Arc<dyn JwtValidator>,
}

pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let claims = match extract_bearer(req.headers()).and_then(|token| {
        state
            .jwt
            .validate(token, Utc::now())
            .map_err(|e| ServiceError::unauthenticated(e.to_string()))
    }) {
        Ok(claims) => claims,
        Err(err) => return errors::service_error_to_response(err),
    };

    req.extensions_mut().insert(CallerContext::new(claims.caller()));
    next.run(req).await
}

/// One log line per request.
pub async fn request_log(req: Request<axum::body::Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(req).await;

    tracing::info!(
        %method,
        path,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request"
    );
    response
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, ServiceError> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| ServiceError::unauthenticated("missing Authorization header"))?;

    let header = header
        .to_str()
        .map_err(|_| ServiceError::unauthenticated("Authorization header is not valid text"))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ServiceError::unauthenticated("expected a Bearer token"))?
        .trim();

    if token.is_empty() {
        return Err(ServiceError::unauthenticated("empty Bearer token"));
    }

    Ok(token)
}
