pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::{Extension, Router};
use tower::ServiceBuilder;

use timberline_auth::Hs256JwtValidator;
use timberline_infra::{AppConfig, InMemoryDocumentStore};

use crate::middleware::{AuthState, auth_middleware, request_log};

use self::services::{AppServices, Store};

/// Build the HTTP router over a fresh in-memory store.
pub fn build_app(config: &AppConfig) -> Router {
    build_app_with_store(config, Arc::new(InMemoryDocumentStore::new()))
}

/// Build the HTTP router over an existing store.
pub fn build_app_with_store(config: &AppConfig, store: Store) -> Router {
    let services = Arc::new(AppServices::new(store, config));

    let auth_state = AuthState {
        jwt: Arc::new(Hs256JwtValidator::new(config.jwt_secret.as_bytes())),
    };

    let protected = routes::router()
        .route_layer(axum::middleware::from_fn_with_state(auth_state, auth_middleware));

    Router::new()
        .merge(routes::public_router())
        .merge(protected)
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(request_log))
                .layer(Extension(services)),
        )
}
