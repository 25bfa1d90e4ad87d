use std::sync::Arc;

use axum::{Extension, Json, extract::rejection::JsonRejection, response::Response};
use chrono::Utc;

use timberline_core::PropertyId;
use timberline_infra::NewProperty;

use crate::app::dto::{CreateProjectRequest, RegisterProfileRequest, parse_id, read_json, respond};
use crate::app::services::AppServices;
use crate::context::CallerContext;

pub async fn register_profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<CallerContext>,
    body: Result<Json<RegisterProfileRequest>, JsonRejection>,
) -> Response {
    respond(read_json(body).and_then(|req| {
        services
            .onboarding
            .register_profile(ctx.caller(), &req.display_name, req.email, req.role)
    }))
}

pub async fn create_property(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<CallerContext>,
    body: Result<Json<NewProperty>, JsonRejection>,
) -> Response {
    respond(
        read_json(body).and_then(|input| services.onboarding.create_property(ctx.caller(), input, Utc::now())),
    )
}

pub async fn create_project(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<CallerContext>,
    body: Result<Json<CreateProjectRequest>, JsonRejection>,
) -> Response {
    respond(read_json(body).and_then(|req| {
        let property_id: PropertyId = parse_id("propertyId", req.property_id.as_deref())?;
        services.onboarding.create_project(
            ctx.caller(),
            property_id,
            req.name.as_deref().unwrap_or_default(),
            Utc::now(),
        )
    }))
}
