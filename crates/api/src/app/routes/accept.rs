use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::rejection::JsonRejection,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde_json::json;

use timberline_core::{ProjectId, QuoteId};
use timberline_infra::ServiceResult;

use crate::app::dto::{AcceptQuoteRequest, parse_id, read_json};
use crate::app::errors::service_error_to_response;
use crate::app::services::AppServices;
use crate::context::CallerContext;

/// `acceptQuote` callable: `{ quoteId, projectId }` in, `{ success: true }` out.
pub async fn accept_quote(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<CallerContext>,
    body: Result<Json<AcceptQuoteRequest>, JsonRejection>,
) -> Response {
    match run(&services, &ctx, body) {
        Ok(()) => Json(json!({ "success": true })).into_response(),
        Err(err) => service_error_to_response(err),
    }
}

fn run(
    services: &AppServices,
    ctx: &CallerContext,
    body: Result<Json<AcceptQuoteRequest>, JsonRejection>,
) -> ServiceResult<()> {
    let req = read_json(body)?;
    let quote_id: QuoteId = parse_id("quoteId", req.quote_id.as_deref())?;
    let project_id: ProjectId = parse_id("projectId", req.project_id.as_deref())?;

    services
        .acceptance
        .accept_quote(ctx.caller(), quote_id, project_id, Utc::now())?;
    Ok(())
}
