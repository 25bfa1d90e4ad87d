use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, rejection::JsonRejection},
    response::Response,
};
use chrono::Utc;

use timberline_core::{ProjectId, SaleId};
use timberline_infra::WorkflowCommand;

use crate::app::dto::{SubmitCruiseRequest, parse_id, read_json, respond};
use crate::app::services::AppServices;
use crate::context::CallerContext;

fn transition(services: &AppServices, ctx: &CallerContext, raw_id: &str, command: WorkflowCommand) -> Response {
    respond(parse_id::<ProjectId>("projectId", Some(raw_id)).and_then(|project_id| {
        services
            .workflow
            .dispatch(ctx.caller(), project_id, command, Utc::now())
    }))
}

pub async fn get_project(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<CallerContext>,
    Path(id): Path<String>,
) -> Response {
    respond(
        parse_id::<ProjectId>("projectId", Some(id.as_str()))
            .and_then(|project_id| services.queries.get_project(ctx.caller(), project_id)),
    )
}

pub async fn submit_cruise(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<CallerContext>,
    Path(id): Path<String>,
    body: Result<Json<SubmitCruiseRequest>, JsonRejection>,
) -> Response {
    match read_json(body) {
        Ok(req) => transition(
            &services,
            &ctx,
            &id,
            WorkflowCommand::SubmitCruise {
                cruise_data: req.cruise_data,
                rate_sets: req.rate_sets,
            },
        ),
        Err(err) => respond::<()>(Err(err)),
    }
}

pub async fn retract_cruise(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<CallerContext>,
    Path(id): Path<String>,
) -> Response {
    transition(&services, &ctx, &id, WorkflowCommand::RetractCruise)
}

pub async fn approve_cruise(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<CallerContext>,
    Path(id): Path<String>,
) -> Response {
    transition(&services, &ctx, &id, WorkflowCommand::ApproveCruise)
}

/// The sale id is fixed per request and reused across commit retries.
pub async fn post_to_marketplace(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<CallerContext>,
    Path(id): Path<String>,
) -> Response {
    transition(
        &services,
        &ctx,
        &id,
        WorkflowCommand::PostToMarketplace { sale_id: SaleId::new() },
    )
}

pub async fn decline_engagement(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<CallerContext>,
    Path(id): Path<String>,
) -> Response {
    transition(&services, &ctx, &id, WorkflowCommand::DeclineEngagement)
}

pub async fn complete_harvest(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<CallerContext>,
    Path(id): Path<String>,
) -> Response {
    transition(&services, &ctx, &id, WorkflowCommand::CompleteHarvest)
}

pub async fn inventory(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<CallerContext>,
    Path(id): Path<String>,
) -> Response {
    respond(
        parse_id::<ProjectId>("projectId", Some(id.as_str()))
            .and_then(|project_id| services.queries.inventory(ctx.caller(), project_id)),
    )
}

pub async fn report(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<CallerContext>,
    Path(id): Path<String>,
) -> Response {
    respond(
        parse_id::<ProjectId>("projectId", Some(id.as_str()))
            .and_then(|project_id| services.queries.report(ctx.caller(), project_id)),
    )
}

pub async fn activity(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<CallerContext>,
    Path(id): Path<String>,
) -> Response {
    respond(
        parse_id::<ProjectId>("projectId", Some(id.as_str()))
            .and_then(|project_id| services.queries.activity(ctx.caller(), project_id)),
    )
}
