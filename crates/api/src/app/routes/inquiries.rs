use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, rejection::JsonRejection},
    response::Response,
};
use chrono::Utc;

use timberline_core::{InquiryId, ProjectId, UserId};

use crate::app::dto::{
    InquiryOutcomeView, SendInquiryRequest, SubmitQuoteRequest, parse_id, read_json, respond,
};
use crate::app::services::AppServices;
use crate::context::CallerContext;

pub async fn send_inquiry(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<CallerContext>,
    body: Result<Json<SendInquiryRequest>, JsonRejection>,
) -> Response {
    respond(read_json(body).and_then(|req| {
        let project_id: ProjectId = parse_id("projectId", req.project_id.as_deref())?;
        let to_user_id: UserId = parse_id("toUserId", req.to_user_id.as_deref())?;
        services
            .inquiries
            .send_inquiry(ctx.caller(), project_id, to_user_id, &req.message, Utc::now())
    }))
}

pub async fn submit_quote(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<CallerContext>,
    Path(id): Path<String>,
    body: Result<Json<SubmitQuoteRequest>, JsonRejection>,
) -> Response {
    respond(read_json(body).and_then(|req| {
        let inquiry_id: InquiryId = parse_id("inquiryId", Some(id.as_str()))?;
        services
            .inquiries
            .submit_quote(ctx.caller(), inquiry_id, req.amount, &req.message, Utc::now())
    }))
}

pub async fn decline_inquiry(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<CallerContext>,
    Path(id): Path<String>,
) -> Response {
    respond(
        parse_id::<InquiryId>("inquiryId", Some(id.as_str()))
            .and_then(|inquiry_id| services.inquiries.decline_inquiry(ctx.caller(), inquiry_id, Utc::now()))
            .map(InquiryOutcomeView::from),
    )
}

pub async fn withdraw_inquiry(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<CallerContext>,
    Path(id): Path<String>,
) -> Response {
    respond(
        parse_id::<InquiryId>("inquiryId", Some(id.as_str()))
            .and_then(|inquiry_id| services.inquiries.withdraw_inquiry(ctx.caller(), inquiry_id, Utc::now()))
            .map(InquiryOutcomeView::from),
    )
}
