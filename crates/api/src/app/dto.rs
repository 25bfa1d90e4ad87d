use core::str::FromStr;

use axum::{
    Json,
    extract::rejection::JsonRejection,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use timberline_auth::Role;
use timberline_core::DomainError;
use timberline_infra::{InquiryOutcome, ServiceError, ServiceResult};
use timberline_marketplace::Inquiry;
use timberline_projects::{CruiseData, RateSet};

use super::errors::service_error_to_response;

/// Parse a required identifier; missing or blank values are `invalid-argument`.
pub fn parse_id<T>(field: &str, raw: Option<&str>) -> ServiceResult<T>
where
    T: FromStr<Err = DomainError>,
{
    match raw.map(str::trim) {
        None | Some("") => Err(ServiceError::invalid_argument(format!("{field} is required"))),
        Some(value) => T::from_str(value).map_err(ServiceError::from),
    }
}

pub fn read_json<T>(body: Result<Json<T>, JsonRejection>) -> ServiceResult<T> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ServiceError::invalid_argument(rejection.body_text()))
}

/// `{ "success": true, "data": ... }`, or the mapped error.
pub fn respond<T: Serialize>(result: ServiceResult<T>) -> Response {
    match result {
        Ok(data) => Json(json!({ "success": true, "data": data })).into_response(),
        Err(err) => service_error_to_response(err),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptQuoteRequest {
    #[serde(default)]
    pub quote_id: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterProfileRequest {
    pub display_name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub role: Role,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    #[serde(default)]
    pub property_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitCruiseRequest {
    pub cruise_data: CruiseData,
    #[serde(default)]
    pub rate_sets: Option<Vec<RateSet>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendInquiryRequest {
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub to_user_id: Option<String>,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitQuoteRequest {
    pub amount: f64,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InquiryOutcomeView {
    pub inquiry: Inquiry,
    pub project_cancelled: bool,
}

impl From<InquiryOutcome> for InquiryOutcomeView {
    fn from(value: InquiryOutcome) -> Self {
        Self {
            inquiry: value.inquiry,
            project_cancelled: value.project_cancelled,
        }
    }
}
