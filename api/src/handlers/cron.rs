// Bundle auto-creation trigger and cron expression helpers

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, HeaderMap},
    Json,
};
use chrono::NaiveDate;
use common::cron::{matching_dates, next_matching_date, validate_cron_expression};
use common::scheduler::CronRunReport;
use serde::{Deserialize, Serialize};

use crate::handlers::{request_date, ErrorResponse, SuccessResponse};
use crate::state::AppState;

/// Days searched past the preview window for the next firing day
const NEXT_MATCH_HORIZON_DAYS: u32 = 366;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunCronRequest {
    /// Run date; defaults to today in the scheduler timezone
    pub now: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RunCronResponse {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub report: CronRunReport,
}

/// Run the bundle auto-creation pass
///
/// An empty body runs for today; anything else must be a well-formed JSON
/// request or nothing is generated.
#[tracing::instrument(skip(state, headers, body))]
pub async fn run_cron(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<SuccessResponse<RunCronResponse>, ErrorResponse> {
    let req = parse_run_cron_request(&headers, &body)?;
    let date = match req.now.as_deref() {
        Some(now) => request_date("now", now)?,
        None => state.today(),
    };

    let report = state.service.run_cron(date).await?;
    Ok(SuccessResponse::new(RunCronResponse { date, report }))
}

fn parse_run_cron_request(headers: &HeaderMap, body: &[u8]) -> Result<RunCronRequest, ErrorResponse> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(RunCronRequest::default());
    }

    let is_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim_start().to_ascii_lowercase().starts_with("application/json"))
        .unwrap_or(false);
    if !is_json {
        return Err(ErrorResponse::new(
            "validation_error",
            "Expected request with `Content-Type: application/json`",
        ));
    }

    serde_json::from_slice(body).map_err(|e| {
        ErrorResponse::new("validation_error", format!("Invalid request body: {}", e))
    })
}

#[derive(Debug, Deserialize)]
pub struct PreviewQuery {
    pub expression: String,
    pub start: String,
    pub end: String,
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub expression: String,
    pub dates: Vec<NaiveDate>,
    /// First firing day after the window, within a year
    pub next_after: Option<NaiveDate>,
}

/// List the days an expression fires on within `[start, end]`
#[tracing::instrument]
pub async fn preview(
    Query(query): Query<PreviewQuery>,
) -> Result<SuccessResponse<PreviewResponse>, ErrorResponse> {
    validate_cron_expression(&query.expression)?;
    let start = request_date("start", &query.start)?;
    let end = request_date("end", &query.end)?;

    let dates = matching_dates(&query.expression, start, end)?;
    let next_after = end
        .succ_opt()
        .and_then(|from| next_matching_date(&query.expression, from, NEXT_MATCH_HORIZON_DAYS));

    Ok(SuccessResponse::new(PreviewResponse {
        expression: query.expression,
        dates,
        next_after,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    pub expression: String,
}

#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Check whether an expression is accepted for recurring configs and templates
#[tracing::instrument]
pub async fn validate(Json(req): Json<ValidateRequest>) -> SuccessResponse<ValidateResponse> {
    let response = match validate_cron_expression(&req.expression) {
        Ok(()) => ValidateResponse {
            valid: true,
            reason: None,
        },
        Err(e) => ValidateResponse {
            valid: false,
            reason: Some(e.to_string()),
        },
    };
    SuccessResponse::new(response)
}
