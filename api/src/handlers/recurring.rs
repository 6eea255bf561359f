use axum::{extract::State, Json};
use common::scheduler::GenerationReport;
use serde::Deserialize;

use crate::handlers::{request_date, ErrorResponse, SuccessResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub start_date: String,
    pub end_date: String,
}

/// Generate recurring tasks for an inclusive date range
#[tracing::instrument(skip(state))]
pub async fn generate(
    State(state): State<AppState>,
    Json(req): Json<GenerateRequest>,
) -> Result<SuccessResponse<GenerationReport>, ErrorResponse> {
    let start = request_date("startDate", &req.start_date)?;
    let end = request_date("endDate", &req.end_date)?;

    let report = state.service.generate_recurring_tasks(start, end).await?;
    Ok(SuccessResponse::new(report))
}
