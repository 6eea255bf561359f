use axum::{
    extract::{Path, State},
    Json,
};
use common::models::Task;
use serde::Deserialize;
use uuid::Uuid;

use crate::handlers::{request_date, ErrorResponse, SuccessResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstantiateRequest {
    pub bundle_id: Uuid,
    pub anchor_date: String,
}

/// Create the template's tasks for an existing bundle
#[tracing::instrument(skip(state))]
pub async fn instantiate(
    State(state): State<AppState>,
    Path(template_id): Path<Uuid>,
    Json(req): Json<InstantiateRequest>,
) -> Result<SuccessResponse<Vec<Task>>, ErrorResponse> {
    let anchor_date = request_date("anchorDate", &req.anchor_date)?;

    let tasks = state
        .service
        .instantiate_template(template_id, req.bundle_id, anchor_date)
        .await?;
    Ok(SuccessResponse::new(tasks))
}
