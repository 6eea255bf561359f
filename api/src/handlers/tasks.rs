use axum::extract::{Path, State};
use common::scheduler::TaskCompletion;
use uuid::Uuid;

use crate::handlers::{ErrorResponse, SuccessResponse};
use crate::state::AppState;

/// Mark a task done, applying its bundle stage transition if any
#[tracing::instrument(skip(state))]
pub async fn complete(
    State(state): State<AppState>,
    Path(task_id): Path<Uuid>,
) -> Result<SuccessResponse<TaskCompletion>, ErrorResponse> {
    let completion = state.service.complete_task(task_id).await?;
    Ok(SuccessResponse::new(completion))
}
