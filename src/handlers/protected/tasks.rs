use axum::{
    extract::{Path, State},
    Extension, Json,
};
use uuid::Uuid;

use super::cases::visible_case;
use crate::auth::Session;
use crate::database::models::{NewTask, Task, TaskUpdate};
use crate::error::ApiError;
use crate::handlers::{ensure_assignment, required_text};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::access::{self, Assignment};
use crate::state::AppState;

/// GET /api/cases/:id/tasks
pub async fn list(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(case_id): Path<Uuid>,
) -> ApiResult<Vec<Task>> {
    let case = visible_case(&state, &session, case_id).await?;
    let tasks = state.tasks().list_for_case(case.id).await?;
    Ok(ApiResponse::success(tasks))
}

/// POST /api/cases/:id/tasks
pub async fn create(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(case_id): Path<Uuid>,
    Json(new_task): Json<NewTask>,
) -> ApiResult<Task> {
    let case = visible_case(&state, &session, case_id).await?;
    access::ensure_can_work_case(&session, &case)?;
    required_text("title", &new_task.title)?;
    ensure_assignment(&state, "assignee_id", new_task.assignee_id, Assignment::Team).await?;

    let task = state.tasks().insert(case.id, &new_task).await?;
    Ok(ApiResponse::created(task))
}

/// PATCH /api/tasks/:id - edit or move a task between board columns
pub async fn update(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
    Json(update): Json<TaskUpdate>,
) -> ApiResult<Task> {
    let task = workable_task(&state, &session, id).await?;
    if let Some(title) = &update.title {
        required_text("title", title)?;
    }
    ensure_assignment(&state, "assignee_id", update.assignee_id.flatten(), Assignment::Team).await?;

    let updated = state.tasks().update(task.id, &update).await?;
    Ok(ApiResponse::success(updated))
}

/// DELETE /api/tasks/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    let task = workable_task(&state, &session, id).await?;
    state.tasks().delete(task.id).await?;
    Ok(ApiResponse::no_content())
}

/// Task whose case the caller can see and work on.
async fn workable_task(state: &AppState, session: &Session, id: Uuid) -> Result<Task, ApiError> {
    let not_found = || ApiError::not_found(format!("Task {} not found", id));

    let task = state.tasks().find(id).await?.ok_or_else(not_found)?;
    let case = state
        .cases()
        .find(session.scope(), task.case_id)
        .await?
        .ok_or_else(not_found)?;
    access::ensure_can_work_case(session, &case)?;
    Ok(task)
}
