use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::{Role, Session};
use crate::database::models::{Case, CaseStatus, CaseUpdate, NewCase};
use crate::database::repository::CaseFilter;
use crate::error::ApiError;
use crate::handlers::{ensure_assignment, required_text, PageQuery};
use crate::middleware::{require_roles, ApiResponse, ApiResult};
use crate::services::access::{self, Assignment};
use crate::services::TaskBoard;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CaseListQuery {
    pub status: Option<CaseStatus>,
    pub company_id: Option<Uuid>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /api/cases?status=&company_id=&limit=&offset=
pub async fn list(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(query): Query<CaseListQuery>,
) -> ApiResult<Vec<Case>> {
    let (limit, offset) = PageQuery {
        limit: query.limit,
        offset: query.offset,
    }
    .window(&state.config)?;
    let filter = CaseFilter {
        status: query.status,
        company_id: query.company_id,
    };

    let cases = state.cases().list(session.scope(), &filter, limit, offset).await?;
    Ok(ApiResponse::page(cases, limit, offset))
}

/// POST /api/cases
pub async fn create(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(new_case): Json<NewCase>,
) -> ApiResult<Case> {
    if !access::can_create_case(session.role) {
        return Err(ApiError::forbidden("Only lawyers and administrators may open cases"));
    }
    required_text("title", &new_case.title)?;

    // A lawyer opening a case without naming one takes it on.
    let mut new_case = new_case;
    if session.role.is_lawyer() && new_case.lawyer_id.is_none() {
        new_case.lawyer_id = Some(session.user_id());
    }
    ensure_assignment(&state, "analyst_id", new_case.analyst_id, Assignment::Analyst).await?;
    ensure_assignment(&state, "lawyer_id", new_case.lawyer_id, Assignment::Lawyer).await?;

    let case = state.cases().insert(&new_case).await?;
    tracing::info!("Case {} opened for company {} by {}", case.id, case.company_id, session.user_id());
    Ok(ApiResponse::created(case))
}

/// GET /api/cases/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> ApiResult<Case> {
    let case = visible_case(&state, &session, id).await?;
    Ok(ApiResponse::success(case))
}

/// PATCH /api/cases/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
    Json(update): Json<CaseUpdate>,
) -> ApiResult<Case> {
    let case = visible_case(&state, &session, id).await?;
    access::check_case_update(&session, &case, &update)?;
    ensure_assignment(&state, "analyst_id", update.analyst_id.flatten(), Assignment::Analyst).await?;
    ensure_assignment(&state, "lawyer_id", update.lawyer_id.flatten(), Assignment::Lawyer).await?;

    // The transition was validated against `case.status`; only write if it
    // still holds.
    let expected_status = update.status.map(|_| case.status);
    let updated = state.cases().update(case.id, &update, expected_status).await?;
    if updated.status != case.status {
        tracing::info!(
            "Case {} moved from {} to {} by {}",
            case.id,
            case.status.as_str(),
            updated.status.as_str(),
            session.user_id()
        );
    }
    Ok(ApiResponse::success(updated))
}

/// DELETE /api/cases/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    require_roles(&session, &[Role::Admin])?;
    state.cases().delete(id).await?;
    tracing::info!("Case {} deleted by {}", id, session.user_id());
    Ok(ApiResponse::no_content())
}

/// GET /api/cases/:id/board - kanban of the case's tasks
pub async fn board(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> ApiResult<TaskBoard> {
    let case = visible_case(&state, &session, id).await?;
    let tasks = state.tasks().list_for_case(case.id).await?;
    Ok(ApiResponse::success(TaskBoard::build(tasks)))
}

/// Case by id through the caller's scope; invisible cases are reported as
/// missing.
pub(crate) async fn visible_case(state: &AppState, session: &Session, id: Uuid) -> Result<Case, ApiError> {
    state
        .cases()
        .find(session.scope(), id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Case {} not found", id)))
}
