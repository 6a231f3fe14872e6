use axum::{
    extract::{Path, State},
    Extension, Json,
};
use uuid::Uuid;

use crate::auth::Session;
use crate::database::models::{Company, CompanyUpdate, NewCompany};
use crate::handlers::{ensure_assignment, required_text};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::access::Assignment;
use crate::state::AppState;

/// POST /api/admin/companies
pub async fn create(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(new_company): Json<NewCompany>,
) -> ApiResult<Company> {
    required_text("name", &new_company.name)?;
    ensure_assignment(&state, "client_id", new_company.client_id, Assignment::Client).await?;
    let company = state.companies().insert(&new_company).await?;
    tracing::info!("Company {} ({}) created by {}", company.name, company.id, session.user_id());
    Ok(ApiResponse::created(company))
}

/// PATCH /api/admin/companies/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(update): Json<CompanyUpdate>,
) -> ApiResult<Company> {
    if let Some(name) = &update.name {
        required_text("name", name)?;
    }
    ensure_assignment(&state, "client_id", update.client_id.flatten(), Assignment::Client).await?;
    let company = state.companies().update(id, &update).await?;
    Ok(ApiResponse::success(company))
}

/// DELETE /api/admin/companies/:id - cascades to cases, tasks, chat and risks
pub async fn delete(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    state.companies().delete(id).await?;
    tracing::info!("Company {} deleted by {}", id, session.user_id());
    Ok(ApiResponse::no_content())
}
