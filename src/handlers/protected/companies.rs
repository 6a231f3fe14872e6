use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use uuid::Uuid;

use crate::auth::Session;
use crate::database::models::{BmcBlock, Company, RiskAssessment, RiskInput};
use crate::error::ApiError;
use crate::handlers::PageQuery;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{access, RiskMatrix};
use crate::state::AppState;

/// GET /api/companies
pub async fn list(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Vec<Company>> {
    let (limit, offset) = page.window(&state.config)?;
    let companies = state.companies().list(session.scope(), limit, offset).await?;
    Ok(ApiResponse::page(companies, limit, offset))
}

/// GET /api/companies/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> ApiResult<Company> {
    let company = visible_company(&state, &session, id).await?;
    Ok(ApiResponse::success(company))
}

/// GET /api/companies/:id/risks - BMC risk matrix
pub async fn risks_get(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> ApiResult<RiskMatrix> {
    let company = visible_company(&state, &session, id).await?;
    let assessments = state.risks().list_for_company(company.id).await?;
    Ok(ApiResponse::success(RiskMatrix::build(company.id, assessments)))
}

/// PUT /api/companies/:id/risks/:block - set one block's risk level
pub async fn risk_put(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path((id, block)): Path<(Uuid, BmcBlock)>,
    Json(input): Json<RiskInput>,
) -> ApiResult<RiskAssessment> {
    let company = visible_company(&state, &session, id).await?;

    let assigned = session.role.is_staff()
        && state
            .cases()
            .is_assigned_to_company(session.user_id(), company.id)
            .await?;
    if !access::can_assess_risk(session.role, assigned) {
        return Err(ApiError::forbidden("Only the assigned team or an administrator may assess risks"));
    }

    let assessment = state
        .risks()
        .upsert(company.id, block, &input, session.user_id())
        .await?;
    tracing::info!(
        "Risk for {:?} of company {} set to {:?} by {}",
        block,
        company.id,
        assessment.level,
        session.user_id()
    );
    Ok(ApiResponse::success(assessment))
}

async fn visible_company(state: &AppState, session: &Session, id: Uuid) -> Result<Company, ApiError> {
    state
        .companies()
        .find(session.scope(), id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Company {} not found", id)))
}
