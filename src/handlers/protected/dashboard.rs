use axum::{extract::State, Extension};

use crate::auth::Session;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{build_dashboard, Dashboard};
use crate::state::AppState;

/// GET /api/dashboard - role-specific landing view
pub async fn dashboard_get(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> ApiResult<Dashboard> {
    let dashboard = build_dashboard(&state, &session).await?;
    Ok(ApiResponse::success(dashboard))
}
