use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::{Role, Session};
use crate::database::models::{Profile, ProfileUpdate};
use crate::error::ApiError;
use crate::handlers::{required_text, PageQuery};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ProfileListQuery {
    pub role: Option<Role>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /api/admin/profiles?role=pending
pub async fn list(State(state): State<AppState>, Query(query): Query<ProfileListQuery>) -> ApiResult<Vec<Profile>> {
    let (limit, offset) = PageQuery {
        limit: query.limit,
        offset: query.offset,
    }
    .window(&state.config)?;

    let profiles = state.profiles().list(query.role, limit, offset).await?;
    Ok(ApiResponse::page(profiles, limit, offset))
}

/// GET /api/admin/profiles/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Profile> {
    let profile = state.profiles().get(id).await?;
    Ok(ApiResponse::success(profile))
}

/// PATCH /api/admin/profiles/:id - assign a role or fix the display name
pub async fn update(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
    Json(update): Json<ProfileUpdate>,
) -> ApiResult<Profile> {
    if let Some(name) = &update.full_name {
        required_text("full_name", name)?;
    }
    if id == session.user_id() && update.role.is_some_and(|role| !role.is_admin()) {
        return Err(ApiError::forbidden("Administrators cannot demote themselves"));
    }

    let profile = state.profiles().update(id, &update).await?;
    if let Some(role) = update.role {
        tracing::info!("Profile {} ({}) assigned role {} by {}", profile.id, profile.email, role, session.user_id());
    }
    Ok(ApiResponse::success(profile))
}

/// DELETE /api/admin/profiles/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    if id == session.user_id() {
        return Err(ApiError::forbidden("Administrators cannot delete their own profile"));
    }
    state.profiles().delete(id).await?;
    tracing::info!("Profile {} deleted by {}", id, session.user_id());
    Ok(ApiResponse::no_content())
}
