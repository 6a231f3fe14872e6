use axum::{extract::State, Extension, Json};
use serde::Deserialize;

use crate::auth::Session;
use crate::database::models::ProfileUpdate;
use crate::handlers::required_text;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /api/auth/session - the caller's profile, role and landing path
pub async fn session_get(Extension(session): Extension<Session>) -> ApiResult<Session> {
    Ok(ApiResponse::success(session))
}

#[derive(Debug, Deserialize)]
pub struct OwnProfileUpdate {
    pub full_name: String,
}

/// PATCH /api/auth/profile - update the caller's display name. The role is
/// never taken from this body.
pub async fn profile_patch(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(body): Json<OwnProfileUpdate>,
) -> ApiResult<Session> {
    let full_name = required_text("full_name", &body.full_name)?;
    let update = ProfileUpdate {
        full_name: Some(full_name.to_string()),
        role: None,
    };

    let profile = state.profiles().update(session.user_id(), &update).await?;
    Ok(ApiResponse::success(Session::new(profile, false)))
}
