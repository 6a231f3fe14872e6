use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use super::cases::visible_case;
use crate::auth::Session;
use crate::database::models::{ChatMessage, NewChatMessage};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    /// Id of the oldest message already loaded.
    pub before: Option<Uuid>,
    pub limit: Option<i64>,
}

/// GET /api/cases/:id/messages?before=&limit=
pub async fn list(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(case_id): Path<Uuid>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Vec<ChatMessage>> {
    let case = visible_case(&state, &session, case_id).await?;
    let limit = state.config.page_size(query.limit);
    let messages = state.chat().list_for_case(case.id, query.before, limit).await?;
    Ok(ApiResponse::success(messages))
}

/// POST /api/cases/:id/messages
pub async fn post(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(case_id): Path<Uuid>,
    Json(message): Json<NewChatMessage>,
) -> ApiResult<ChatMessage> {
    let case = visible_case(&state, &session, case_id).await?;
    let body = message
        .validated_body()
        .map_err(|problem| ApiError::field_error("body", problem))?;

    let saved = state.chat().insert(case.id, session.user_id(), body).await?;
    tracing::debug!("Message {} posted on case {} by {}", saved.id, case.id, session.user_id());
    Ok(ApiResponse::created(saved))
}
