// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Service metadata, liveness and the front-end route guard. The guard accepts
// an optional bearer token so it can answer for signed-in and signed-out
// callers alike.

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::auth::{guard, GuardDecision, Role};
use crate::error::ApiError;
use crate::middleware::{bearer_token, resolve_session, ApiResponse, ApiResult};
use crate::state::AppState;

pub async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "Legality360 API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Legal case management with role-based dashboards",
            "endpoints": {
                "health": "/health (public)",
                "guard": "/auth/guard?path= (public, optional bearer token)",
                "session": "/api/auth/session, /api/auth/profile (authenticated)",
                "dashboard": "/api/dashboard (authenticated)",
                "companies": "/api/companies[/:id[/risks[/:block]]] (assigned roles)",
                "cases": "/api/cases[/:id[/board|/tasks|/messages]] (assigned roles)",
                "tasks": "/api/tasks/:id (assigned roles)",
                "admin": "/api/admin/profiles, /api/admin/companies (admin)"
            }
        }
    }))
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.db.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "code": "SERVICE_UNAVAILABLE",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GuardQuery {
    pub path: String,
}

#[derive(Debug, Serialize)]
pub struct GuardResponse {
    pub path: String,
    pub authenticated: bool,
    pub role: Option<Role>,
    pub decision: GuardDecision,
}

/// GET /auth/guard?path=/dashboard/admin
pub async fn guard_get(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<GuardQuery>,
) -> ApiResult<GuardResponse> {
    let role = match bearer_token(&headers)? {
        Some(token) => match resolve_session(&state, token).await {
            Ok(session) => Some(session.role),
            Err(ApiError::Unauthorized(_)) => None,
            Err(other) => return Err(other),
        },
        None => None,
    };

    Ok(ApiResponse::success(GuardResponse {
        decision: guard(role, &query.path),
        authenticated: role.is_some(),
        role,
        path: query.path,
    }))
}
