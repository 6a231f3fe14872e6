use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::auth::{bootstrap_profile, verify_token, Identity, Role, Session};
use crate::error::ApiError;
use crate::state::AppState;

/// Verifies the bearer token, resolves (or creates) the caller's profile and
/// injects the resulting [`Session`] into the request.
pub async fn session_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(&headers)?.ok_or_else(|| ApiError::unauthorized("Missing Authorization header"))?;
    let session = resolve_session(&state, token).await?;

    tracing::debug!(
        "Session for {} ({}) with role {}",
        session.profile.email,
        session.user_id(),
        session.role
    );

    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}

/// Rejects callers whose role is still `pending`.
pub async fn require_assigned_middleware(request: Request, next: Next) -> Result<Response, ApiError> {
    let session = session_of(&request)?;
    if !session.role.is_assigned() {
        return Err(ApiError::forbidden("Your account is awaiting role assignment"));
    }
    Ok(next.run(request).await)
}

/// Rejects everyone except administrators.
pub async fn require_admin_middleware(request: Request, next: Next) -> Result<Response, ApiError> {
    let session = session_of(&request)?;
    if !session.role.is_admin() {
        tracing::warn!("Non-admin {} attempted an admin operation", session.user_id());
        return Err(ApiError::forbidden("Administrator role required"));
    }
    Ok(next.run(request).await)
}

pub async fn resolve_session(state: &AppState, token: &str) -> Result<Session, ApiError> {
    let identity: Identity = verify_token(token, &state.config.identity)?;
    let session = bootstrap_profile(&state.profiles(), &identity, &state.config.bootstrap).await?;
    Ok(session)
}

/// Fail with 403 unless the session holds one of `roles`.
pub fn require_roles(session: &Session, roles: &[Role]) -> Result<(), ApiError> {
    if roles.contains(&session.role) {
        Ok(())
    } else {
        Err(ApiError::forbidden(format!(
            "Role '{}' may not perform this operation",
            session.role
        )))
    }
}

fn session_of(request: &Request) -> Result<&Session, ApiError> {
    request
        .extensions()
        .get::<Session>()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))
}

/// Token from `Authorization: Bearer ...`; `Ok(None)` when the header is absent.
pub fn bearer_token(headers: &HeaderMap) -> Result<Option<&str>, ApiError> {
    let Some(auth_header) = headers.get(axum::http::header::AUTHORIZATION) else {
        return Ok(None);
    };

    let auth_str = auth_header
        .to_str()
        .map_err(|_| ApiError::unauthorized("Invalid Authorization header format"))?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(Some(token.trim())),
        Some(_) => Err(ApiError::unauthorized("Empty bearer token")),
        None => Err(ApiError::unauthorized("Authorization header must use Bearer token format")),
    }
}
