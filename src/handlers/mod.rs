// handlers/mod.rs - Three-tier handler layout
//
// Public (no auth) → Protected (identity token + profile) → Elevated (admin role)
pub mod elevated;
pub mod protected;
pub mod public;

use serde::Deserialize;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::services::access::{check_assignment, Assignment};
use crate::state::AppState;

/// `?limit=&offset=` paging window.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PageQuery {
    /// Clamp to the configured page size; negative offsets are rejected.
    pub fn window(&self, config: &AppConfig) -> Result<(i64, i64), ApiError> {
        let offset = self.offset.unwrap_or(0);
        if offset < 0 {
            return Err(ApiError::field_error("offset", "Offset must be zero or positive"));
        }
        Ok((config.page_size(self.limit), offset))
    }
}

/// Trimmed, non-empty text or a validation error naming `field`.
pub(crate) fn required_text<'a>(field: &str, value: &'a str) -> Result<&'a str, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::field_error(field, format!("{} is required", field)));
    }
    Ok(trimmed)
}

/// Check that `id`, when set, names a profile whose role fits `kind`.
pub(crate) async fn ensure_assignment(
    state: &AppState,
    field: &str,
    id: Option<Uuid>,
    kind: Assignment,
) -> Result<(), ApiError> {
    let Some(id) = id else {
        return Ok(());
    };
    let profile = state.profiles().find(id).await?;
    check_assignment(field, profile.as_ref(), kind)
}
