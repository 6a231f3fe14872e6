//! Identity tokens and the per-request user session.
//!
//! Sign-in happens at the hosted identity provider. This service only
//! verifies the HS256 access tokens the provider issues and turns the
//! token subject into an application [`Session`] via [`bootstrap`].

pub mod bootstrap;
pub mod guard;
pub mod role;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::config::IdentityConfig;

pub use bootstrap::{bootstrap_profile, BootstrapError, ProfileStore, Session};
pub use guard::{guard, GuardDecision};
pub use role::Role;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_metadata: Option<Value>,
    pub exp: i64,
    pub iat: i64,
}

/// Authenticated caller as asserted by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub full_name: Option<String>,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        let full_name = claims.user_metadata.as_ref().and_then(|meta| {
            meta.get("full_name")
                .or_else(|| meta.get("name"))
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
        });

        Self {
            user_id: claims.sub,
            email: claims.email.map(|e| e.trim().to_lowercase()).filter(|e| !e.is_empty()),
            full_name,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("identity provider secret is not configured")]
    SecretNotConfigured,
    #[error("invalid identity token: {0}")]
    InvalidToken(String),
    #[error("token generation error: {0}")]
    TokenGeneration(String),
}

/// Verify a provider access token and return the caller's identity.
pub fn verify_token(token: &str, config: &IdentityConfig) -> Result<Identity, IdentityError> {
    if config.jwt_secret.is_empty() {
        return Err(IdentityError::SecretNotConfigured);
    }

    let mut validation = Validation::new(Algorithm::HS256);
    match &config.audience {
        Some(aud) => validation.set_audience(&[aud.as_str()]),
        None => validation.validate_aud = false,
    }

    let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
    let token_data = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|e| IdentityError::InvalidToken(e.to_string()))?;

    Ok(token_data.claims.into())
}

/// Mint a token shaped like the provider's, signed with the configured secret.
/// Used by the `token` CLI command and by tests.
pub fn issue_token(
    config: &IdentityConfig,
    user_id: Uuid,
    email: &str,
    full_name: Option<&str>,
) -> Result<String, IdentityError> {
    if config.jwt_secret.is_empty() {
        return Err(IdentityError::SecretNotConfigured);
    }

    let now = Utc::now();
    let claims = Claims {
        sub: user_id,
        email: Some(email.to_string()),
        aud: config.audience.clone(),
        user_metadata: full_name.map(|name| json!({ "full_name": name })),
        exp: (now + Duration::hours(config.token_expiry_hours as i64)).timestamp(),
        iat: now.timestamp(),
    };

    let encoding_key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
    encode(&Header::new(Algorithm::HS256), &claims, &encoding_key)
        .map_err(|e| IdentityError::TokenGeneration(e.to_string()))
}
