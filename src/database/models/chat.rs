use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const MAX_MESSAGE_CHARS: usize = 4000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ChatMessage {
    pub id: Uuid,
    pub case_id: Uuid,
    pub sender_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewChatMessage {
    pub body: String,
}

impl NewChatMessage {
    /// Trimmed body, or the reason it cannot be posted.
    pub fn validated_body(&self) -> Result<&str, &'static str> {
        let body = self.body.trim();
        if body.is_empty() {
            return Err("Message body cannot be empty");
        }
        if body.chars().count() > MAX_MESSAGE_CHARS {
            return Err("Message body is too long");
        }
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(body: &str) -> NewChatMessage {
        NewChatMessage { body: body.to_string() }
    }

    #[test]
    fn trims_body() {
        assert_eq!(msg("  hola  ").validated_body(), Ok("hola"));
    }

    #[test]
    fn rejects_blank_and_oversized() {
        assert!(msg("   ").validated_body().is_err());
        assert!(msg(&"a".repeat(MAX_MESSAGE_CHARS + 1)).validated_body().is_err());
        assert!(msg(&"ñ".repeat(MAX_MESSAGE_CHARS)).validated_body().is_ok());
    }
}
