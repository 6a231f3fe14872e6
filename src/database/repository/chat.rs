use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::ChatMessage;

#[derive(Clone)]
pub struct ChatRepository {
    pool: PgPool,
}

impl ChatRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The newest `limit` messages that precede message `before` (if given),
    /// returned oldest first. Messages are ordered by `(created_at, id)` so
    /// rows sharing a timestamp are neither repeated nor skipped across pages.
    pub async fn list_for_case(
        &self,
        case_id: Uuid,
        before: Option<Uuid>,
        limit: i64,
    ) -> Result<Vec<ChatMessage>, DatabaseError> {
        let mut rows = sqlx::query_as::<_, ChatMessage>(
            r#"
            SELECT m.* FROM chat_messages m
            WHERE m.case_id = $1
              AND (
                $2::uuid IS NULL
                OR (m.created_at, m.id) < (
                    SELECT b.created_at, b.id
                    FROM chat_messages b
                    WHERE b.id = $2 AND b.case_id = $1
                )
              )
            ORDER BY m.created_at DESC, m.id DESC
            LIMIT $3
            "#,
        )
        .bind(case_id)
        .bind(before)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.reverse();
        Ok(rows)
    }

    pub async fn insert(&self, case_id: Uuid, sender_id: Uuid, body: &str) -> Result<ChatMessage, DatabaseError> {
        let row = sqlx::query_as::<_, ChatMessage>(
            r#"
            INSERT INTO chat_messages (case_id, sender_id, body)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(case_id)
        .bind(sender_id)
        .bind(body)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }
}
