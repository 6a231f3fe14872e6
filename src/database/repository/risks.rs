use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{BmcBlock, RiskAssessment, RiskInput};

#[derive(Clone)]
pub struct RiskRepository {
    pool: PgPool,
}

impl RiskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_for_company(&self, company_id: Uuid) -> Result<Vec<RiskAssessment>, DatabaseError> {
        let rows = sqlx::query_as::<_, RiskAssessment>(
            "SELECT * FROM risk_assessments WHERE company_id = $1",
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// One assessment per (company, block); a new value replaces the old one.
    pub async fn upsert(
        &self,
        company_id: Uuid,
        block: BmcBlock,
        input: &RiskInput,
        assessed_by: Uuid,
    ) -> Result<RiskAssessment, DatabaseError> {
        let row = sqlx::query_as::<_, RiskAssessment>(
            r#"
            INSERT INTO risk_assessments (company_id, block, level, notes, assessed_by)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (company_id, block) DO UPDATE
            SET level = EXCLUDED.level,
                notes = EXCLUDED.notes,
                assessed_by = EXCLUDED.assessed_by,
                updated_at = now()
            RETURNING *
            "#,
        )
        .bind(company_id)
        .bind(block)
        .bind(input.level)
        .bind(&input.notes)
        .bind(assessed_by)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }
}
