use serde::Deserialize;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::Repository;
use crate::database::manager::DatabaseError;
use crate::database::models::{Case, CaseStatus, CaseUpdate, NewCase};
use crate::database::scope::Scope;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CaseFilter {
    pub status: Option<CaseStatus>,
    pub company_id: Option<Uuid>,
}

#[derive(Clone)]
pub struct CaseRepository {
    pool: PgPool,
}

impl CaseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        scope: Scope,
        filter: &CaseFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Case>, DatabaseError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT c.* FROM cases c WHERE ");
        scope.push_case_filter(&mut qb);
        push_case_criteria(&mut qb, filter);
        qb.push(" ORDER BY c.updated_at DESC LIMIT ");
        qb.push_bind(limit);
        qb.push(" OFFSET ");
        qb.push_bind(offset);

        let rows = qb.build_query_as::<Case>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    /// Case by id, `None` when it does not exist or is outside the scope.
    pub async fn find(&self, scope: Scope, id: Uuid) -> Result<Option<Case>, DatabaseError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT c.* FROM cases c WHERE c.id = ");
        qb.push_bind(id);
        qb.push(" AND ");
        scope.push_case_filter(&mut qb);

        let row = qb.build_query_as::<Case>().fetch_optional(&self.pool).await?;
        Ok(row)
    }

    /// Whether the user is analyst or lawyer on any case of the company.
    pub async fn is_assigned_to_company(&self, user_id: Uuid, company_id: Uuid) -> Result<bool, DatabaseError> {
        let (assigned,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM cases
                WHERE company_id = $1 AND (analyst_id = $2 OR lawyer_id = $2)
            )
            "#,
        )
        .bind(company_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(assigned)
    }

    pub async fn insert(&self, new: &NewCase) -> Result<Case, DatabaseError> {
        let row = sqlx::query_as::<_, Case>(
            r#"
            INSERT INTO cases (company_id, title, description, analyst_id, lawyer_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(new.company_id)
        .bind(new.title.trim())
        .bind(&new.description)
        .bind(new.analyst_id)
        .bind(new.lawyer_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Apply a PATCH. When `expected_status` is given the row is only
    /// written if its status still matches, so two concurrent transitions
    /// cannot both be validated against the same starting status.
    pub async fn update(
        &self,
        id: Uuid,
        update: &CaseUpdate,
        expected_status: Option<CaseStatus>,
    ) -> Result<Case, DatabaseError> {
        let row = sqlx::query_as::<_, Case>(
            r#"
            UPDATE cases
            SET title = COALESCE($2, title),
                description = CASE WHEN $3 THEN $4 ELSE description END,
                status = COALESCE($5, status),
                analyst_id = CASE WHEN $6 THEN $7 ELSE analyst_id END,
                lawyer_id = CASE WHEN $8 THEN $9 ELSE lawyer_id END,
                updated_at = now()
            WHERE id = $1 AND ($10::case_status IS NULL OR status = $10)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(update.title.as_deref().map(str::trim))
        .bind(update.description.is_some())
        .bind(update.description.clone().flatten())
        .bind(update.status)
        .bind(update.analyst_id.is_some())
        .bind(update.analyst_id.flatten())
        .bind(update.lawyer_id.is_some())
        .bind(update.lawyer_id.flatten())
        .bind(expected_status)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(case) = row {
            return Ok(case);
        }
        if expected_status.is_some() && self.exists(id).await? {
            return Err(DatabaseError::StaleWrite(format!(
                "case {} changed status while the update was in flight",
                id
            )));
        }
        Err(DatabaseError::NotFound(format!("case {} not found", id)))
    }

    async fn exists(&self, id: Uuid) -> Result<bool, DatabaseError> {
        Ok(Repository::<Case>::new("cases", self.pool.clone()).select_id(id).await?.is_some())
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), DatabaseError> {
        Repository::<Case>::new("cases", self.pool.clone()).delete_id(id).await
    }

    /// Visible cases per status, every status present.
    pub async fn count_by_status(&self, scope: Scope) -> Result<Vec<(CaseStatus, i64)>, DatabaseError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT c.status, COUNT(*) FROM cases c WHERE ");
        scope.push_case_filter(&mut qb);
        qb.push(" GROUP BY c.status");

        let rows: Vec<(CaseStatus, i64)> = qb.build_query_as().fetch_all(&self.pool).await?;
        Ok(CaseStatus::ALL
            .iter()
            .map(|status| {
                let count = rows.iter().find(|(s, _)| s == status).map(|(_, c)| *c).unwrap_or(0);
                (*status, count)
            })
            .collect())
    }
}

fn push_case_criteria(qb: &mut QueryBuilder<'_, Postgres>, filter: &CaseFilter) {
    if let Some(status) = filter.status {
        qb.push(" AND c.status = ");
        qb.push_bind(status);
    }
    if let Some(company_id) = filter.company_id {
        qb.push(" AND c.company_id = ");
        qb.push_bind(company_id);
    }
}
