use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::Repository;
use crate::database::manager::DatabaseError;
use crate::database::models::{Company, CompanyUpdate, NewCompany};
use crate::database::scope::Scope;

#[derive(Clone)]
pub struct CompanyRepository {
    pool: PgPool,
}

impl CompanyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, scope: Scope, limit: i64, offset: i64) -> Result<Vec<Company>, DatabaseError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT co.* FROM companies co WHERE ");
        scope.push_company_filter(&mut qb);
        qb.push(" ORDER BY co.name ASC LIMIT ");
        qb.push_bind(limit);
        qb.push(" OFFSET ");
        qb.push_bind(offset);

        let rows = qb.build_query_as::<Company>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    /// Company by id, `None` when it does not exist or is outside the scope.
    pub async fn find(&self, scope: Scope, id: Uuid) -> Result<Option<Company>, DatabaseError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT co.* FROM companies co WHERE co.id = ");
        qb.push_bind(id);
        qb.push(" AND ");
        scope.push_company_filter(&mut qb);

        let row = qb.build_query_as::<Company>().fetch_optional(&self.pool).await?;
        Ok(row)
    }

    pub async fn insert(&self, new: &NewCompany) -> Result<Company, DatabaseError> {
        let row = sqlx::query_as::<_, Company>(
            r#"
            INSERT INTO companies (name, tax_id, contact_email, client_id)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(new.name.trim())
        .bind(&new.tax_id)
        .bind(&new.contact_email)
        .bind(new.client_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn update(&self, id: Uuid, update: &CompanyUpdate) -> Result<Company, DatabaseError> {
        sqlx::query_as::<_, Company>(
            r#"
            UPDATE companies
            SET name = COALESCE($2, name),
                tax_id = CASE WHEN $3 THEN $4 ELSE tax_id END,
                contact_email = CASE WHEN $5 THEN $6 ELSE contact_email END,
                client_id = CASE WHEN $7 THEN $8 ELSE client_id END,
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(update.name.as_deref().map(str::trim))
        .bind(update.tax_id.is_some())
        .bind(update.tax_id.clone().flatten())
        .bind(update.contact_email.is_some())
        .bind(update.contact_email.clone().flatten())
        .bind(update.client_id.is_some())
        .bind(update.client_id.flatten())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("company {} not found", id)))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), DatabaseError> {
        Repository::<Company>::new("companies", self.pool.clone()).delete_id(id).await
    }

    pub async fn count(&self) -> Result<i64, DatabaseError> {
        Repository::<Company>::new("companies", self.pool.clone()).count().await
    }
}
