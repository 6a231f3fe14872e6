pub mod cases;
pub mod chat;
pub mod companies;
pub mod profiles;
pub mod risks;
pub mod tasks;

use sqlx::{postgres::PgRow, FromRow, PgPool};
use uuid::Uuid;

use crate::database::manager::DatabaseError;

pub use cases::{CaseFilter, CaseRepository};
pub use chat::ChatRepository;
pub use companies::CompanyRepository;
pub use profiles::ProfileRepository;
pub use risks::RiskRepository;
pub use tasks::TaskRepository;

/// Id-keyed operations shared by every table.
pub struct Repository<T> {
    table_name: &'static str,
    pool: PgPool,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Repository<T>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    pub fn new(table_name: &'static str, pool: PgPool) -> Self {
        Self {
            table_name,
            pool,
            _phantom: std::marker::PhantomData,
        }
    }

    pub async fn select_id(&self, id: Uuid) -> Result<Option<T>, DatabaseError> {
        let sql = format!("SELECT * FROM {} WHERE id = $1", self.table_name);
        let row = sqlx::query_as::<_, T>(&sql).bind(id).fetch_optional(&self.pool).await?;
        Ok(row)
    }

    pub async fn select_404(&self, id: Uuid) -> Result<T, DatabaseError> {
        self.select_id(id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("{} record {} not found", self.table_name, id)))
    }

    pub async fn delete_id(&self, id: Uuid) -> Result<(), DatabaseError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", self.table_name);
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("{} record {} not found", self.table_name, id)));
        }
        Ok(())
    }

    pub async fn count(&self) -> Result<i64, DatabaseError> {
        let sql = format!("SELECT COUNT(*) FROM {}", self.table_name);
        let (count,): (i64,) = sqlx::query_as(&sql).fetch_one(&self.pool).await?;
        Ok(count)
    }
}
