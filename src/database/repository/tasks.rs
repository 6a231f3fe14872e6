use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::Repository;
use crate::database::manager::DatabaseError;
use crate::database::models::{NewTask, Task, TaskUpdate};
use crate::database::scope::Scope;

#[derive(Clone)]
pub struct TaskRepository {
    pool: PgPool,
}

impl TaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_for_case(&self, case_id: Uuid) -> Result<Vec<Task>, DatabaseError> {
        let rows = sqlx::query_as::<_, Task>(
            "SELECT * FROM tasks WHERE case_id = $1 ORDER BY created_at ASC",
        )
        .bind(case_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn list_for_assignee(&self, assignee_id: Uuid) -> Result<Vec<Task>, DatabaseError> {
        let rows = sqlx::query_as::<_, Task>(
            "SELECT * FROM tasks WHERE assignee_id = $1 ORDER BY due_date ASC NULLS LAST, created_at ASC",
        )
        .bind(assignee_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<Task>, DatabaseError> {
        Repository::<Task>::new("tasks", self.pool.clone()).select_id(id).await
    }

    pub async fn insert(&self, case_id: Uuid, new: &NewTask) -> Result<Task, DatabaseError> {
        let row = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (case_id, title, description, assignee_id, priority, due_date)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(case_id)
        .bind(new.title.trim())
        .bind(&new.description)
        .bind(new.assignee_id)
        .bind(new.priority)
        .bind(new.due_date)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn update(&self, id: Uuid, update: &TaskUpdate) -> Result<Task, DatabaseError> {
        sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET title = COALESCE($2, title),
                description = CASE WHEN $3 THEN $4 ELSE description END,
                assignee_id = CASE WHEN $5 THEN $6 ELSE assignee_id END,
                status = COALESCE($7, status),
                priority = COALESCE($8, priority),
                due_date = CASE WHEN $9 THEN $10 ELSE due_date END,
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(update.title.as_deref().map(str::trim))
        .bind(update.description.is_some())
        .bind(update.description.clone().flatten())
        .bind(update.assignee_id.is_some())
        .bind(update.assignee_id.flatten())
        .bind(update.status)
        .bind(update.priority)
        .bind(update.due_date.is_some())
        .bind(update.due_date.flatten())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("task {} not found", id)))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), DatabaseError> {
        Repository::<Task>::new("tasks", self.pool.clone()).delete_id(id).await
    }

    /// Tasks not yet completed on cases visible to the scope.
    pub async fn count_open(&self, scope: Scope) -> Result<i64, DatabaseError> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM tasks t JOIN cases c ON c.id = t.case_id WHERE t.status <> 'completada' AND ",
        );
        scope.push_case_filter(&mut qb);

        let (count,): (i64,) = qb.build_query_as().fetch_one(&self.pool).await?;
        Ok(count)
    }
}
