use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::Repository;
use crate::auth::{ProfileStore, Role};
use crate::database::manager::DatabaseError;
use crate::database::models::{NewProfile, Profile, ProfileUpdate};

#[derive(Clone)]
pub struct ProfileRepository {
    pool: PgPool,
}

impl ProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn base(&self) -> Repository<Profile> {
        Repository::new("profiles", self.pool.clone())
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<Profile>, DatabaseError> {
        self.base().select_id(id).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Profile, DatabaseError> {
        self.base().select_404(id).await
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Profile>, DatabaseError> {
        let row = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Insert unless the id or the email is already taken. `None` means
    /// another request created the profile first, or the email belongs to a
    /// different profile.
    pub async fn insert_if_absent(&self, new: &NewProfile) -> Result<Option<Profile>, DatabaseError> {
        let row = sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (id, email, full_name, role)
            VALUES ($1, $2, $3, 'pending')
            ON CONFLICT DO NOTHING
            RETURNING *
            "#,
        )
        .bind(new.id)
        .bind(&new.email)
        .bind(&new.full_name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn list(&self, role: Option<Role>, limit: i64, offset: i64) -> Result<Vec<Profile>, DatabaseError> {
        let rows = sqlx::query_as::<_, Profile>(
            r#"
            SELECT * FROM profiles
            WHERE ($1::user_role IS NULL OR role = $1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(role)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn update(&self, id: Uuid, update: &ProfileUpdate) -> Result<Profile, DatabaseError> {
        sqlx::query_as::<_, Profile>(
            r#"
            UPDATE profiles
            SET full_name = COALESCE($2, full_name),
                role = COALESCE($3, role),
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&update.full_name)
        .bind(update.role)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("profile {} not found", id)))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), DatabaseError> {
        self.base().delete_id(id).await
    }

    /// Number of profiles per role, every role present.
    pub async fn count_by_role(&self) -> Result<Vec<(Role, i64)>, DatabaseError> {
        let rows: Vec<(Role, i64)> =
            sqlx::query_as("SELECT role, COUNT(*) FROM profiles GROUP BY role")
                .fetch_all(&self.pool)
                .await?;

        Ok(Role::ALL
            .iter()
            .map(|role| {
                let count = rows.iter().find(|(r, _)| r == role).map(|(_, c)| *c).unwrap_or(0);
                (*role, count)
            })
            .collect())
    }
}

#[async_trait]
impl ProfileStore for ProfileRepository {
    async fn find_profile(&self, id: Uuid) -> Result<Option<Profile>, DatabaseError> {
        self.find(id).await
    }

    async fn find_profile_by_email(&self, email: &str) -> Result<Option<Profile>, DatabaseError> {
        self.find_by_email(email).await
    }

    async fn create_profile(&self, new: &NewProfile) -> Result<Option<Profile>, DatabaseError> {
        self.insert_if_absent(new).await
    }
}
