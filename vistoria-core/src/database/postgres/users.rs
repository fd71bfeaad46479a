use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;
use vistoria_model::{
    UserId, UserProfile, UserRecord,
    user::{DEFAULT_CREDIT_BALANCE, DEFAULT_PLAN_ID},
};

use crate::database::ports::users::UserRepository;
use crate::error::{CatalogError, Result};

const USER_COLUMNS: &str = r#"
    id, external_id, email, username, photo, first_name, last_name,
    plan_id, credit_balance, created_at
"#;

#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn map_row(row: &PgRow) -> Result<UserRecord> {
        let read = |column: &str, e: sqlx::Error| {
            CatalogError::StoreUnavailable(format!("Failed to read user {column}: {e}"))
        };

        let id: Uuid = row.try_get("id").map_err(|e| read("id", e))?;
        let created_at: DateTime<Utc> =
            row.try_get("created_at").map_err(|e| read("created_at", e))?;

        Ok(UserRecord {
            id: UserId(id),
            external_id: row.try_get("external_id").map_err(|e| read("external_id", e))?,
            email: row.try_get("email").map_err(|e| read("email", e))?,
            username: row.try_get("username").map_err(|e| read("username", e))?,
            photo: row.try_get("photo").map_err(|e| read("photo", e))?,
            first_name: row.try_get("first_name").map_err(|e| read("first_name", e))?,
            last_name: row.try_get("last_name").map_err(|e| read("last_name", e))?,
            plan_id: row.try_get("plan_id").map_err(|e| read("plan_id", e))?,
            credit_balance: row
                .try_get("credit_balance")
                .map_err(|e| read("credit_balance", e))?,
            created_at,
        })
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_id(&self, id: UserId) -> Result<Option<UserRecord>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id.to_uuid())
            .fetch_optional(self.pool())
            .await
            .map_err(|e| CatalogError::StoreUnavailable(format!("Failed to load user {id}: {e}")))?;

        row.as_ref().map(Self::map_row).transpose()
    }

    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<UserRecord>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE external_id = $1"
        ))
        .bind(external_id)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| {
            CatalogError::StoreUnavailable(format!("Failed to load user by external id: {e}"))
        })?;

        row.as_ref().map(Self::map_row).transpose()
    }

    async fn get_or_create(
        &self,
        external_id: &str,
        profile: &UserProfile,
    ) -> Result<UserRecord> {
        // The no-op DO UPDATE makes RETURNING yield the existing row on conflict.
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO users (
                id, external_id, email, username, photo, first_name, last_name,
                plan_id, credit_balance
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (external_id) DO UPDATE SET external_id = EXCLUDED.external_id
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(UserId::new().to_uuid())
        .bind(external_id)
        .bind(&profile.email)
        .bind(profile.effective_username())
        .bind(profile.photo.as_deref().unwrap_or_default())
        .bind(profile.first_name.as_deref())
        .bind(profile.last_name.as_deref())
        .bind(DEFAULT_PLAN_ID)
        .bind(DEFAULT_CREDIT_BALANCE)
        .fetch_one(self.pool())
        .await
        .map_err(|e| CatalogError::StoreUnavailable(format!("Failed to provision user: {e}")))?;

        Self::map_row(&row)
    }
}
