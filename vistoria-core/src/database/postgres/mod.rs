mod images;
mod users;

pub use images::PostgresImageRepository;
pub use users::PostgresUserRepository;

use std::{fmt, time::Duration};

use sqlx::{PgPool, postgres::PgPoolOptions};
use tracing::info;

use crate::error::{CatalogError, Result};

/// Shared PostgreSQL handle.
///
/// Built once at startup and handed to the repositories; nothing in the
/// catalog opens connections on its own.
#[derive(Clone)]
pub struct PostgresDatabase {
    pool: PgPool,
    images: PostgresImageRepository,
    users: PostgresUserRepository,
}

impl fmt::Debug for PostgresDatabase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresDatabase")
            .field("pool_size", &self.pool.size())
            .field("idle_connections", &self.pool.num_idle())
            .finish()
    }
}

impl PostgresDatabase {
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections.max(1))
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .test_before_acquire(true)
            .connect(url)
            .await
            .map_err(|e| {
                CatalogError::StoreUnavailable(format!(
                    "Database connection failed: {e}"
                ))
            })?;

        info!(max_connections, "database pool initialized");
        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: PgPool) -> Self {
        let images = PostgresImageRepository::new(pool.clone());
        let users = PostgresUserRepository::new(pool.clone());
        Self {
            pool,
            images,
            users,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply pending migrations.
    pub async fn initialize_schema(&self) -> Result<()> {
        crate::MIGRATOR.run(&self.pool).await.map_err(|e| {
            CatalogError::StoreUnavailable(format!("Failed to run migrations: {e}"))
        })?;
        info!("database schema is up to date");
        Ok(())
    }

    pub fn images(&self) -> PostgresImageRepository {
        self.images.clone()
    }

    pub fn users(&self) -> PostgresUserRepository {
        self.users.clone()
    }
}
