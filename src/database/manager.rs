use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use tokio::sync::OnceCell;
use tracing::info;

use crate::config;
use crate::database::store::StoreError;

static POOL: OnceCell<PgPool> = OnceCell::const_new();

/// Lazily initialized connection pool for the application database.
pub struct DatabaseManager;

impl DatabaseManager {
    /// Get the shared pool, connecting on first use via `DATABASE_URL`.
    pub async fn pool() -> Result<PgPool, StoreError> {
        let pool = POOL
            .get_or_try_init(|| async {
                let url = std::env::var("DATABASE_URL")
                    .map_err(|_| StoreError::Query("DATABASE_URL is not set".to_string()))?;
                Self::connect(&url).await
            })
            .await?;
        Ok(pool.clone())
    }

    /// Build a pool with the configured limits and run pending migrations.
    pub async fn connect(url: &str) -> Result<PgPool, StoreError> {
        let db_config = &config::config().database;

        let pool = PgPoolOptions::new()
            .max_connections(db_config.max_connections)
            .acquire_timeout(Duration::from_secs(db_config.connection_timeout))
            .connect(url)
            .await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| StoreError::Query(format!("migration failed: {}", e)))?;

        info!("Connected database pool ({} max connections)", db_config.max_connections);
        Ok(pool)
    }
}
