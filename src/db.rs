//! Postgres connection pool and schema migrations.

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::error::AppError;

/// Connects to Postgres and verifies the connection with a round trip.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool, AppError> {
    log::info!(
        "creating database pool (max_connections = {})",
        max_connections
    );
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(30))
        .connect(database_url)
        .await?;

    sqlx::query("SELECT 1").execute(&pool).await?;
    Ok(pool)
}

/// Applies the SQL files under `migrations/`.
pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    log::info!("running database migrations");
    sqlx::migrate!("./migrations").run(pool).await.map_err(|e| {
        log::error!("migration failed: {}", e);
        AppError::from(e)
    })
}
