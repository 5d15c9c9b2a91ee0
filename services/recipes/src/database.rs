//! Schema management for the recipe service

use common::{
    database::{DatabaseConfig, init_pool},
    error::{DatabaseError, DatabaseResult},
};
use sqlx::SqlitePool;
use tracing::info;

/// Apply the embedded migrations under `migrations/`
pub async fn run_migrations(pool: &SqlitePool) -> DatabaseResult<()> {
    info!("Running database migrations");

    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| DatabaseError::Migration(e.to_string()))?;

    info!("Database migrations applied");
    Ok(())
}

/// Open a pool and bring its schema up to date
pub async fn connect(config: &DatabaseConfig) -> DatabaseResult<SqlitePool> {
    let pool = init_pool(config).await?;
    run_migrations(&pool).await?;
    Ok(pool)
}

/// Fresh in-memory database with the schema applied
#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    connect(&DatabaseConfig::in_memory())
        .await
        .expect("failed to create test database")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_migrations_create_tables() {
        let pool = test_pool().await;

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name IN ('user', 'recipe', 'ingredient', 'step') ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();

        assert_eq!(tables, vec!["ingredient", "recipe", "step", "user"]);
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let pool = test_pool().await;
        run_migrations(&pool).await.unwrap();
    }
}
