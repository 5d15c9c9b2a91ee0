use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use common::database::DatabaseConfig;
use recipes::{AppState, config::Settings, database, imaging::ImageNormalizer, routes};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting recipe service");

    let settings = Settings::from_env()?;

    // Initialize database connection pool and schema
    let db_config = DatabaseConfig::from_env()?;
    let pool = database::connect(&db_config).await?;

    // Check database connectivity
    if common::database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    ImageNormalizer::new(settings.upload_dir())
        .ensure_dir()
        .await?;

    let app_state = AppState::new(pool, &settings);

    // Start the web server
    let app = routes::create_router(app_state, &settings);

    let listener = tokio::net::TcpListener::bind(settings.bind_addr()).await?;
    info!("Recipe service listening on {}", settings.bind_addr());

    axum::serve(listener, app).await?;

    Ok(())
}
