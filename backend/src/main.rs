use anyhow::Context;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use flashcard_backend::config::AppConfig;
use flashcard_backend::db::{connection, migrations};
use flashcard_backend::routes;
use flashcard_backend::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;
    tracing::info!(
        "Configuration loaded (env: {}, provider: {}, model: {})",
        std::env::var("RUN_ENV").unwrap_or_else(|_| "development".into()),
        config.llm.provider,
        config.llm.model
    );
    if config.generation.demo_mode {
        tracing::warn!("Demo mode enabled; flashcards come from offline templates");
    }

    let db_pool = connection::create_pool(&config.database)
        .await
        .context("Failed to create database pool")?;
    migrations::run_all(&db_pool)
        .await
        .context("Failed to run migrations")?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(config, db_pool);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    tracing::info!("Starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}
