use anyhow::{Context, Result};
use estate_i18n::api::{build_router, AppState};
use estate_i18n::config::Config;
use estate_i18n::db::{PgStore, TranslationStore};
use estate_i18n::scheduler;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("estate_i18n=info".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .init();

    info!("Starting listing translation service");

    // Load configuration from environment
    let config = Config::from_env()?;
    let registry = config.language_registry()?;
    info!(
        "Supported languages: {} (default: {})",
        registry.codes().collect::<Vec<_>>().join(", "),
        registry.default_code()
    );

    let store: Arc<dyn TranslationStore> = Arc::new(
        PgStore::connect(&config.database_url, config.db_max_connections)
            .await
            .context("Failed to connect to PostgreSQL")?,
    );
    info!("✓ Connected to database");

    let state = AppState::new(store, registry, config.api_key.clone());
    if state.api_key.is_none() {
        info!("API_KEY not set, admin routes are unauthenticated");
    }

    // Keep the scheduler alive for the lifetime of the server
    let _scheduler = if config.sync_schedule.is_empty() {
        None
    } else {
        Some(
            scheduler::start_scheduler(
                &config.sync_schedule,
                Arc::clone(&state.store),
                Arc::clone(&state.registry),
            )
            .await?,
        )
    };

    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("✓ Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
