use anyhow::{Context, Result};
use std::sync::Arc;
use temple_reunion::api::{self, AppState};
use temple_reunion::config::Config;
use temple_reunion::i18n::{Catalog, Language};
use temple_reunion::store::RecordStore;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("temple_reunion=info".parse()?),
        )
        .init();

    info!("Starting Temple Reunion API");

    // Load configuration from environment
    let config = Config::from_env()?;
    let catalog = Catalog::embedded().context("Failed to load embedded locale catalog")?;
    for language in Language::all() {
        let missing = catalog.missing_keys(language.code());
        if !missing.is_empty() {
            warn!("Locale {} is missing {} keys: {:?}", language, missing.len(), missing);
        }
    }

    let port = config.port;
    let store = RecordStore::from_config(&config);
    let app = api::router(Arc::new(AppState::new(config, store, catalog)));

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    info!("Listening on port {}", port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
