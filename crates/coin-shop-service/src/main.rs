//! Coin Shop Service - HTTP API for the virtual coin shop
//!
//! This is the main entry point for the coin shop service.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use coin_shop_service::storage::{open_store, prepare_catalog};
use coin_shop_service::{create_router, AppState, ServiceConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,coin_shop=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Coin Shop Service");

    // Load configuration from environment
    let config = ServiceConfig::from_env();

    tracing::info!(
        listen_addr = %config.listen_addr,
        data_dir = %config.data_dir,
        postgres_configured = %config.database_url.is_some(),
        catalog_file = ?config.catalog_file,
        "Service configuration loaded"
    );

    let store = open_store(&config).await?;
    prepare_catalog(store.as_ref(), &config).await?;

    // Build app state
    let state = AppState::new(store, config.clone());

    // Create the router
    let app = create_router(state);
    tracing::info!("Router configured with all API endpoints");

    // Start HTTP server
    tracing::info!(listen_addr = %config.listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
