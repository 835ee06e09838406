//! GH Pulse Service
//!
//! Entry point for the events monitor. Wires the event store, the feed
//! ingestor, and the REST query surface together, runs until a shutdown
//! signal arrives, then stops the ingestor and exits.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use event_store::EventStore;
use github_fetcher::FeedIngestor;
use pulse_service::{initialize_logging, rest_api, setup_signal_handlers, ServiceConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging first
    initialize_logging()?;

    info!("Starting GH Pulse service v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = ServiceConfig::from_env().context("Failed to load configuration")?;
    info!(
        poll_interval_secs = config.poll_interval_secs,
        retention_minutes = config.retention_minutes,
        "Configuration loaded"
    );

    // Construct the store and ingestor once; everything downstream receives
    // explicit references.
    let store =
        Arc::new(EventStore::new(config.store_config()).context("Failed to create event store")?);
    let mut ingestor =
        FeedIngestor::new(config.fetcher_config()).context("Failed to create feed ingestor")?;
    ingestor.configure(Arc::clone(&store));
    ingestor.start().context("Failed to start feed ingestor")?;

    // Setup signal handlers for graceful shutdown
    let shutdown_signal = setup_signal_handlers()?;

    // Serve the REST API until the shutdown signal fires
    let addr: SocketAddr = config
        .bind_addr
        .parse()
        .with_context(|| format!("invalid bind address: {}", config.bind_addr))?;
    let api = rest_api::routes(Arc::clone(&store), Arc::new(config.allowed_kinds.clone()));
    let (bound_addr, server) = warp::serve(api)
        .try_bind_with_graceful_shutdown(addr, async {
            let _ = shutdown_signal.await;
        })
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("REST API listening on http://{bound_addr}");

    server.await;

    // Graceful shutdown
    info!("Shutdown signal received, stopping feed ingestor...");
    ingestor.stop().await;

    info!("GH Pulse service shutdown complete");
    Ok(())
}
