//! Scoring API server
//!
//! # Usage
//!
//! ```bash
//! # Serve on port 8080 with the Redis store
//! scoring-api --port 8080 --redis-url redis://localhost:60722/
//!
//! # Local run without Redis, JSON logs to a file
//! scoring-api --store memory --log /tmp/scoring.log --log-format json
//! ```

use anyhow::Context;
use clap::Parser;
use std::sync::Arc;

use scoring_api::logging::init_tracing;
use scoring_api::{create_router, ApiMetrics, AppConfig, AppState, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(&cli).context("loading configuration")?;
    init_tracing(&config.logging)?;

    let store = config.store.build_store()?;
    // scores are served from the cache while the store is down
    if let Err(e) = store.connect().await {
        tracing::warn!(
            backend = store.backend().name(),
            error = %e,
            "Store unreachable at startup"
        );
    }

    let registry = Arc::new(prometheus::Registry::new());
    let metrics = Arc::new(ApiMetrics::new(registry).context("registering metrics")?);
    let router = create_router(AppState::new(store, metrics));

    let addr = tokio::net::lookup_host(config.bind_address())
        .await?
        .next()
        .with_context(|| format!("cannot resolve {}", config.bind_address()))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Starting scoring API on {}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
