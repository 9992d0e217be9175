//! hedgerow server entry point.
//!
//! Boots the offline cache manager for the configured site, runs install and
//! activate once, then serves the MCP tools on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use hedgerow_client::{CacheManager, FetchClient, FetchConfig, LifecycleState, WorkerConfig};
use hedgerow_core::{AppConfig, BlobStore, CacheDb};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod error;
mod handler;
mod host;
mod tools;

fn log_startup(config: &AppConfig) {
    tracing::info!(
        origin = %config.origin,
        version = %config.cache_version,
        db = %config.db_path.display(),
        "starting hedgerow"
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    log_startup(&config);

    let store: Arc<dyn BlobStore> = Arc::new(CacheDb::open(&config.db_path).await?);
    let fetcher = Arc::new(FetchClient::new(FetchConfig::from(&config))?);
    let manager = Arc::new(CacheManager::new(
        WorkerConfig::from_app(&config)?,
        Arc::clone(&store),
        fetcher,
        Arc::new(host::LoggingHost::default()),
    ));

    // A failed install leaves the manager passing requests through; the
    // worker_install tool retries it.
    match manager.on_install().await {
        Ok(report) => tracing::info!(partition = %report.partition, cached = report.cached.len(), "installed"),
        Err(e) => tracing::error!(error = %e, "install failed, serving from network only"),
    }
    if manager.state().await == LifecycleState::Installed
        && let Err(e) = manager.on_activate().await
    {
        tracing::error!(error = %e, "activate failed");
    }

    tracing::info!("Starting hedgerow server on stdio transport");

    let handler = handler::HedgerowServer::new(manager, store);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}
