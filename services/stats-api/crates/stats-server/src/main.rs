//! podstat stats server entry point.
//!
//! Initialises tracing, loads configuration from environment variables
//! (prefixed with `PODSTAT_`), connects to the Kubernetes API with the
//! ambient kubeconfig or in-cluster credentials, and serves the stats API.

use std::sync::Arc;

use anyhow::{Context, Result};
use podstat_common::{MAX_TERMINATION_WAIT_SECS, ServerConfig};
use tracing_subscriber::EnvFilter;

use stats_server::api::{self, AppState};
use stats_server::application::services::{InstanceAggregator, TerminationWatcher};
use stats_server::infra::{BearerTokenParser, KubeClusterReader, TokenReviewIdentityProvider};

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialise tracing with RUST_LOG env filter.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("stats-server starting");

    // 2. Load configuration from PODSTAT_* env vars.
    let config: ServerConfig = envy::prefixed("PODSTAT_")
        .from_env()
        .context("failed to load config from PODSTAT_* env vars")?;

    tracing::info!(
        listen_addr = %config.listen_addr,
        termination_timeout_secs = config.termination_timeout_secs,
        max_termination_timeout_secs = config.effective_max_termination_secs(),
        max_desired_instances = config.max_desired_instances,
        "configuration loaded",
    );
    if config.max_termination_timeout_secs > MAX_TERMINATION_WAIT_SECS {
        tracing::warn!(
            configured = config.max_termination_timeout_secs,
            applied = MAX_TERMINATION_WAIT_SECS,
            "max termination wait exceeds one watch request, clamping",
        );
    }

    // 3. One cluster client, shared read-only by every request.
    let client = kube::Client::try_default()
        .await
        .context("failed to build Kubernetes client")?;
    let cluster = Arc::new(KubeClusterReader::new(client.clone()));

    let state = AppState {
        aggregator: InstanceAggregator::new(cluster.clone()),
        watcher: TerminationWatcher::new(cluster),
        auth_parser: Arc::new(BearerTokenParser),
        identity_provider: Arc::new(TokenReviewIdentityProvider::new(client)),
        config: Arc::new(config.clone()),
    };

    // 4. Bind and serve.
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .context("failed to bind TCP listener")?;

    tracing::info!("stats API ready — http://{}", config.listen_addr);

    axum::serve(listener, api::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    tracing::info!("stats-server shut down");
    Ok(())
}

/// Wait for SIGINT (Ctrl-C) for graceful shutdown.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("received shutdown signal");
}
