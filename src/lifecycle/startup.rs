//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize subsystems in dependency order (metrics, catalog, server)
//! - Bind the listener and begin accepting traffic
//! - Tie OS signals to the shutdown trigger
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The listener binds last (traffic only when ready)

use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::catalog::CatalogError;
use crate::config::GatewayConfig;
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::observability::metrics;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid metrics address '{0}'")]
    MetricsAddress(String),

    #[error("failed to start metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("failed to load configuration catalog: {0}")]
    Catalog(#[from] CatalogError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Start the gateway and serve until SIGINT or SIGTERM.
pub async fn run(config: GatewayConfig) -> Result<(), StartupError> {
    if let Some(raw) = &config.observability.metrics_address {
        let addr: SocketAddr = raw
            .parse()
            .map_err(|_| StartupError::MetricsAddress(raw.clone()))?;
        metrics::init_metrics(addr)?;
    }

    let address = config.listener.bind_address();
    let server = HttpServer::new(config)?;

    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind {
            address: address.clone(),
            source,
        })?;
    tracing::info!(address = %address, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::wait_for_termination().await;
        shutdown.trigger();
    });

    server
        .run(listener, server_shutdown)
        .await
        .map_err(StartupError::Serve)
}
