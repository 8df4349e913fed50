//! API Gateway
//!
//! Single public entry point in front of the content pipeline services.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────┐
//!                      │                  API GATEWAY                  │
//!   Client Request     │  ┌────────┐   ┌─────────┐   ┌─────────────┐  │
//!   ───────────────────┼─▶│  http  │──▶│ routing │──▶│   payload   │  │
//!                      │  │ server │   │  table  │   │   checks    │  │
//!                      │  └────────┘   └────┬────┘   └──────┬──────┘  │
//!                      │                    │ catalog       │          │
//!                      │                    ▼               ▼          │
//!                      │             ┌───────────┐   ┌─────────────┐  │       Data Collector
//!   Client Response    │             │  catalog  │   │  upstream   │──┼────▶ Script Generator
//!   ◀──────────────────┼─────────────│   store   │   │   client    │◀─┼─────
//!                      │             └───────────┘   └─────────────┘  │
//!                      │                                              │
//!                      │  config · security · resilience · lifecycle  │
//!                      │  observability (logs, metrics)               │
//!                      └──────────────────────────────────────────────┘
//! ```

use std::process::ExitCode;

use api_gateway::config::load_config;
use api_gateway::lifecycle;
use api_gateway::observability::logging;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("api-gateway: {e}");
            return ExitCode::FAILURE;
        }
    };

    logging::init_logging(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address(),
        data_collector = %config.upstreams.data_collector_url,
        script_generator = %config.upstreams.script_generator_url,
        upstream_timeout_secs = config.timeouts.upstream_secs,
        static_catalog = config.catalog.static_dir.is_some(),
        "Configuration loaded"
    );

    match lifecycle::run(config).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Gateway failed");
            ExitCode::FAILURE
        }
    }
}
