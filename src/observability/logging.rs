//! Structured logging.
//!
//! `RUST_LOG` wins when set; otherwise `LOG_LEVEL` applies to this crate and
//! to tower-http's request traces.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::validation::normalize_log_level;
use crate::config::{LogFormat, ObservabilityConfig};

/// Filter directives used when `RUST_LOG` is not set.
pub fn default_directives(log_level: &str) -> String {
    let level = normalize_log_level(log_level).unwrap_or("info");
    format!("api_gateway={level},tower_http={level}")
}

/// Install the global tracing subscriber. Call once, before serving.
pub fn init_logging(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&config.log_level)));

    let registry = tracing_subscriber::registry().with(filter);
    match config.log_format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(fmt::layer()).init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives() {
        assert_eq!(default_directives("WARNING"), "api_gateway=warn,tower_http=warn");
        assert_eq!(default_directives("bogus"), "api_gateway=info,tower_http=info");
    }
}
