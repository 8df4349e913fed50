//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check both upstream URLs are present, parseable and plain `http`
//! - Validate value ranges (timeouts > 0, limits > 0)
//! - Check CORS origins and the script path prefix
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::HeaderValue;
use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required upstream URL was not provided.
    #[error("{0} is required")]
    MissingUpstream(&'static str),

    /// An upstream URL could not be parsed.
    #[error("{name} is not a valid URL ({value}): {reason}")]
    InvalidUpstreamUrl {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// The upstream client only speaks plain HTTP.
    #[error("{name} must use the http scheme, got '{scheme}'")]
    UnsupportedScheme { name: &'static str, scheme: String },

    /// A timeout was configured as zero.
    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),

    /// A CORS origin is not a valid header value.
    #[error("invalid CORS origin '{0}'")]
    InvalidOrigin(String),

    /// Upstream path prefix must be absolute.
    #[error("script generator path prefix must start with '/', got '{0}'")]
    InvalidPathPrefix(String),

    /// Unknown log level.
    #[error("unknown log level '{0}'")]
    InvalidLogLevel(String),

    #[error("METRICS_ADDRESS must be host:port, got '{0}'")]
    InvalidMetricsAddress(String),
}

/// Validate a fully loaded configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    validate_upstream(
        "DATA_COLLECTOR_URL",
        &config.upstreams.data_collector_url,
        &mut errors,
    );
    validate_upstream(
        "SCRIPT_GENERATOR_URL",
        &config.upstreams.script_generator_url,
        &mut errors,
    );

    if !config.upstreams.script_generator_path_prefix.starts_with('/') {
        errors.push(ValidationError::InvalidPathPrefix(
            config.upstreams.script_generator_path_prefix.clone(),
        ));
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroValue("CONNECT_TIMEOUT_SECS"));
    }
    if config.timeouts.upstream_secs == 0 {
        errors.push(ValidationError::ZeroValue("UPSTREAM_TIMEOUT_SECS"));
    }
    if config.limits.max_upload_bytes == 0 {
        errors.push(ValidationError::ZeroValue("MAX_UPLOAD_BYTES"));
    }
    if config.limits.max_json_body_bytes == 0 {
        errors.push(ValidationError::ZeroValue("MAX_JSON_BODY_BYTES"));
    }

    for origin in &config.cors.allowed_origins {
        if origin != "*" && HeaderValue::from_str(origin).is_err() {
            errors.push(ValidationError::InvalidOrigin(origin.clone()));
        }
    }

    if normalize_log_level(&config.observability.log_level).is_none() {
        errors.push(ValidationError::InvalidLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if let Some(addr) = &config.observability.metrics_address {
        if addr.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::InvalidMetricsAddress(addr.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Map a user supplied level onto a `tracing` level name.
///
/// Accepts any case, plus `warning` and `critical`.
pub fn normalize_log_level(level: &str) -> Option<&'static str> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Some("trace"),
        "debug" => Some("debug"),
        "info" => Some("info"),
        "warn" | "warning" => Some("warn"),
        "error" | "critical" => Some("error"),
        _ => None,
    }
}

fn validate_upstream(name: &'static str, value: &str, errors: &mut Vec<ValidationError>) {
    if value.trim().is_empty() {
        errors.push(ValidationError::MissingUpstream(name));
        return;
    }

    match Url::parse(value) {
        Ok(url) if url.scheme() != "http" => errors.push(ValidationError::UnsupportedScheme {
            name,
            scheme: url.scheme().to_string(),
        }),
        Ok(url) if url.host_str().is_none() => errors.push(ValidationError::InvalidUpstreamUrl {
            name,
            value: value.to_string(),
            reason: "missing host".to_string(),
        }),
        Ok(_) => {}
        Err(e) => errors.push(ValidationError::InvalidUpstreamUrl {
            name,
            value: value.to_string(),
            reason: e.to_string(),
        }),
    }
}
