//! Configuration loading from disk and the process environment.
//!
//! Layering, lowest precedence first:
//! 1. schema defaults
//! 2. optional TOML file named by `GATEWAY_CONFIG`
//! 3. environment variables (after `.env` has been loaded)

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;

use crate::config::schema::{GatewayConfig, LogFormat};
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable naming the optional TOML file.
pub const CONFIG_PATH_VAR: &str = "GATEWAY_CONFIG";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("{var} has an invalid value '{value}': {reason}")]
    Env {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load the configuration for this process.
///
/// Reads `.env` if present, then the TOML file named by `GATEWAY_CONFIG`,
/// then the environment, and validates the result.
pub fn load_config() -> Result<GatewayConfig, ConfigError> {
    // A missing .env file is the normal case in production.
    let _ = dotenvy::dotenv();

    let path = std::env::var(CONFIG_PATH_VAR).ok().map(PathBuf::from);
    load_from(path.as_deref(), |key| std::env::var(key).ok())
}

/// Load configuration from an optional file and an environment lookup.
///
/// The lookup is injected so tests never touch the process environment.
pub fn load_from<F>(path: Option<&Path>, env: F) -> Result<GatewayConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            toml::from_str(&content)?
        }
        None => GatewayConfig::default(),
    };

    apply_env(&mut config, env)?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay environment variables onto a configuration.
pub fn apply_env<F>(config: &mut GatewayConfig, env: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |key: &str| env(key).filter(|v| !v.trim().is_empty());

    if let Some(host) = lookup("HOST") {
        config.listener.host = host;
    }
    if let Some(port) = lookup("PORT") {
        config.listener.port = parse_var("PORT", &port)?;
    }

    if let Some(url) = lookup("DATA_COLLECTOR_URL") {
        config.upstreams.data_collector_url = url;
    }
    if let Some(url) = lookup("SCRIPT_GENERATOR_URL") {
        config.upstreams.script_generator_url = url;
    }
    if let Some(prefix) = lookup("SCRIPT_GENERATOR_PATH_PREFIX") {
        config.upstreams.script_generator_path_prefix = prefix;
    }

    if let Some(secs) = lookup("UPSTREAM_TIMEOUT_SECS") {
        config.timeouts.upstream_secs = parse_var("UPSTREAM_TIMEOUT_SECS", &secs)?;
    }
    if let Some(secs) = lookup("CONNECT_TIMEOUT_SECS") {
        config.timeouts.connect_secs = parse_var("CONNECT_TIMEOUT_SECS", &secs)?;
    }

    if let Some(bytes) = lookup("MAX_UPLOAD_BYTES") {
        config.limits.max_upload_bytes = parse_var("MAX_UPLOAD_BYTES", &bytes)?;
    }
    if let Some(bytes) = lookup("MAX_JSON_BODY_BYTES") {
        config.limits.max_json_body_bytes = parse_var("MAX_JSON_BODY_BYTES", &bytes)?;
    }

    // CORS_ORIGINS is the older name and loses to ALLOWED_ORIGINS.
    if let Some(origins) = lookup("ALLOWED_ORIGINS").or_else(|| lookup("CORS_ORIGINS")) {
        config.cors.allowed_origins = split_list(&origins);
    }

    if let Some(dir) = lookup("CONFIGURATIONS_DIR") {
        config.catalog.static_dir = Some(PathBuf::from(dir));
    }

    if let Some(level) = lookup("LOG_LEVEL") {
        config.observability.log_level = level;
    }
    if let Some(format) = lookup("LOG_FORMAT") {
        config.observability.log_format = match format.trim().to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            "pretty" | "text" => LogFormat::Pretty,
            _ => {
                return Err(ConfigError::Env {
                    var: "LOG_FORMAT",
                    value: format,
                    reason: "expected 'pretty' or 'json'".to_string(),
                })
            }
        };
    }
    if let Some(addr) = lookup("METRICS_ADDRESS") {
        config.observability.metrics_address = Some(addr);
    }

    Ok(())
}

fn parse_var<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Env {
        var,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
