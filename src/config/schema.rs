//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from an optional TOML
//! file; environment variables are overlaid afterwards by the loader.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (host, port).
    pub listener: ListenerConfig,

    /// Upstream service locations.
    pub upstreams: UpstreamsConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request body limits.
    pub limits: LimitsConfig,

    /// CORS policy.
    pub cors: CorsConfig,

    /// Static configuration catalog.
    pub catalog: CatalogConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind host (e.g., "0.0.0.0").
    pub host: String,

    /// Bind port.
    pub port: u16,
}

impl ListenerConfig {
    /// `host:port` string suitable for `TcpListener::bind`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

/// Base URLs of the two backend services.
///
/// Both URLs are required; an empty value fails validation.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamsConfig {
    /// Data Collector base URL (e.g., "http://localhost:8001").
    pub data_collector_url: String,

    /// Script Generator base URL (e.g., "http://localhost:8002").
    pub script_generator_url: String,

    /// Path prefix the Script Generator serves its script API under.
    pub script_generator_path_prefix: String,
}

impl Default for UpstreamsConfig {
    fn default() -> Self {
        Self {
            data_collector_url: String::new(),
            script_generator_url: String::new(),
            script_generator_path_prefix: "/api/v1/scripts".to_string(),
        }
    }
}

/// Timeout configuration for upstream calls.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Upstream call timeout (until response headers arrive) in seconds.
    pub upstream_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            upstream_secs: 30,
        }
    }
}

/// Request body limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum inbound body size in bytes (applies to streamed uploads).
    pub max_upload_bytes: usize,

    /// Maximum JSON body size that is buffered for validation.
    pub max_json_body_bytes: usize,

    /// Maximum upstream error body read when extracting a `detail` message.
    pub max_error_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: 100 * 1024 * 1024, // 100MB
            max_json_body_bytes: 1024 * 1024,    // 1MB
            max_error_body_bytes: 64 * 1024,
        }
    }
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Allowed origins; `*` allows any origin without credentials.
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    /// True when the origin list contains the `*` wildcard.
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".to_string()],
        }
    }
}

/// Static configuration catalog settings.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct CatalogConfig {
    /// Directory holding `{kind}.json` files. When unset, configuration
    /// lookups are forwarded to the Data Collector.
    pub static_dir: Option<PathBuf>,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable, for development.
    #[default]
    Pretty,
    /// One JSON object per line, for log aggregation.
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Prometheus endpoint bind address. Metrics are only exported when set.
    pub metrics_address: Option<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_address: None,
        }
    }
}
