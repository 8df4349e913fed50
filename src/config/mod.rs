//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! .env (optional) + GATEWAY_CONFIG file (optional, TOML) + environment
//!     → loader.rs (parse, deserialize, overlay env)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is read once at startup and never changes afterwards
//! - All fields have defaults except the two upstream URLs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::GatewayConfig;
pub use schema::{
    CatalogConfig, CorsConfig, LimitsConfig, ListenerConfig, LogFormat, ObservabilityConfig,
    TimeoutConfig, UpstreamsConfig,
};
