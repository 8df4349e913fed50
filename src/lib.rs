//! API gateway library: routing, validation and forwarding in front of the
//! Data Collector and Script Generator services.

pub mod catalog;
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod routing;
pub mod security;
pub mod upstream;

pub use config::GatewayConfig;
pub use error::{ErrorKind, GatewayError};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
