//! Upstream services subsystem.
//!
//! # Data Flow
//! ```text
//! RouteTarget::Upstream { backend, uri }
//!     → client.rs (pooled hyper client, deadline)
//!     → 2xx: streamed back through http/response.rs
//!     → otherwise: GatewayError for the boundary to render
//! ```

pub mod backend;
pub mod client;

pub use backend::Backend;
pub use client::UpstreamClient;
