//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → cors.rs (preflight handling, origin policy)
//!     → body limit (tower-http, configured in the server)
//!     → headers.rs (strip hop-by-hop, add X-Forwarded-*)
//!     → Forward to upstream
//! ```
//!
//! # Design Decisions
//! - No trust in client input: hop-by-hop headers never cross the gateway
//! - Credentials are only allowed together with an explicit origin list

pub mod cors;
pub mod headers;
