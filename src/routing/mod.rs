//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path, query)
//!     → router.rs (pick service by longest prefix)
//!     → matcher.rs (evaluate endpoint templates)
//!     → Return: endpoint + RouteTarget, or NotFound / MethodNotAllowed
//!
//! Route Compilation (at startup):
//!     GatewayConfig
//!     → table.rs (endpoint list per service prefix)
//!     → Sort by specificity
//!     → Freeze as immutable Router
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path (segment matching only)
//! - Deterministic: same input always matches same route

pub mod matcher;
pub mod router;
pub mod table;

pub use router::{ResolvedRoute, RouteTarget, Router};
pub use table::{BodyRule, Endpoint, JsonDefault, JsonRule};
