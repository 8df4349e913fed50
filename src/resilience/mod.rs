//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to backend:
//!     → connect timeout (HttpConnector)
//!     → timeouts.rs (deadline for the response head)
//!     → On failure: translated to TIMEOUT / UPSTREAM_UNAVAILABLE
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every upstream call has a deadline
//! - No automatic retries; retrying is left to the caller

pub mod timeouts;

pub use timeouts::with_deadline;
