//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, dispatch)
//!     → [routing layer resolves endpoint and target]
//!     → payload.rs (body checks, JSON defaults)
//!     → request.rs (request ID, upstream request)
//!     → [upstream client]
//!     → response.rs (relay, error messages)
//!     → Send to client
//! ```

pub mod payload;
pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use server::HttpServer;
