//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap upstream calls with a deadline
//! - Cancel the call cleanly on timeout (the future is dropped)
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timeout errors are distinct from other errors
//! - Timed-out requests return 504 Gateway Timeout; nothing is retried

use std::future::Future;
use std::time::Duration;

use crate::error::GatewayError;
use crate::upstream::Backend;

/// Run `fut` against `backend`, failing with [`GatewayError::Timeout`] after `limit`.
pub async fn with_deadline<F, T>(backend: Backend, limit: Duration, fut: F) -> Result<T, GatewayError>
where
    F: Future<Output = T>,
{
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| GatewayError::Timeout {
            backend,
            timeout: limit,
        })
}
