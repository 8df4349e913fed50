//! Response handling and transformation.
//!
//! # Responsibilities
//! - Relay successful upstream responses (streamed, never buffered)
//! - Strip hop-by-hop headers from upstream responses
//! - Pull a user-facing message out of upstream error bodies
//! - Build JSON responses for catalog lookups and health checks

use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use hyper::body::Incoming;

use crate::security::headers::strip_hop_by_hop;
use crate::upstream::Backend;

/// Longest upstream `detail` string passed on to callers.
const MAX_DETAIL_CHARS: usize = 512;

/// Relay an upstream response to the caller, body streamed as-is.
pub fn relay(response: hyper::Response<Incoming>) -> Response {
    let (mut parts, body) = response.into_parts();
    strip_hop_by_hop(&mut parts.headers);
    Response::from_parts(parts, Body::new(body))
}

/// Derive the message for an upstream error response.
///
/// Uses the `detail` string of a JSON error body when there is one; any
/// other body content is dropped.
pub async fn upstream_error_message(
    backend: Backend,
    status: StatusCode,
    body: Incoming,
    limit: usize,
    deadline: Duration,
) -> String {
    let read = tokio::time::timeout(deadline, axum::body::to_bytes(Body::new(body), limit)).await;

    let detail = match read {
        Ok(Ok(bytes)) => detail_from(&bytes),
        _ => None,
    };
    detail.unwrap_or_else(|| format!("{backend} returned status {}", status.as_u16()))
}

fn detail_from(bytes: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(bytes).ok()?;
    let detail = value.get("detail")?.as_str()?.trim();
    if detail.is_empty() {
        return None;
    }
    Some(detail.chars().take(MAX_DETAIL_CHARS).collect())
}

/// Raw JSON bytes as a 200 response.
pub fn json_bytes(bytes: Bytes) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))],
        bytes,
    )
        .into_response()
}
