//! Pooled HTTP client for upstream calls.
//!
//! # Responsibilities
//! - Send a prepared request to a backend with connect and response deadlines
//! - Relay 2xx responses unbuffered
//! - Translate failures: transport → UPSTREAM_UNAVAILABLE, deadline → TIMEOUT,
//!   non-2xx → UPSTREAM_ERROR carrying the upstream status
//! - A request body cut off by the upload cap is the caller's fault, not the
//!   upstream's: it is reported as 413 VALIDATION_ERROR

use std::error::Error as StdError;
use std::time::Duration;

use axum::{
    body::Body,
    http::Request,
    response::Response,
};
use http_body_util::LengthLimitError;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::config::{LimitsConfig, TimeoutConfig};
use crate::error::GatewayError;
use crate::http::response::{relay, upstream_error_message};
use crate::observability::metrics;
use crate::resilience::with_deadline;
use crate::upstream::Backend;

/// Client shared by all requests; cloning is cheap and shares the pool.
#[derive(Clone)]
pub struct UpstreamClient {
    client: Client<HttpConnector, Body>,
    timeout: Duration,
    max_error_body_bytes: usize,
    max_upload_bytes: usize,
}

impl UpstreamClient {
    pub fn new(timeouts: &TimeoutConfig, limits: &LimitsConfig) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(timeouts.connect_secs)));
        connector.set_nodelay(true);

        let client = Client::builder(TokioExecutor::new())
            .pool_idle_timeout(Duration::from_secs(90))
            .build(connector);

        Self {
            client,
            timeout: Duration::from_secs(timeouts.upstream_secs),
            max_error_body_bytes: limits.max_error_body_bytes,
            max_upload_bytes: limits.max_upload_bytes,
        }
    }

    /// Deadline applied to each call.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Send `request` to `backend`.
    pub async fn send(&self, backend: Backend, request: Request<Body>) -> Result<Response, GatewayError> {
        let uri = request.uri().clone();

        let outcome = match with_deadline(backend, self.timeout, self.client.request(request)).await {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::warn!(
                    backend = backend.label(),
                    uri = %uri,
                    timeout_secs = self.timeout.as_secs(),
                    "Upstream timed out"
                );
                metrics::record_upstream_failure(backend, "timeout");
                return Err(err);
            }
        };

        let response = match outcome {
            Ok(response) => response,
            Err(e) if exceeded_body_limit(&e) => {
                tracing::info!(
                    backend = backend.label(),
                    uri = %uri,
                    limit = self.max_upload_bytes,
                    "Request body exceeded upload limit mid-stream"
                );
                return Err(GatewayError::PayloadTooLarge {
                    limit: self.max_upload_bytes,
                });
            }
            Err(e) => {
                tracing::warn!(
                    backend = backend.label(),
                    uri = %uri,
                    connect = e.is_connect(),
                    error = ?e,
                    "Upstream request failed"
                );
                metrics::record_upstream_failure(backend, if e.is_connect() { "connect" } else { "transport" });
                return Err(GatewayError::UpstreamUnavailable {
                    backend,
                    reason: e.to_string(),
                });
            }
        };

        let status = response.status();
        if status.is_success() {
            return Ok(relay(response));
        }

        let message = upstream_error_message(
            backend,
            status,
            response.into_body(),
            self.max_error_body_bytes,
            self.timeout,
        )
        .await;

        tracing::warn!(
            backend = backend.label(),
            uri = %uri,
            status = status.as_u16(),
            "Upstream returned error status"
        );
        metrics::record_upstream_failure(backend, "status");

        Err(GatewayError::UpstreamStatus {
            backend,
            status,
            message,
        })
    }
}

/// True when the request body stream was stopped by the upload cap.
fn exceeded_body_limit(err: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if e.is::<LengthLimitError>() {
            return true;
        }
        current = e.source();
    }
    false
}
