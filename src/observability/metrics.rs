//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by method, route, status
//! - `gateway_request_duration_seconds` (histogram): time to response head
//! - `gateway_upstream_failures_total` (counter): failures by backend and kind
//!
//! # Design Decisions
//! - Recording is always on; without an installed exporter the macros are no-ops
//! - Prometheus listener only starts when `METRICS_ADDRESS` is set

use std::net::SocketAddr;
use std::time::Instant;

use axum::http::Method;
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::upstream::Backend;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

static STANDARD_METHODS: [Method; 9] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::HEAD,
    Method::OPTIONS,
    Method::PATCH,
    Method::CONNECT,
    Method::TRACE,
];

/// Label for a request method. Extension methods share one label.
pub fn method_label(method: &Method) -> &'static str {
    STANDARD_METHODS
        .iter()
        .find(|m| *m == method)
        .map_or("other", Method::as_str)
}

/// Record a completed request.
pub fn record_request(method: &Method, route: &'static str, status: u16, start: Instant) {
    counter!(
        "gateway_requests_total",
        "method" => method_label(method),
        "route" => route,
        "status" => status.to_string()
    )
    .increment(1);

    histogram!("gateway_request_duration_seconds", "route" => route)
        .record(start.elapsed().as_secs_f64());
}

/// Record a failed upstream call (`timeout`, `connect`, `transport`, `status`).
pub fn record_upstream_failure(backend: Backend, kind: &'static str) {
    counter!(
        "gateway_upstream_failures_total",
        "backend" => backend.label(),
        "kind" => kind
    )
    .increment(1);
}
