//! Request handling and transformation.
//!
//! # Responsibilities
//! - Generate unique request IDs (UUID v4)
//! - Prepare the request that is forwarded to an upstream
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing and propagated upstream
//! - The original request's body is moved, never copied

use std::net::SocketAddr;

use axum::{
    body::Body,
    http::{request::Parts, HeaderMap, HeaderName, HeaderValue, Request, Uri},
};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::security::headers::forwarded_request_headers;

/// Header carrying the request correlation ID.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Generates a UUID v4 request ID when the caller did not send one.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuidV4;

impl MakeRequestId for MakeRequestUuidV4 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// The request ID of a request, or `"unknown"`.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(&X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Build the upstream request from the inbound parts and a (possibly rewritten) body.
pub fn build_upstream_request(
    parts: &Parts,
    uri: Uri,
    body: Body,
    client: Option<SocketAddr>,
) -> Request<Body> {
    let mut request = Request::new(body);
    *request.method_mut() = parts.method.clone();
    *request.uri_mut() = uri;
    *request.headers_mut() = forwarded_request_headers(&parts.headers, client);
    request
}
