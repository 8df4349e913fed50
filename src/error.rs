//! Gateway error taxonomy.
//!
//! Every failure on the request path ends up as a [`GatewayError`], which is
//! converted at the boundary into a uniform JSON body:
//!
//! ```json
//! {"error": "UPSTREAM_ERROR", "message": "...", "status": 503}
//! ```
//!
//! `status` is only present when an upstream status code is being passed
//! through. Upstream bodies are never relayed on the error path.

use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::upstream::Backend;

/// Stable, machine readable error kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    ValidationError,
    NotFound,
    UpstreamUnavailable,
    UpstreamError,
    Timeout,
    InternalError,
}

impl ErrorKind {
    /// Wire name, also used as a metrics label.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ValidationError => "VALIDATION_ERROR",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::UpstreamUnavailable => "UPSTREAM_UNAVAILABLE",
            ErrorKind::UpstreamError => "UPSTREAM_ERROR",
            ErrorKind::Timeout => "TIMEOUT",
            ErrorKind::InternalError => "INTERNAL_ERROR",
        }
    }
}

/// JSON body returned for every error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

/// Errors produced while handling a request.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Bad input shape; rejected without contacting an upstream.
    #[error("{0}")]
    Validation(String),

    /// Path is known but not for this method.
    #[error("method {method} is not allowed for {path}")]
    MethodNotAllowed {
        method: Method,
        path: String,
        allowed: Vec<Method>,
    },

    /// Request body larger than the configured upload cap.
    #[error("request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    /// Unknown route or missing resource identifier.
    #[error("{0}")]
    NotFound(String),

    /// Connection refused or other transport failure.
    #[error("{backend} is unavailable: {reason}")]
    UpstreamUnavailable { backend: Backend, reason: String },

    /// Upstream answered with a non-2xx status.
    #[error("{backend} returned {status}: {message}")]
    UpstreamStatus {
        backend: Backend,
        status: StatusCode,
        message: String,
    },

    /// Upstream did not answer within the configured deadline.
    #[error("{backend} did not respond within {}s", .timeout.as_secs())]
    Timeout { backend: Backend, timeout: Duration },

    /// Fault inside the gateway itself.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GatewayError::Validation(_)
            | GatewayError::MethodNotAllowed { .. }
            | GatewayError::PayloadTooLarge { .. } => ErrorKind::ValidationError,
            GatewayError::NotFound(_) => ErrorKind::NotFound,
            GatewayError::UpstreamStatus { status, .. } if *status == StatusCode::NOT_FOUND => {
                ErrorKind::NotFound
            }
            GatewayError::UpstreamUnavailable { .. } => ErrorKind::UpstreamUnavailable,
            GatewayError::UpstreamStatus { .. } => ErrorKind::UpstreamError,
            GatewayError::Timeout { .. } => ErrorKind::Timeout,
            GatewayError::Internal(_) => ErrorKind::InternalError,
        }
    }

    /// HTTP status sent to the caller.
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Validation(_) => StatusCode::BAD_REQUEST,
            GatewayError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            GatewayError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::UpstreamUnavailable { .. } => StatusCode::BAD_GATEWAY,
            GatewayError::UpstreamStatus { status, .. } => *status,
            GatewayError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to callers. Transport details stay in the logs.
    fn public_message(&self) -> String {
        match self {
            GatewayError::UpstreamUnavailable { backend, .. } => {
                format!("{backend} is unavailable")
            }
            GatewayError::UpstreamStatus { message, .. } => message.clone(),
            GatewayError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }

    pub fn to_body(&self) -> ErrorBody {
        let status = match self {
            GatewayError::UpstreamStatus { status, .. } => Some(status.as_u16()),
            _ => None,
        };
        ErrorBody {
            error: self.kind(),
            message: self.public_message(),
            status,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let mut response = (self.status(), Json(self.to_body())).into_response();

        if let GatewayError::MethodNotAllowed { allowed, .. } = &self {
            let allow = allowed
                .iter()
                .map(Method::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            if let Ok(value) = HeaderValue::from_str(&allow) {
                response.headers_mut().insert(header::ALLOW, value);
            }
        }

        response
    }
}
