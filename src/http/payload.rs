//! Request body checks applied before anything is sent upstream.
//!
//! JSON bodies are small and get buffered so required fields can be checked
//! and defaults filled in. Multipart uploads are only checked for their
//! content type and then streamed untouched.

use axum::{
    body::Body,
    http::{header, HeaderMap},
};
use serde_json::{Map, Value};

use crate::error::GatewayError;
use crate::routing::{BodyRule, JsonDefault, JsonRule};

/// Check a request body against its endpoint rule, returning the body to forward.
pub async fn prepare_body(
    rule: &BodyRule,
    headers: &mut HeaderMap,
    body: Body,
    max_json_bytes: usize,
) -> Result<Body, GatewayError> {
    match rule {
        BodyRule::Passthrough => Ok(body),
        BodyRule::Multipart => {
            check_multipart(headers)?;
            Ok(body)
        }
        BodyRule::Json(rule) => {
            check_json_content_type(headers)?;
            let bytes = axum::body::to_bytes(body, max_json_bytes)
                .await
                .map_err(|_| {
                    GatewayError::Validation(format!(
                        "Request body could not be read or exceeds {max_json_bytes} bytes"
                    ))
                })?;

            let mut object = match serde_json::from_slice::<Value>(&bytes) {
                Ok(Value::Object(object)) => object,
                Ok(_) => {
                    return Err(GatewayError::Validation(
                        "Request body must be a JSON object".to_string(),
                    ))
                }
                Err(e) => {
                    return Err(GatewayError::Validation(format!(
                        "Request body is not valid JSON: {e}"
                    )))
                }
            };

            check_required(rule, &object)?;
            if !apply_defaults(rule, &mut object) {
                return Ok(Body::from(bytes));
            }

            let rewritten = serde_json::to_vec(&object)
                .map_err(|e| GatewayError::Internal(format!("re-encoding JSON body: {e}")))?;
            headers.remove(header::CONTENT_LENGTH);
            Ok(Body::from(rewritten))
        }
    }
}

fn content_type(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_ascii_lowercase())
}

fn check_json_content_type(headers: &HeaderMap) -> Result<(), GatewayError> {
    let is_json = content_type(headers)
        .and_then(|ct| ct.split(';').next().map(|m| m.trim().to_string()))
        .map(|mime| mime == "application/json" || mime.ends_with("+json"))
        .unwrap_or(false);

    if is_json {
        Ok(())
    } else {
        Err(GatewayError::Validation(
            "Content-Type must be application/json".to_string(),
        ))
    }
}

fn check_multipart(headers: &HeaderMap) -> Result<(), GatewayError> {
    let valid = content_type(headers)
        .map(|ct| ct.starts_with("multipart/form-data") && ct.contains("boundary="))
        .unwrap_or(false);

    if valid {
        Ok(())
    } else {
        Err(GatewayError::Validation(
            "File uploads must be multipart/form-data with a boundary".to_string(),
        ))
    }
}

fn check_required(rule: &JsonRule, object: &Map<String, Value>) -> Result<(), GatewayError> {
    for field in rule.required {
        let present = match object.get(*field) {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.trim().is_empty(),
            Some(_) => true,
        };
        if !present {
            return Err(GatewayError::Validation(format!(
                "Missing required field: {field}"
            )));
        }
    }
    Ok(())
}

/// Fill in absent fields. Returns true when the object changed.
fn apply_defaults(rule: &JsonRule, object: &mut Map<String, Value>) -> bool {
    let mut changed = false;
    for (field, default) in rule.defaults {
        if object.get(*field).map_or(true, Value::is_null) {
            let value = match default {
                JsonDefault::Str(s) => Value::from(*s),
                JsonDefault::Int(n) => Value::from(*n),
            };
            object.insert(field.to_string(), value);
            changed = true;
        }
    }
    changed
}
