//! Response sanitizing.
//!
//! # Responsibilities
//! - Remove headers that reveal upstream implementation details
//! - Strip internal-only fields from JSON bodies, at any depth
//! - Identify the gateway via `X-Gateway`
//!
//! # Design Decisions
//! - Bodies that do not parse as declared pass through untouched
//! - Untouched JSON is not re-serialized, so formatting is preserved

use std::collections::HashSet;

use axum::{
    body::{Body, Bytes},
    http::{header, HeaderName, HeaderValue, Response},
};
use serde_json::Value;

use crate::config::ResponseConfig;
use crate::http::context::is_json_content_type;
use crate::proxy::strip_hop_by_hop;

pub const X_GATEWAY: &str = "x-gateway";

pub struct ResponseTransformer {
    gateway_id: HeaderValue,
    strip_headers: Vec<HeaderName>,
    strip_fields: HashSet<String>,
}

impl ResponseTransformer {
    pub fn from_config(config: &ResponseConfig) -> Self {
        let gateway_id = HeaderValue::from_str(&config.gateway_id).unwrap_or_else(|_| {
            tracing::warn!(gateway_id = %config.gateway_id, "Gateway id is not a valid header value");
            HeaderValue::from_static("edge-gateway")
        });
        let strip_headers = config
            .strip_headers
            .iter()
            .filter_map(|name| HeaderName::from_bytes(name.to_ascii_lowercase().as_bytes()).ok())
            .collect();

        Self {
            gateway_id,
            strip_headers,
            strip_fields: config.strip_fields.iter().cloned().collect(),
        }
    }

    pub fn gateway_id(&self) -> &HeaderValue {
        &self.gateway_id
    }

    pub fn transform(&self, upstream: Response<Bytes>) -> Response<Body> {
        let (mut parts, body) = upstream.into_parts();

        strip_hop_by_hop(&mut parts.headers);
        for name in &self.strip_headers {
            parts.headers.remove(name);
        }

        let body = if is_json_content_type(&parts.headers) {
            self.sanitize_json(body)
        } else {
            body
        };

        // Length is recomputed from the final body.
        parts.headers.remove(header::CONTENT_LENGTH);
        parts.headers.insert(X_GATEWAY, self.gateway_id.clone());
        Response::from_parts(parts, Body::from(body))
    }

    fn sanitize_json(&self, body: Bytes) -> Bytes {
        if self.strip_fields.is_empty() || body.is_empty() {
            return body;
        }
        let mut value: Value = match serde_json::from_slice(&body) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!(error = %e, "Upstream body is not valid JSON, passing through");
                return body;
            }
        };
        if strip_fields(&mut value, &self.strip_fields) == 0 {
            return body;
        }
        match serde_json::to_vec(&value) {
            Ok(encoded) => Bytes::from(encoded),
            Err(_) => body,
        }
    }
}

/// Remove `fields` from every object in `value`. Returns the number removed.
pub fn strip_fields(value: &mut Value, fields: &HashSet<String>) -> usize {
    match value {
        Value::Object(map) => {
            let before = map.len();
            map.retain(|key, _| !fields.contains(key));
            let mut removed = before - map.len();
            for child in map.values_mut() {
                removed += strip_fields(child, fields);
            }
            removed
        }
        Value::Array(items) => items.iter_mut().map(|item| strip_fields(item, fields)).sum(),
        _ => 0,
    }
}
