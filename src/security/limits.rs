//! Request body limits and validation.
//!
//! # Responsibilities
//! - Enforce maximum request body size
//! - Require JSON bodies on mutating methods
//! - Buffer and parse the body once, publishing it as [`RequestBody`]
//!
//! # Design Decisions
//! - Declared `Content-Length` checked before reading (early rejection)
//! - Streamed bodies are capped while reading, never after
//! - Runs after rate limiting so throttled clients are never buffered

use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, Method, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use http_body_util::LengthLimitError;

use crate::config::SecurityConfig;
use crate::error::GatewayError;
use crate::http::context::{is_json_content_type, is_mutation, RequestBody};

#[derive(Debug, Clone)]
pub struct BodyLimits {
    pub max_body_size: usize,
    pub require_json_mutations: bool,
}

impl BodyLimits {
    pub fn from_config(config: &SecurityConfig) -> Self {
        Self {
            max_body_size: config.max_body_size,
            require_json_mutations: config.require_json_mutations,
        }
    }

    /// Classify an already buffered body.
    pub fn classify(
        &self,
        method: &Method,
        is_json: bool,
        bytes: &Bytes,
    ) -> Result<RequestBody, GatewayError> {
        if bytes.is_empty() {
            return Ok(RequestBody::Empty);
        }

        let mutation = is_mutation(method);
        if is_json {
            return match serde_json::from_slice(bytes) {
                Ok(value) => Ok(RequestBody::Json(value)),
                Err(e) if mutation => Err(GatewayError::InvalidJson(e.to_string())),
                Err(_) => Ok(RequestBody::Raw(bytes.clone())),
            };
        }

        if mutation && self.require_json_mutations {
            return Err(GatewayError::InvalidContentType);
        }
        Ok(RequestBody::Raw(bytes.clone()))
    }
}

fn declared_length(request: &Request<Body>) -> Option<usize> {
    request
        .headers()
        .get(header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}

fn is_length_limit(err: &axum::Error) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(e) = source {
        if e.is::<LengthLimitError>() {
            return true;
        }
        source = e.source();
    }
    false
}

pub async fn body_limit_middleware(
    State(limits): State<Arc<BodyLimits>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let limit = limits.max_body_size;
    if declared_length(&request).is_some_and(|len| len > limit) {
        return GatewayError::PayloadTooLarge { limit }.into_response();
    }

    let (mut parts, body) = request.into_parts();
    let bytes = match axum::body::to_bytes(body, limit).await {
        Ok(bytes) => bytes,
        Err(e) if is_length_limit(&e) => {
            return GatewayError::PayloadTooLarge { limit }.into_response();
        }
        Err(e) => {
            return GatewayError::internal(format!("failed to read request body: {e}"))
                .into_response();
        }
    };

    let is_json = is_json_content_type(&parts.headers);
    match limits.classify(&parts.method, is_json, &bytes) {
        Ok(parsed) => {
            parts.extensions.insert(parsed);
            next.run(Request::from_parts(parts, Body::from(bytes))).await
        }
        Err(err) => err.into_response(),
    }
}
