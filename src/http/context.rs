//! Typed request extensions carried through the middleware chain.
//!
//! Each step writes what it learned into the request's extensions so later
//! steps never re-derive it:
//! - denylist → [`ClientAddr`]
//! - route resolution → [`MatchedRoute`]
//! - auth → [`crate::security::auth::Identity`]
//! - body validation → [`RequestBody`]

use std::net::IpAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::http::{header, HeaderMap, Method};
use serde_json::Value;

use crate::routing::RouteEntry;

/// The originating client address, after trusted proxy resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientAddr(pub IpAddr);

/// The route table entry the request path resolved to.
#[derive(Debug, Clone)]
pub struct MatchedRoute(pub Arc<RouteEntry>);

/// The buffered request body.
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    Raw(Bytes),
}

impl RequestBody {
    pub fn is_empty(&self) -> bool {
        matches!(self, RequestBody::Empty)
    }
}

/// `application/json` or any `+json` media type.
pub fn is_json_content_type(headers: &HeaderMap) -> bool {
    let Some(value) = headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    let essence = value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json" || essence.ends_with("+json")
}

/// Methods that change upstream state. They get their bodies validated and
/// invalidate related cache entries instead of being cached.
pub fn is_mutation(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

/// Correlation id of the request, if the id layer has run.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(crate::http::request::X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn with_type(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn json_media_types() {
        assert!(is_json_content_type(&with_type("application/json")));
        assert!(is_json_content_type(&with_type("Application/JSON; charset=utf-8")));
        assert!(is_json_content_type(&with_type("application/problem+json")));
        assert!(!is_json_content_type(&with_type("text/html")));
        assert!(!is_json_content_type(&HeaderMap::new()));
    }

    #[test]
    fn delete_is_a_mutation() {
        for method in [Method::POST, Method::PUT, Method::PATCH, Method::DELETE] {
            assert!(is_mutation(&method), "{method}");
        }
        for method in [Method::GET, Method::HEAD, Method::OPTIONS] {
            assert!(!is_mutation(&method), "{method}");
        }
    }
}
