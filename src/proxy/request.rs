//! Outbound request transformation.
//!
//! # Responsibilities
//! - Rewrite the public path onto the upstream path space (host versioned)
//! - Rename legacy JSON body fields to their canonical names
//! - Replace client identity headers with verified ones
//! - Add forwarding headers and the correlation id
//!
//! # Design Decisions
//! - Client-supplied `X-User-ID` / `X-User-Role` are always dropped
//! - Hop-by-hop headers never cross the gateway
//! - Query string is preserved untouched

use std::net::IpAddr;

use axum::{
    body::{Body, Bytes},
    http::{header, request::Parts, HeaderMap, HeaderName, HeaderValue, Request, Uri},
};
use serde_json::Value;
use url::Url;

use crate::config::{FieldRename, RewriteConfig};
use crate::error::GatewayError;
use crate::http::context::RequestBody;
use crate::http::request::X_REQUEST_ID;
use crate::proxy::strip_hop_by_hop;
use crate::routing::{RouteEntry, VersionedHostMatcher};
use crate::security::auth::Identity;

pub const X_USER_ID: &str = "x-user-id";
pub const X_USER_ROLE: &str = "x-user-role";
const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_FORWARDED_PROTO: &str = "x-forwarded-proto";
const X_FORWARDED_HOST: &str = "x-forwarded-host";

/// Everything the transformer needs to know about the inbound request.
pub struct Inbound<'a> {
    pub parts: &'a Parts,
    pub body: &'a RequestBody,
    pub route: &'a RouteEntry,
    pub identity: &'a Identity,
    /// Immediate TCP peer, appended to `X-Forwarded-For`.
    pub peer: Option<IpAddr>,
    pub request_id: &'a str,
}

pub struct RequestTransformer {
    public_prefix: String,
    upstream_prefix: String,
    versions: VersionedHostMatcher,
    field_renames: Vec<FieldRename>,
}

impl RequestTransformer {
    pub fn from_config(config: &RewriteConfig) -> Self {
        Self {
            public_prefix: config.public_prefix.trim_end_matches('/').to_string(),
            upstream_prefix: config.upstream_prefix.trim_end_matches('/').to_string(),
            versions: VersionedHostMatcher::new(&config.host_versions),
            field_renames: config.field_renames.clone(),
        }
    }

    /// Map a public path onto the upstream path space.
    ///
    /// `/api/v1/users/7` becomes `/api/users/7`, or `/api/v2/users/7` when
    /// the host carries the `v2` label. Paths outside the public prefix are
    /// forwarded unchanged.
    pub fn rewrite_path(&self, path: &str, host: Option<&str>) -> String {
        let rest = match path.strip_prefix(self.public_prefix.as_str()) {
            Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
            _ => return path.to_string(),
        };
        match host.and_then(|h| self.versions.version_of(h)) {
            Some(version) => format!("{}/{}{}", self.upstream_prefix, version, rest),
            None => format!("{}{}", self.upstream_prefix, rest),
        }
    }

    /// Rename legacy top-level fields. Returns whether anything changed.
    pub fn rename_fields(&self, value: &mut Value) -> bool {
        let Some(object) = value.as_object_mut() else {
            return false;
        };
        let mut changed = false;
        for rename in &self.field_renames {
            if object.contains_key(&rename.to) {
                continue;
            }
            if let Some(legacy) = object.remove(&rename.from) {
                object.insert(rename.to.clone(), legacy);
                changed = true;
            }
        }
        changed
    }

    fn body_bytes(&self, body: &RequestBody) -> Result<Bytes, GatewayError> {
        match body {
            RequestBody::Empty => Ok(Bytes::new()),
            RequestBody::Raw(bytes) => Ok(bytes.clone()),
            RequestBody::Json(value) => {
                let mut value = value.clone();
                self.rename_fields(&mut value);
                serde_json::to_vec(&value)
                    .map(Bytes::from)
                    .map_err(|e| GatewayError::internal(format!("failed to re-encode request body: {e}")))
            }
        }
    }

    /// Build the request sent to the route's upstream service.
    pub fn build(&self, inbound: Inbound<'_>) -> Result<Request<Body>, GatewayError> {
        let parts = inbound.parts;
        let host = parts
            .headers
            .get(header::HOST)
            .and_then(|v| v.to_str().ok())
            .or_else(|| parts.uri.host())
            .map(str::to_string);

        let path = self.rewrite_path(parts.uri.path(), host.as_deref());
        let uri = upstream_uri(&inbound.route.target, &path, parts.uri.query())?;
        let authority = uri
            .authority()
            .map(|a| a.as_str().to_string())
            .ok_or_else(|| GatewayError::internal("upstream URI has no authority"))?;

        let body = self.body_bytes(inbound.body)?;

        let mut headers = parts.headers.clone();
        strip_hop_by_hop(&mut headers);
        headers.remove(header::CONTENT_LENGTH);
        headers.remove(X_USER_ID);
        headers.remove(X_USER_ROLE);

        set_header(&mut headers, header::HOST, &authority)?;
        if !body.is_empty() {
            headers.insert(header::CONTENT_LENGTH, HeaderValue::from(body.len()));
        }
        inject_identity(&mut headers, inbound.identity);
        set_header(&mut headers, HeaderName::from_static(X_REQUEST_ID), inbound.request_id)?;
        add_forwarding(&mut headers, inbound.peer, host.as_deref());

        let mut request = Request::builder()
            .method(parts.method.clone())
            .uri(uri)
            .body(Body::from(body))
            .map_err(|e| GatewayError::internal(format!("failed to build upstream request: {e}")))?;
        *request.headers_mut() = headers;
        Ok(request)
    }
}

fn set_header(headers: &mut HeaderMap, name: HeaderName, value: &str) -> Result<(), GatewayError> {
    let value = HeaderValue::from_str(value)
        .map_err(|e| GatewayError::internal(format!("invalid value for {name}: {e}")))?;
    headers.insert(name, value);
    Ok(())
}

fn inject_identity(headers: &mut HeaderMap, identity: &Identity) {
    if let Some(value) = identity.subject().and_then(|s| HeaderValue::from_str(&s).ok()) {
        headers.insert(X_USER_ID, value);
    }
    if let Some(value) = identity.role().and_then(|r| HeaderValue::from_str(r).ok()) {
        headers.insert(X_USER_ROLE, value);
    }
}

fn add_forwarding(headers: &mut HeaderMap, peer: Option<IpAddr>, host: Option<&str>) {
    if let Some(peer) = peer {
        let forwarded = match headers.get(X_FORWARDED_FOR).and_then(|v| v.to_str().ok()) {
            Some(existing) => format!("{existing}, {peer}"),
            None => peer.to_string(),
        };
        if let Ok(value) = HeaderValue::from_str(&forwarded) {
            headers.insert(X_FORWARDED_FOR, value);
        }
    }
    headers.insert(X_FORWARDED_PROTO, HeaderValue::from_static("http"));
    if let Some(value) = host.and_then(|h| HeaderValue::from_str(h).ok()) {
        headers.insert(X_FORWARDED_HOST, value);
    }
}

/// Join the service base URL with the rewritten path and original query.
pub fn upstream_uri(target: &Url, path: &str, query: Option<&str>) -> Result<Uri, GatewayError> {
    let host = target
        .host_str()
        .ok_or_else(|| GatewayError::internal(format!("service URL {target} has no host")))?;
    let authority = match target.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    };
    let base = target.path().trim_end_matches('/');
    let uri = match query {
        Some(q) => format!("{}://{}{}{}?{}", target.scheme(), authority, base, path, q),
        None => format!("{}://{}{}{}", target.scheme(), authority, base, path),
    };
    uri.parse()
        .map_err(|e| GatewayError::internal(format!("invalid upstream URI {uri}: {e}")))
}
