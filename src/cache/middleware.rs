//! Cache step of the middleware chain.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::cache::key::cache_key;
use crate::cache::response_cache::{mark, CachedResponse, ResponseCache};
use crate::error::GatewayError;
use crate::http::context::is_mutation;
use crate::security::auth::Identity;

pub async fn cache_middleware(
    State(cache): State<Arc<ResponseCache>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    if is_mutation(&method) {
        cache.invalidate_for_mutation(&path);
        return next.run(request).await;
    }

    if !cache.is_cacheable(&method, &path) {
        return next.run(request).await;
    }

    let identity = request.extensions().get::<Identity>();
    let subject = identity.and_then(Identity::subject);
    // A verified caller without a subject cannot be told apart from others.
    if subject.is_none() && identity.is_some_and(|i| !i.is_anonymous()) {
        return next.run(request).await;
    }
    let host = request
        .headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| request.uri().host());
    let version = host.and_then(|h| cache.version_of(h));
    let key = cache_key(
        method.as_str(),
        version,
        &path,
        request.uri().query(),
        subject.as_deref(),
    );

    if let Some(hit) = cache.lookup(&key) {
        tracing::debug!(key = %key, "Cache hit");
        return hit.to_response(&key);
    }

    let response = next.run(request).await;
    let (mut parts, body) = response.into_parts();
    mark(&mut parts.headers, "MISS", &key);

    if !parts.status.is_success() {
        return Response::from_parts(parts, body);
    }

    // The proxy handler returns fully buffered bodies, so this does not wait on the network.
    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            return GatewayError::internal(format!("failed to buffer response for cache: {e}"))
                .into_response();
        }
    };

    cache.insert(
        &key,
        &path,
        CachedResponse {
            status: parts.status,
            content_type: parts.headers.get(header::CONTENT_TYPE).cloned(),
            body: bytes.clone(),
        },
    );

    Response::from_parts(parts, Body::from(bytes))
}
