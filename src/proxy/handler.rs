//! Terminal handler of the middleware chain.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    response::{IntoResponse, Response},
};

use crate::error::GatewayError;
use crate::http::context::{request_id, ClientAddr, MatchedRoute, RequestBody};
use crate::proxy::forwarder::Forwarder;
use crate::proxy::request::{Inbound, RequestTransformer};
use crate::proxy::response::ResponseTransformer;
use crate::security::auth::Identity;

/// Shared state of the proxy handler.
#[derive(Clone)]
pub struct ProxyState {
    pub requests: Arc<RequestTransformer>,
    pub forwarder: Arc<Forwarder>,
    pub responses: Arc<ResponseTransformer>,
}

/// Transform, forward and sanitize one request.
pub async fn proxy_handler(State(state): State<ProxyState>, request: Request<Body>) -> Response {
    match proxy(&state, request).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

async fn proxy(state: &ProxyState, request: Request<Body>) -> Result<Response, GatewayError> {
    let (parts, _body) = request.into_parts();
    let route = parts
        .extensions
        .get::<MatchedRoute>()
        .map(|r| r.0.clone())
        .ok_or_else(|| GatewayError::RouteNotFound(parts.uri.path().to_string()))?;
    let identity = parts
        .extensions
        .get::<Identity>()
        .cloned()
        .unwrap_or(Identity::Anonymous);
    let body = parts
        .extensions
        .get::<RequestBody>()
        .cloned()
        .unwrap_or_default();
    let peer = parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|c| c.0.ip())
        .or_else(|| parts.extensions.get::<ClientAddr>().map(|c| c.0));
    let request_id = request_id(&parts.headers).to_string();

    let outbound = state.requests.build(Inbound {
        parts: &parts,
        body: &body,
        route: &route,
        identity: &identity,
        peer,
        request_id: &request_id,
    })?;

    tracing::debug!(
        request_id = %request_id,
        route = %route.name,
        service = %route.service,
        upstream = %outbound.uri(),
        "Forwarding request"
    );

    let upstream = state.forwarder.forward(&route.service, outbound).await?;
    Ok(state.responses.transform(upstream))
}
