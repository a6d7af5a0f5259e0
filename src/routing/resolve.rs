//! Route resolution step of the middleware chain.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::GatewayError;
use crate::http::context::MatchedRoute;
use crate::routing::RouteTable;

/// Attach the matched route, or fail with `ROUTE_NOT_FOUND`.
pub async fn resolve_route_middleware(
    State(table): State<Arc<RouteTable>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path();
    match table.match_path(path) {
        Some(route) => {
            tracing::debug!(route = %route.name, service = %route.service, path = %path, "Route matched");
            request.extensions_mut().insert(MatchedRoute(route.clone()));
            let mut response = next.run(request).await;
            // Lets outer layers label the response by route.
            response.extensions_mut().insert(MatchedRoute(route));
            response
        }
        None => {
            tracing::warn!(path = %path, "No route matched");
            GatewayError::RouteNotFound(path.to_string()).into_response()
        }
    }
}
