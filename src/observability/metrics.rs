//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define gateway metrics (requests, latency, rejections, cache, upstream)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by method, status, route
//! - `gateway_request_duration_seconds` (histogram): latency distribution
//! - `gateway_rate_limited_total` (counter): rejections by policy
//! - `gateway_denied_total` (counter): denylist rejections
//! - `gateway_cache_events_total` (counter): hit/miss/store/invalidate
//! - `gateway_cache_entries` (gauge): live cache entries
//! - `gateway_upstream_failures_total` (counter): transport failures by service
//!
//! # Design Decisions
//! - Low-overhead metric updates (atomic operations)
//! - Recording is a no-op until a recorder is installed, so tests need no setup

use std::net::SocketAddr;
use std::time::Instant;

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::http::context::MatchedRoute;

/// Latency buckets for proxied web traffic, in seconds.
const LATENCY_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0,
];

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .set_buckets(LATENCY_BUCKETS)?
        .install()?;

    describe_counter!("gateway_requests_total", "Total requests handled by the gateway");
    describe_histogram!(
        "gateway_request_duration_seconds",
        "End-to-end request duration in seconds"
    );
    describe_counter!("gateway_rate_limited_total", "Requests rejected by a rate limit policy");
    describe_counter!("gateway_denied_total", "Requests rejected by the address denylist");
    describe_counter!("gateway_cache_events_total", "Response cache events by kind");
    describe_gauge!("gateway_cache_entries", "Entries currently held by the response cache");
    describe_counter!(
        "gateway_upstream_failures_total",
        "Upstream calls that failed at the transport level"
    );

    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_request(method: &str, status: u16, route: &str, start: Instant) {
    let status = status.to_string();
    counter!(
        "gateway_requests_total",
        "method" => method.to_string(),
        "status" => status,
        "route" => route.to_string()
    )
    .increment(1);
    histogram!("gateway_request_duration_seconds", "route" => route.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_rate_limited(policy: &str) {
    counter!("gateway_rate_limited_total", "policy" => policy.to_string()).increment(1);
}

pub fn record_denied() {
    counter!("gateway_denied_total").increment(1);
}

/// `event` is one of `hit`, `miss`, `store`, `invalidate`.
pub fn record_cache_event(event: &'static str) {
    counter!("gateway_cache_events_total", "event" => event).increment(1);
}

pub fn set_cache_entries(count: usize) {
    gauge!("gateway_cache_entries").set(count as f64);
}

pub fn record_upstream_failure(service: &str) {
    counter!("gateway_upstream_failures_total", "service" => service.to_string()).increment(1);
}

/// Record every request that enters the gateway, including rejections.
pub async fn track_requests(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let response = next.run(request).await;

    let route = response
        .extensions()
        .get::<MatchedRoute>()
        .map(|r| r.0.name.as_str())
        .unwrap_or("none");
    record_request(&method, response.status().as_u16(), route, start);
    response
}
