//! Upstream calls.
//!
//! # Responsibilities
//! - Send the transformed request over a pooled HTTP client
//! - Bound connect time and total wait (head and body)
//! - Collapse every transport failure into `SERVICE_UNAVAILABLE`
//!
//! # Design Decisions
//! - No retries: a failed call is reported, not replayed
//! - Non-2xx upstream statuses are responses, not failures
//! - Bodies are buffered (capped) so the response can be sanitized

use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    http::{Request, Response},
};
use http_body_util::{BodyExt, Limited};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::config::TimeoutConfig;
use crate::error::GatewayError;
use crate::observability::metrics;

pub struct Forwarder {
    client: Client<HttpConnector, Body>,
    upstream_timeout: Duration,
    max_response_size: usize,
}

impl Forwarder {
    pub fn new(timeouts: &TimeoutConfig, max_response_size: usize) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(timeouts.connect_secs)));
        connector.set_nodelay(true);

        let client = Client::builder(TokioExecutor::new()).build(connector);

        Self {
            client,
            upstream_timeout: Duration::from_secs(timeouts.upstream_secs),
            max_response_size,
        }
    }

    /// Perform the call and buffer the upstream body.
    pub async fn forward(
        &self,
        service: &str,
        request: Request<Body>,
    ) -> Result<Response<Bytes>, GatewayError> {
        let uri = request.uri().clone();
        let call = async {
            let response = self
                .client
                .request(request)
                .await
                .map_err(|e| GatewayError::unavailable(service, e))?;
            let (parts, body) = response.into_parts();
            let bytes = Limited::new(body, self.max_response_size)
                .collect()
                .await
                .map_err(|e| GatewayError::unavailable(service, format!("reading body: {e}")))?
                .to_bytes();
            Ok::<_, GatewayError>(Response::from_parts(parts, bytes))
        };

        let result = match tokio::time::timeout(self.upstream_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(GatewayError::unavailable(
                service,
                format!("no response within {:?}", self.upstream_timeout),
            )),
        };

        if let Err(err) = &result {
            tracing::warn!(service = %service, uri = %uri, error = %err, "Upstream call failed");
            metrics::record_upstream_failure(service);
        }
        result
    }
}
