//! Client-facing error taxonomy.
//!
//! Every failure detected by a middleware step is turned into a
//! [`GatewayError`] and rendered as a structured JSON body with a stable
//! machine-readable code. Only [`GatewayError::Internal`] carries diagnostic
//! detail, and that detail stays in the server log.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

pub type GatewayResult<T> = Result<T, GatewayError>;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// Originating address is on the denylist.
    #[error("address is denylisted")]
    Forbidden,

    /// Missing, malformed, expired or badly signed credential.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// A rate limit policy rejected the request.
    #[error("rate limit '{policy}' exceeded")]
    RateLimitExceeded {
        policy: String,
        message: String,
        retry_after: Duration,
    },

    #[error("request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error("unsupported content type")]
    InvalidContentType,

    #[error("invalid JSON body: {0}")]
    InvalidJson(String),

    #[error("no route for {0}")]
    RouteNotFound(String),

    /// Upstream unreachable, timed out, or failed at the transport level.
    #[error("service '{service}' unavailable: {reason}")]
    ServiceUnavailable { service: String, reason: String },

    #[error("internal gateway error: {0}")]
    Internal(String),
}

impl GatewayError {
    pub fn auth(msg: impl Into<String>) -> Self {
        GatewayError::Auth(msg.into())
    }

    pub fn unavailable(service: impl Into<String>, reason: impl ToString) -> Self {
        GatewayError::ServiceUnavailable {
            service: service.into(),
            reason: reason.to_string(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        GatewayError::Internal(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::Forbidden => StatusCode::FORBIDDEN,
            GatewayError::Auth(_) => StatusCode::UNAUTHORIZED,
            GatewayError::RateLimitExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            GatewayError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            GatewayError::InvalidContentType | GatewayError::InvalidJson(_) => {
                StatusCode::BAD_REQUEST
            }
            GatewayError::RouteNotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            GatewayError::Forbidden => "FORBIDDEN",
            GatewayError::Auth(_) => "AUTH_ERROR",
            GatewayError::RateLimitExceeded { .. } => "TOO_MANY_REQUESTS",
            GatewayError::PayloadTooLarge { .. } => "PAYLOAD_TOO_LARGE",
            GatewayError::InvalidContentType => "INVALID_CONTENT_TYPE",
            GatewayError::InvalidJson(_) => "INVALID_JSON",
            GatewayError::RouteNotFound(_) => "ROUTE_NOT_FOUND",
            GatewayError::ServiceUnavailable { .. } => "SERVICE_UNAVAILABLE",
            GatewayError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Message safe to show to the client.
    pub fn user_message(&self) -> String {
        match self {
            GatewayError::Forbidden => "Forbidden".to_string(),
            GatewayError::Auth(msg) => msg.clone(),
            GatewayError::RateLimitExceeded { message, .. } => message.clone(),
            GatewayError::PayloadTooLarge { .. } => {
                "Request payload exceeds maximum size.".to_string()
            }
            GatewayError::InvalidContentType => {
                "Content-Type must be application/json.".to_string()
            }
            GatewayError::InvalidJson(_) => "Request body must be valid JSON.".to_string(),
            GatewayError::RouteNotFound(_) => "No matching route found".to_string(),
            GatewayError::ServiceUnavailable { .. } => {
                "Service temporarily unavailable".to_string()
            }
            GatewayError::Internal(_) => "Internal gateway error".to_string(),
        }
    }

    /// Log this error at a level matching its category.
    pub fn log(&self) {
        let code = self.error_code();
        match self {
            GatewayError::Internal(detail) => {
                tracing::error!(error_code = code, detail = %detail, "Internal gateway error");
            }
            GatewayError::ServiceUnavailable { service, reason } => {
                tracing::error!(error_code = code, service = %service, reason = %reason, "Upstream unavailable");
            }
            GatewayError::Auth(_) | GatewayError::Forbidden | GatewayError::RateLimitExceeded { .. } => {
                tracing::warn!(error = %self, error_code = code, "Request rejected");
            }
            _ => {
                tracing::debug!(error = %self, error_code = code, "Client error");
            }
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        self.log();

        let status = self.status_code();
        let mut body = json!({
            "success": false,
            "error": self.error_code(),
            "message": self.user_message(),
        });

        let retry_after = match &self {
            GatewayError::RateLimitExceeded { retry_after, .. } => {
                let secs = retry_after.as_secs_f64().ceil() as u64;
                body["retryAfter"] = json!(secs);
                Some(secs)
            }
            _ => None,
        };

        let mut response = (status, Json(body)).into_response();
        if let Some(secs) = retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}
