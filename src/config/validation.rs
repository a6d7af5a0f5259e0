//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (routes reference existing services)
//! - Validate value ranges (windows, quotas, TTLs, timeouts > 0)
//! - Reject ambiguous credential verification setups
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no routes configured")]
    NoRoutes,

    #[error("route '{route}' references unknown service '{service}'")]
    UnknownService { route: String, service: String },

    #[error("route '{route}' has invalid path prefix '{prefix}'")]
    InvalidPrefix { route: String, prefix: String },

    #[error("path prefix '{0}' is configured more than once")]
    DuplicatePrefix(String),

    #[error("service '{service}' has invalid base URL '{url}'")]
    InvalidServiceUrl { service: String, url: String },

    #[error("no credential verification configured: set exactly one of jwt_secret or jwt_public_key")]
    NoVerificationMode,

    #[error("both jwt_secret and jwt_public_key are set; exactly one verification mode may be active")]
    ConflictingVerificationModes,

    #[error("rate limit policy '{0}' needs a positive window and quota")]
    InvalidRateLimitPolicy(String),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("invalid listener address '{0}'")]
    InvalidBindAddress(String),

    #[error("admin API enabled without an api_key")]
    MissingAdminKey,
}

/// Validate a parsed configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    for (service, url) in &config.services {
        let valid = Url::parse(url)
            .map(|u| u.scheme() == "http" && u.host_str().is_some())
            .unwrap_or(false);
        if !valid {
            errors.push(ValidationError::InvalidServiceUrl {
                service: service.clone(),
                url: url.clone(),
            });
        }
    }

    if config.routes.is_empty() {
        errors.push(ValidationError::NoRoutes);
    }

    let mut seen = HashSet::new();
    for route in &config.routes {
        if !config.services.contains_key(&route.service) {
            errors.push(ValidationError::UnknownService {
                route: route.name.clone(),
                service: route.service.clone(),
            });
        }
        if !route.path_prefix.starts_with('/') {
            errors.push(ValidationError::InvalidPrefix {
                route: route.name.clone(),
                prefix: route.path_prefix.clone(),
            });
        }
        if !seen.insert(route.path_prefix.trim_end_matches('/')) {
            errors.push(ValidationError::DuplicatePrefix(route.path_prefix.clone()));
        }
    }

    let has_secret = config.auth.jwt_secret.as_ref().is_some_and(|s| !s.trim().is_empty());
    let has_public_key = config
        .auth
        .jwt_public_key
        .as_ref()
        .is_some_and(|k| !k.trim().is_empty());
    match (has_secret, has_public_key) {
        (false, false) => errors.push(ValidationError::NoVerificationMode),
        (true, true) => errors.push(ValidationError::ConflictingVerificationModes),
        _ => {}
    }

    for policy in &config.rate_limit.policies {
        if policy.window_ms == 0 || policy.max_requests == 0 {
            errors.push(ValidationError::InvalidRateLimitPolicy(policy.name.clone()));
        }
    }
    if config.rate_limit.slow_down.enabled && config.rate_limit.slow_down.window_ms == 0 {
        errors.push(ValidationError::Zero("rate_limit.slow_down.window_ms"));
    }

    if config.cache.enabled {
        if config.cache.default_ttl_secs == 0 {
            errors.push(ValidationError::Zero("cache.default_ttl_secs"));
        }
        if config.cache.sweep_interval_secs == 0 {
            errors.push(ValidationError::Zero("cache.sweep_interval_secs"));
        }
    }

    if config.timeouts.upstream_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.upstream_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.request_secs"));
    }
    if config.security.max_body_size == 0 {
        errors.push(ValidationError::Zero("security.max_body_size"));
    }

    if config.admin.enabled && config.admin.api_key.trim().is_empty() {
        errors.push(ValidationError::MissingAdminKey);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
