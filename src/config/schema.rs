//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files, and
//! every section has defaults so a minimal file (or none at all) is valid.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::IpAddr;

/// Root configuration for the edge gateway.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Backend service base URLs, keyed by service name.
    pub services: BTreeMap<String, String>,

    /// Route definitions mapping path prefixes to services.
    pub routes: Vec<RouteConfig>,

    /// Bearer credential verification.
    pub auth: AuthConfig,

    /// Rate limiting policies.
    pub rate_limit: RateLimitConfig,

    /// Response cache settings.
    pub cache: CacheConfig,

    /// Outbound request rewriting.
    pub rewrite: RewriteConfig,

    /// Response sanitizing.
    pub response: ResponseConfig,

    /// Denylist, trusted proxies and size ceilings.
    pub security: SecurityConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Admin API settings.
    pub admin: AdminConfig,
}

/// Ships the five backend services and the public route table in front of
/// them. Verification keys still have to be supplied.
impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            services: default_services(),
            routes: default_routes(),
            auth: AuthConfig::default(),
            rate_limit: RateLimitConfig::default(),
            cache: CacheConfig::default(),
            rewrite: RewriteConfig::default(),
            response: ResponseConfig::default(),
            security: SecurityConfig::default(),
            timeouts: TimeoutConfig::default(),
            observability: ObservabilityConfig::default(),
            admin: AdminConfig::default(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

/// Route configuration mapping a path prefix to a backend service.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Route identifier for logging/metrics.
    pub name: String,

    /// Path prefix to match (segment-aware).
    pub path_prefix: String,

    /// Name of the service in [`GatewayConfig::services`].
    pub service: String,

    /// Whether a verified credential is mandatory on this route.
    #[serde(default = "default_true")]
    pub auth_required: bool,
}

impl RouteConfig {
    pub fn new(name: &str, path_prefix: &str, service: &str, auth_required: bool) -> Self {
        Self {
            name: name.to_string(),
            path_prefix: path_prefix.to_string(),
            service: service.to_string(),
            auth_required,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_services() -> BTreeMap<String, String> {
    [
        ("user", "http://localhost:3001"),
        ("gamification", "http://localhost:3002"),
        ("ai", "http://localhost:3003"),
        ("content", "http://localhost:3005"),
        ("integrations", "http://localhost:3006"),
    ]
    .into_iter()
    .map(|(name, url)| (name.to_string(), url.to_string()))
    .collect()
}

fn default_routes() -> Vec<RouteConfig> {
    vec![
        RouteConfig::new("users-auth", "/api/v1/users/auth", "user", false),
        RouteConfig::new("test-user", "/api/v1/test-user", "user", false),
        RouteConfig::new("users", "/api/v1/users", "user", true),
        RouteConfig::new("ai", "/api/v1/ai", "ai", true),
        RouteConfig::new("gamification", "/api/v1/gamification", "gamification", true),
        RouteConfig::new("content", "/api/v1/content", "content", true),
        RouteConfig::new("integrations", "/api/v1/integrations", "integrations", true),
    ]
}

/// Bearer credential verification.
///
/// Exactly one of `jwt_secret` and `jwt_public_key` must be set.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Shared secret for HMAC-signed tokens.
    pub jwt_secret: Option<String>,

    /// PEM-encoded RSA public key for RSA-signed tokens.
    pub jwt_public_key: Option<String>,

    /// Reject credential-less requests on routes that require auth.
    pub enforce: bool,

    /// Expected `iss` claim, if any.
    pub issuer: Option<String>,

    /// Expected `aud` claim, if any.
    pub audience: Option<String>,

    /// Clock skew tolerance for `exp`/`nbf`.
    pub leeway_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            jwt_public_key: None,
            enforce: true,
            issuer: None,
            audience: None,
            leeway_secs: 0,
        }
    }
}

/// What a rate limit bucket is keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RateLimitKey {
    /// Originating client address.
    #[default]
    ClientAddr,
    /// Verified subject; anonymous callers fall back to their address.
    Subject,
}

/// A named sliding-window policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitPolicyConfig {
    pub name: String,

    /// Window length in milliseconds.
    pub window_ms: u64,

    /// Requests allowed per window.
    pub max_requests: u32,

    /// Path prefixes the policy applies to.
    pub path_prefixes: Vec<String>,

    #[serde(default)]
    pub key: RateLimitKey,

    /// Message returned to throttled clients.
    #[serde(default = "default_rate_limit_message")]
    pub message: String,
}

fn default_rate_limit_message() -> String {
    "Too many requests, please try again later.".to_string()
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enable rate limiting.
    pub enabled: bool,

    /// Policies, evaluated in order.
    pub policies: Vec<RateLimitPolicyConfig>,

    /// Progressive delay before hard limits kick in.
    pub slow_down: SlowDownConfig,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            policies: vec![
                RateLimitPolicyConfig {
                    name: "auth".to_string(),
                    window_ms: 15 * 60 * 1000,
                    max_requests: 5,
                    path_prefixes: vec!["/api/v1/users/auth".to_string()],
                    key: RateLimitKey::ClientAddr,
                    message: "Too many authentication attempts. Please try again later."
                        .to_string(),
                },
                RateLimitPolicyConfig {
                    name: "api".to_string(),
                    window_ms: 60 * 1000,
                    max_requests: 60,
                    path_prefixes: vec!["/api/".to_string()],
                    key: RateLimitKey::ClientAddr,
                    message: "API rate limit exceeded. Please slow down.".to_string(),
                },
                RateLimitPolicyConfig {
                    name: "strict".to_string(),
                    window_ms: 60 * 1000,
                    max_requests: 10,
                    path_prefixes: vec![
                        "/api/v1/users/export".to_string(),
                        "/api/v1/integrations/export".to_string(),
                    ],
                    key: RateLimitKey::Subject,
                    message: "Rate limit exceeded for this sensitive operation.".to_string(),
                },
            ],
            slow_down: SlowDownConfig::default(),
        }
    }
}

/// Progressive slow-down configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SlowDownConfig {
    pub enabled: bool,

    /// Window length in milliseconds.
    pub window_ms: u64,

    /// Requests per window served without delay.
    pub delay_after: u32,

    /// Added delay per request over `delay_after`.
    pub delay_ms: u64,

    /// Upper bound for a single delay.
    pub max_delay_ms: u64,

    /// Path prefixes the slow-down applies to.
    pub path_prefixes: Vec<String>,
}

impl Default for SlowDownConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            window_ms: 15 * 60 * 1000,
            delay_after: 50,
            delay_ms: 500,
            max_delay_ms: 10_000,
            path_prefixes: vec!["/api/".to_string()],
        }
    }
}

/// Per-prefix TTL override.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheTtlRule {
    pub path_prefix: String,
    pub ttl_secs: u64,
}

/// Mutations under `path_prefix` drop every cached key containing one of `patterns`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InvalidationRule {
    pub path_prefix: String,
    pub patterns: Vec<String>,
}

/// Response cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,

    /// TTL applied when no rule matches.
    pub default_ttl_secs: u64,

    /// TTL overrides, first matching prefix wins.
    pub ttl_rules: Vec<CacheTtlRule>,

    /// Path prefixes that are never cached.
    pub exclude: Vec<String>,

    pub invalidation_rules: Vec<InvalidationRule>,

    /// Interval of the bulk expiry sweep.
    pub sweep_interval_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            default_ttl_secs: 300,
            ttl_rules: vec![
                CacheTtlRule {
                    path_prefix: "/api/v1/users/profile".to_string(),
                    ttl_secs: 600,
                },
                CacheTtlRule {
                    path_prefix: "/api/v1/gamification/leaderboard".to_string(),
                    ttl_secs: 300,
                },
                CacheTtlRule {
                    path_prefix: "/api/v1/gamification/missions".to_string(),
                    ttl_secs: 1800,
                },
            ],
            exclude: vec!["/api/v1/users/auth".to_string()],
            invalidation_rules: vec![
                InvalidationRule {
                    path_prefix: "/api/v1/gamification/missions".to_string(),
                    patterns: vec!["missions".to_string()],
                },
                InvalidationRule {
                    path_prefix: "/api/v1/users/profile".to_string(),
                    patterns: vec!["profile".to_string()],
                },
            ],
            sweep_interval_secs: 60,
        }
    }
}

/// A legacy request field and its canonical name.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FieldRename {
    pub from: String,
    pub to: String,
}

/// Outbound request rewriting.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RewriteConfig {
    /// Public path prefix clients use.
    pub public_prefix: String,

    /// Upstream prefix for the default host.
    pub upstream_prefix: String,

    /// Host labels that select a versioned upstream path space.
    pub host_versions: Vec<String>,

    pub field_renames: Vec<FieldRename>,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            public_prefix: "/api/v1".to_string(),
            upstream_prefix: "/api".to_string(),
            host_versions: vec!["v2".to_string()],
            field_renames: vec![FieldRename {
                from: "uid".to_string(),
                to: "userId".to_string(),
            }],
        }
    }
}

/// Response sanitizing.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ResponseConfig {
    /// Value of the `X-Gateway` header.
    pub gateway_id: String,

    /// Upstream headers removed before the response leaves the gateway.
    pub strip_headers: Vec<String>,

    /// JSON fields removed from upstream bodies.
    pub strip_fields: Vec<String>,
}

impl Default for ResponseConfig {
    fn default() -> Self {
        Self {
            gateway_id: "edge-gateway".to_string(),
            strip_headers: vec![
                "server".to_string(),
                "x-powered-by".to_string(),
                "x-aspnet-version".to_string(),
                "x-runtime".to_string(),
            ],
            strip_fields: vec!["internal".to_string(), "secret".to_string()],
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Addresses refused outright.
    pub denylist: Vec<IpAddr>,

    /// Peers whose `X-Forwarded-For` is trusted.
    pub trusted_proxies: Vec<IpAddr>,

    /// Enable security response headers.
    pub enable_headers: bool,

    /// Maximum request body size in bytes.
    pub max_body_size: usize,

    /// Maximum upstream response body size in bytes.
    pub max_response_size: usize,

    /// Require JSON bodies on POST/PUT/PATCH.
    pub require_json_mutations: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            denylist: Vec::new(),
            trusted_proxies: Vec::new(),
            enable_headers: true,
            max_body_size: 1024 * 1024, // 1MB
            max_response_size: 10 * 1024 * 1024,
            require_json_mutations: true,
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upstream connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Bounded wait for an upstream response (head and body) in seconds.
    pub upstream_secs: u64,

    /// Total time allowed for a client request in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            upstream_secs: 30,
            request_secs: 60,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable the admin API.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,
}
