//! Sliding-window rate limiting with named policies and progressive slow-down.
//!
//! # Responsibilities
//! - Count requests per key over a sliding window
//! - Apply every policy whose path prefix matches, in configuration order
//! - Expose quota metadata on every response, accepted or rejected
//! - Delay (never reject) clients past the slow-down threshold
//!
//! # Design Decisions
//! - One store per policy, swept once per window
//! - Buckets are timestamp sequences updated under the store's per-key lock
//! - Rejected requests are not recorded, so a throttled client regains
//!   quota as its accepted requests age out

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, HeaderValue, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio::task::JoinHandle;

use crate::config::{RateLimitConfig, RateLimitKey, RateLimitPolicyConfig, SlowDownConfig};
use crate::error::GatewayError;
use crate::http::context::ClientAddr;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::routing::PathPrefixMatcher;
use crate::security::auth::Identity;
use crate::store::{spawn_sweeper, KvStore, MemoryStore};

pub const X_RATELIMIT_LIMIT: &str = "x-ratelimit-limit";
pub const X_RATELIMIT_REMAINING: &str = "x-ratelimit-remaining";
pub const X_RATELIMIT_RESET: &str = "x-ratelimit-reset";

type Bucket = VecDeque<Instant>;

/// Outcome of a single window check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    /// Requests in the window, including this one when allowed.
    pub count: u32,
    pub window: Duration,
    /// Time until the oldest counted request leaves the window.
    pub reset_after: Duration,
}

/// Per-key sliding-window counter.
pub struct SlidingWindowLimiter {
    window: Duration,
    max_requests: u32,
    store: Arc<dyn KvStore<Bucket>>,
}

impl SlidingWindowLimiter {
    pub fn new(window: Duration, max_requests: u32) -> Self {
        Self::with_store(window, max_requests, Arc::new(MemoryStore::new()))
    }

    pub fn with_store(
        window: Duration,
        max_requests: u32,
        store: Arc<dyn KvStore<Bucket>>,
    ) -> Self {
        Self {
            window,
            max_requests,
            store,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn check(&self, key: &str) -> Decision {
        self.check_at(key, Instant::now())
    }

    /// Check `key` as if the request arrived at `now`.
    pub fn check_at(&self, key: &str, now: Instant) -> Decision {
        let window = self.window;
        let max = self.max_requests;
        let mut decision = Decision {
            allowed: false,
            limit: max,
            remaining: 0,
            count: 0,
            window,
            reset_after: window,
        };

        self.store.update(key, window, &mut |current| {
            let mut stamps = current.unwrap_or_default();
            while let Some(oldest) = stamps.front() {
                if now.saturating_duration_since(*oldest) >= window {
                    stamps.pop_front();
                } else {
                    break;
                }
            }

            let used = u32::try_from(stamps.len()).unwrap_or(u32::MAX);
            if used >= max {
                decision.count = used;
            } else {
                stamps.push_back(now);
                decision.allowed = true;
                decision.count = used + 1;
                decision.remaining = max - used - 1;
            }
            if let Some(oldest) = stamps.front() {
                decision.reset_after = window.saturating_sub(now.saturating_duration_since(*oldest));
            }

            if stamps.is_empty() {
                None
            } else {
                Some(stamps)
            }
        });

        decision
    }

    pub fn store(&self) -> Arc<dyn KvStore<Bucket>> {
        self.store.clone()
    }
}

struct Policy {
    name: String,
    prefixes: Vec<PathPrefixMatcher>,
    key: RateLimitKey,
    message: String,
    limiter: SlidingWindowLimiter,
}

impl Policy {
    fn from_config(config: &RateLimitPolicyConfig) -> Self {
        Self {
            name: config.name.clone(),
            prefixes: config
                .path_prefixes
                .iter()
                .map(|p| PathPrefixMatcher::new(p.as_str()))
                .collect(),
            key: config.key,
            message: config.message.clone(),
            limiter: SlidingWindowLimiter::new(
                Duration::from_millis(config.window_ms),
                config.max_requests,
            ),
        }
    }

    fn applies_to(&self, path: &str) -> bool {
        self.prefixes.iter().any(|p| p.matches(path))
    }

    fn bucket_key(&self, client: &str, identity: Option<&Identity>) -> String {
        match (self.key, identity.and_then(Identity::subject)) {
            (RateLimitKey::Subject, Some(subject)) => format!("user:{subject}"),
            _ => format!("ip:{client}"),
        }
    }
}

/// Progressive delay after `delay_after` requests per window.
struct SlowDown {
    prefixes: Vec<PathPrefixMatcher>,
    delay_after: u32,
    delay: Duration,
    max_delay: Duration,
    counter: SlidingWindowLimiter,
}

impl SlowDown {
    fn from_config(config: &SlowDownConfig) -> Self {
        Self {
            prefixes: config
                .path_prefixes
                .iter()
                .map(|p| PathPrefixMatcher::new(p.as_str()))
                .collect(),
            delay_after: config.delay_after,
            delay: Duration::from_millis(config.delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
            counter: SlidingWindowLimiter::new(Duration::from_millis(config.window_ms), u32::MAX),
        }
    }

    fn delay_for(&self, count: u32) -> Duration {
        let over = count.saturating_sub(self.delay_after);
        self.delay.saturating_mul(over).min(self.max_delay)
    }
}

/// Result of running every applicable policy for one request.
#[derive(Debug, Default)]
pub struct Verdict {
    /// The most constrained decision, used for response headers.
    pub decision: Option<Decision>,
    /// `(policy, message)` of the first policy that rejected.
    pub rejected_by: Option<(String, String)>,
    pub delay: Duration,
}

/// All configured rate limit policies.
pub struct RateLimiter {
    policies: Vec<Policy>,
    slow_down: Option<SlowDown>,
}

impl RateLimiter {
    pub fn from_config(config: &RateLimitConfig) -> Self {
        if !config.enabled {
            return Self {
                policies: Vec::new(),
                slow_down: None,
            };
        }
        Self {
            policies: config.policies.iter().map(Policy::from_config).collect(),
            slow_down: config
                .slow_down
                .enabled
                .then(|| SlowDown::from_config(&config.slow_down)),
        }
    }

    /// Evaluate policies for a request. Evaluation stops at the first rejection.
    pub fn evaluate(&self, path: &str, client: &str, identity: Option<&Identity>) -> Verdict {
        let mut verdict = Verdict::default();

        for policy in self.policies.iter().filter(|p| p.applies_to(path)) {
            let key = policy.bucket_key(client, identity);
            let decision = policy.limiter.check(&key);

            let tighter = verdict
                .decision
                .map_or(true, |current| decision.remaining < current.remaining);
            if tighter || !decision.allowed {
                verdict.decision = Some(decision);
            }

            if !decision.allowed {
                tracing::warn!(policy = %policy.name, key = %key, path = %path, "Rate limit exceeded");
                verdict.rejected_by = Some((policy.name.clone(), policy.message.clone()));
                return verdict;
            }
        }

        if let Some(slow_down) = self.slow_down.as_ref().filter(|s| s.prefixes.iter().any(|p| p.matches(path))) {
            let decision = slow_down.counter.check(&format!("ip:{client}"));
            verdict.delay = slow_down.delay_for(decision.count);
            if !verdict.delay.is_zero() {
                tracing::debug!(client = %client, delay_ms = verdict.delay.as_millis() as u64, "Slowing down client");
            }
        }

        verdict
    }

    /// Spawn one sweeper per policy store, each ticking once per window.
    pub fn spawn_sweepers(&self, shutdown: &Shutdown) -> Vec<JoinHandle<()>> {
        self.policies
            .iter()
            .map(|p| &p.limiter)
            .chain(self.slow_down.iter().map(|s| &s.counter))
            .map(|limiter| {
                spawn_sweeper(
                    "rate_limit",
                    limiter.store(),
                    limiter.window(),
                    shutdown.subscribe(),
                )
            })
            .collect()
    }
}

fn apply_headers(headers: &mut HeaderMap, decision: &Decision) {
    let reset_at = chrono::Utc::now().timestamp_millis()
        + i64::try_from(decision.reset_after.as_millis()).unwrap_or(i64::MAX / 2);

    headers.insert(X_RATELIMIT_LIMIT, HeaderValue::from(decision.limit));
    headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from(decision.remaining));
    headers.insert(X_RATELIMIT_RESET, HeaderValue::from(reset_at));
}

pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let client = request
        .extensions()
        .get::<ClientAddr>()
        .map(|c| c.0.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let verdict = limiter.evaluate(
        request.uri().path(),
        &client,
        request.extensions().get::<Identity>(),
    );

    if let Some((policy, message)) = verdict.rejected_by {
        metrics::record_rate_limited(&policy);
        let retry_after = verdict
            .decision
            .map(|d| d.window)
            .unwrap_or_default();
        let mut response = GatewayError::RateLimitExceeded {
            policy,
            message,
            retry_after,
        }
        .into_response();
        if let Some(decision) = &verdict.decision {
            apply_headers(response.headers_mut(), decision);
        }
        return response;
    }

    if !verdict.delay.is_zero() {
        tokio::time::sleep(verdict.delay).await;
    }

    let mut response = next.run(request).await;
    if let Some(decision) = &verdict.decision {
        apply_headers(response.headers_mut(), decision);
    }
    response
}
