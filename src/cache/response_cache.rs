//! TTL cache of transformed upstream responses.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    http::{header, HeaderValue, Method, StatusCode},
    response::Response,
};
use serde::Serialize;
use tokio::task::JoinHandle;

use crate::config::CacheConfig;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::routing::{PathPrefixMatcher, VersionedHostMatcher};
use crate::store::{spawn_sweeper, KvStore, MemoryStore};

pub const X_CACHE: &str = "x-cache";
pub const X_CACHE_KEY: &str = "x-cache-key";

/// A stored response.
#[derive(Debug, Clone)]
pub struct CachedResponse {
    pub status: StatusCode,
    pub content_type: Option<HeaderValue>,
    pub body: Bytes,
}

impl CachedResponse {
    /// Rebuild a client response marked as a cache hit.
    pub fn to_response(&self, key: &str) -> Response {
        let mut response = Response::new(Body::from(self.body.clone()));
        *response.status_mut() = self.status;
        let headers = response.headers_mut();
        if let Some(content_type) = &self.content_type {
            headers.insert(header::CONTENT_TYPE, content_type.clone());
        }
        mark(headers, "HIT", key);
        response
    }
}

/// Set `X-Cache` and `X-Cache-Key`.
pub fn mark(headers: &mut axum::http::HeaderMap, outcome: &'static str, key: &str) {
    headers.insert(X_CACHE, HeaderValue::from_static(outcome));
    if let Ok(value) = HeaderValue::from_str(key) {
        headers.insert(X_CACHE_KEY, value);
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntryStat {
    pub key: String,
    pub expires_in: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CacheStats {
    pub size: usize,
    pub entries: Vec<CacheEntryStat>,
}

pub struct ResponseCache {
    enabled: bool,
    default_ttl: Duration,
    ttl_rules: Vec<(PathPrefixMatcher, Duration)>,
    exclude: Vec<PathPrefixMatcher>,
    invalidation_rules: Vec<(PathPrefixMatcher, Vec<String>)>,
    sweep_interval: Duration,
    versions: VersionedHostMatcher,
    store: Arc<dyn KvStore<CachedResponse>>,
}

impl ResponseCache {
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::with_store(config, Arc::new(MemoryStore::new()))
    }

    pub fn with_store(config: &CacheConfig, store: Arc<dyn KvStore<CachedResponse>>) -> Self {
        Self {
            enabled: config.enabled,
            default_ttl: Duration::from_secs(config.default_ttl_secs),
            ttl_rules: config
                .ttl_rules
                .iter()
                .map(|r| (PathPrefixMatcher::new(r.path_prefix.as_str()), Duration::from_secs(r.ttl_secs)))
                .collect(),
            exclude: config
                .exclude
                .iter()
                .map(|p| PathPrefixMatcher::new(p.as_str()))
                .collect(),
            invalidation_rules: config
                .invalidation_rules
                .iter()
                .map(|r| (PathPrefixMatcher::new(r.path_prefix.as_str()), r.patterns.clone()))
                .collect(),
            sweep_interval: Duration::from_secs(config.sweep_interval_secs.max(1)),
            versions: VersionedHostMatcher::new(&[]),
            store,
        }
    }

    /// Hosts carrying one of these labels are forwarded to a separate
    /// upstream path space, so their responses are keyed apart.
    pub fn with_host_versions(mut self, versions: VersionedHostMatcher) -> Self {
        self.versions = versions;
        self
    }

    /// The upstream version label selected by `host`, if any.
    pub fn version_of<'a>(&'a self, host: &str) -> Option<&'a str> {
        self.versions.version_of(host)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Only GET requests outside the exclusion list are cached.
    pub fn is_cacheable(&self, method: &Method, path: &str) -> bool {
        self.enabled && *method == Method::GET && !self.exclude.iter().any(|p| p.matches(path))
    }

    /// TTL for `path`: first matching rule, else the default.
    pub fn ttl_for(&self, path: &str) -> Duration {
        self.ttl_rules
            .iter()
            .find(|(prefix, _)| prefix.matches(path))
            .map(|(_, ttl)| *ttl)
            .unwrap_or(self.default_ttl)
    }

    pub fn lookup(&self, key: &str) -> Option<CachedResponse> {
        let hit = self.store.get(key);
        metrics::record_cache_event(if hit.is_some() { "hit" } else { "miss" });
        hit
    }

    pub fn insert(&self, key: &str, path: &str, response: CachedResponse) {
        let ttl = self.ttl_for(path);
        tracing::debug!(key = %key, ttl_secs = ttl.as_secs(), "Cache store");
        self.store.set(key, response, ttl);
        metrics::record_cache_event("store");
        metrics::set_cache_entries(self.store.len());
    }

    /// Apply invalidation rules for a mutating request to `path`.
    pub fn invalidate_for_mutation(&self, path: &str) -> usize {
        let removed: usize = self
            .invalidation_rules
            .iter()
            .filter(|(prefix, _)| prefix.matches(path))
            .flat_map(|(_, patterns)| patterns.iter())
            .map(|pattern| self.invalidate(pattern))
            .sum();
        if removed > 0 {
            tracing::info!(path = %path, removed, "Cache invalidated by mutation");
        }
        removed
    }

    /// Remove every entry whose key contains `fragment`.
    pub fn invalidate(&self, fragment: &str) -> usize {
        let removed = self.store.delete_matching(fragment);
        if removed > 0 {
            metrics::record_cache_event("invalidate");
            metrics::set_cache_entries(self.store.len());
        }
        removed
    }

    pub fn remove(&self, key: &str) -> bool {
        let removed = self.store.delete(key);
        metrics::set_cache_entries(self.store.len());
        removed
    }

    pub fn clear(&self) -> usize {
        let removed = self.store.clear();
        metrics::set_cache_entries(0);
        tracing::info!(removed, "Cache cleared");
        removed
    }

    pub fn stats(&self) -> CacheStats {
        let entries: Vec<CacheEntryStat> = self
            .store
            .entries()
            .into_iter()
            .map(|e| CacheEntryStat {
                key: e.key,
                expires_in: e.expires_in.as_secs_f64().ceil() as u64,
            })
            .collect();
        CacheStats {
            size: entries.len(),
            entries,
        }
    }

    pub fn spawn_sweeper(&self, shutdown: &Shutdown) -> JoinHandle<()> {
        spawn_sweeper(
            "response_cache",
            self.store.clone(),
            self.sweep_interval,
            shutdown.subscribe(),
        )
    }
}
