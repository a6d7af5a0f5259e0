//! Response cache subsystem.
//!
//! # Data Flow
//! ```text
//! GET (cacheable):
//!     → key.rs (METHOD:space:path[?query]:caller)
//!     → response_cache.rs lookup ── hit ──▶ stored response (X-Cache: HIT)
//!     → miss: proxy handler → 2xx → store (X-Cache: MISS)
//!
//! POST / PUT / PATCH / DELETE:
//!     → invalidation rules drop keys containing configured fragments
//!     → proxy handler
//! ```
//!
//! # Design Decisions
//! - Keys include the subject, so users never see each other's responses
//! - What is stored is the already-sanitized response
//! - Expiry checked on read; bulk sweep reclaims memory

pub mod key;
pub mod middleware;
pub mod response_cache;

pub use key::cache_key;
pub use middleware::cache_middleware;
pub use response_cache::{CacheStats, CachedResponse, ResponseCache, X_CACHE, X_CACHE_KEY};
