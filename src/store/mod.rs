//! Expiring key-value storage shared by the rate limiter and the cache.
//!
//! # Data Flow
//! ```text
//! rate limiter ──update()──┐
//!                          ├──▶ KvStore (memory.rs: DashMap, per-key locking)
//! cache layer ──get/set()──┘          ▲
//!                                     │ purge_expired()
//!                           sweeper.rs (one periodic task per store)
//! ```
//!
//! # Design Decisions
//! - Middleware only sees the `KvStore` trait, so a shared store can replace
//!   the in-process one without touching the chain
//! - Reads never return expired values; expiry is checked on access
//! - Bulk sweeps instead of one timer per entry

pub mod memory;
pub mod sweeper;

use std::time::Duration;

pub use memory::MemoryStore;
pub use sweeper::spawn_sweeper;

/// A live entry as reported by [`KvStore::entries`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    pub key: String,
    pub expires_in: Duration,
}

/// Key-value store with per-entry TTL.
pub trait KvStore<V>: Send + Sync {
    /// Value for `key`, unless absent or expired.
    fn get(&self, key: &str) -> Option<V>;

    /// Insert or replace `key`, expiring after `ttl`.
    fn set(&self, key: &str, value: V, ttl: Duration);

    /// Atomically replace the value for `key`.
    ///
    /// `f` receives the current live value and returns the new one; `None`
    /// removes the key. A stored value expires `ttl` after this call.
    fn update(&self, key: &str, ttl: Duration, f: &mut dyn FnMut(Option<V>) -> Option<V>);

    /// Remove `key`. Returns whether a live entry was removed.
    fn delete(&self, key: &str) -> bool;

    /// Remove every key containing `fragment`. Returns the number removed.
    fn delete_matching(&self, fragment: &str) -> usize;

    /// Remove everything. Returns the number removed.
    fn clear(&self) -> usize;

    /// Drop expired entries. Returns the number removed.
    fn purge_expired(&self) -> usize;

    /// Number of stored entries, possibly including not-yet-purged expired ones.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Live entries with their remaining lifetime.
    fn entries(&self) -> Vec<EntryInfo>;
}
