//! In-process store backed by `DashMap`.

use std::time::{Duration, Instant};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::store::{EntryInfo, KvStore};

#[derive(Debug, Clone)]
struct Slot<V> {
    value: V,
    expires_at: Instant,
}

impl<V> Slot<V> {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

/// A thread-safe expiring map.
///
/// DashMap shards its locks, so [`KvStore::update`] runs under the lock of the
/// key's shard and concurrent updates to one key are serialized.
#[derive(Debug)]
pub struct MemoryStore<V> {
    inner: DashMap<String, Slot<V>>,
}

impl<V> MemoryStore<V> {
    pub fn new() -> Self {
        Self {
            inner: DashMap::new(),
        }
    }
}

impl<V> Default for MemoryStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> KvStore<V> for MemoryStore<V>
where
    V: Clone + Send + Sync,
{
    fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        if let Some(slot) = self.inner.get(key) {
            if slot.is_live(now) {
                return Some(slot.value.clone());
            }
        } else {
            return None;
        }
        // Lazily drop the expired slot; re-check in case it was just refreshed.
        self.inner.remove_if(key, |_, slot| !slot.is_live(now));
        None
    }

    fn set(&self, key: &str, value: V, ttl: Duration) {
        self.inner.insert(
            key.to_string(),
            Slot {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    fn update(&self, key: &str, ttl: Duration, f: &mut dyn FnMut(Option<V>) -> Option<V>) {
        let now = Instant::now();
        match self.inner.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                let current = if occupied.get().is_live(now) {
                    Some(occupied.get().value.clone())
                } else {
                    None
                };
                match f(current) {
                    Some(value) => {
                        occupied.insert(Slot {
                            value,
                            expires_at: now + ttl,
                        });
                    }
                    None => {
                        occupied.remove();
                    }
                }
            }
            Entry::Vacant(vacant) => {
                if let Some(value) = f(None) {
                    vacant.insert(Slot {
                        value,
                        expires_at: now + ttl,
                    });
                }
            }
        }
    }

    fn delete(&self, key: &str) -> bool {
        let now = Instant::now();
        self.inner
            .remove(key)
            .is_some_and(|(_, slot)| slot.is_live(now))
    }

    fn delete_matching(&self, fragment: &str) -> usize {
        let before = self.inner.len();
        self.inner.retain(|key, _| !key.contains(fragment));
        before.saturating_sub(self.inner.len())
    }

    fn clear(&self) -> usize {
        let count = self.inner.len();
        self.inner.clear();
        count
    }

    fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.inner.len();
        self.inner.retain(|_, slot| slot.is_live(now));
        before.saturating_sub(self.inner.len())
    }

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn entries(&self) -> Vec<EntryInfo> {
        let now = Instant::now();
        let mut entries: Vec<EntryInfo> = self
            .inner
            .iter()
            .filter(|r| r.value().is_live(now))
            .map(|r| EntryInfo {
                key: r.key().clone(),
                expires_in: r.value().expires_at.saturating_duration_since(now),
            })
            .collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        entries
    }
}
