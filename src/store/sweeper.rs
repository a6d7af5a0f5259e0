//! Periodic purge of expired store entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time;

use crate::store::KvStore;

/// Spawn a task that calls [`KvStore::purge_expired`] every `interval`
/// until shutdown is signalled.
pub fn spawn_sweeper<V: 'static>(
    name: &'static str,
    store: Arc<dyn KvStore<V>>,
    interval: Duration,
    mut shutdown: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = time::interval(interval);
        // The first tick completes immediately; nothing can have expired yet.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = store.purge_expired();
                    if removed > 0 {
                        tracing::debug!(store = name, removed, "Purged expired entries");
                    }
                }
                _ = shutdown.recv() => {
                    tracing::debug!(store = name, "Sweeper received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    })
}
