//! Refresh cache for upstream query results.
//!
//! This is deliberately not an LRU: entries are replaced in place on every
//! successful refresh and never evicted, so an expired entry remains
//! readable for stale-fallback when the upstream misbehaves. The key space
//! (stations and stops actually queried) bounds memory, not a capacity
//! limit.
//!
//! Freshness is always evaluated by the caller against a TTL appropriate to
//! the query kind; the store only reports each entry's age.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use crate::clock::Clock;

/// Whether an entry of the given age is still fresh under `ttl`.
pub fn is_fresh(age: Duration, ttl: Duration) -> bool {
    age <= ttl
}

struct CacheEntry<V> {
    value: Arc<V>,
    fetched_at: Instant,
}

/// Keyed store mapping a cache key to (payload, fetch timestamp).
///
/// Values are handed out as `Arc`s and swapped whole, so concurrent readers
/// observe either the old or the new value, never a partial write.
pub struct CacheStore<K, V> {
    entries: RwLock<HashMap<K, CacheEntry<V>>>,
    clock: Arc<dyn Clock>,
}

impl<K, V> CacheStore<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Create an empty store aging entries against the given clock.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// Unconditional read: the value and its age, however stale.
    pub async fn get(&self, key: &K) -> Option<(Arc<V>, Duration)> {
        let guard = self.entries.read().await;
        let entry = guard.get(key)?;
        let age = self.clock.now().saturating_duration_since(entry.fetched_at);
        Some((Arc::clone(&entry.value), age))
    }

    /// Read only if the entry is fresh under `ttl`.
    pub async fn get_fresh(&self, key: &K, ttl: Duration) -> Option<Arc<V>> {
        let (value, age) = self.get(key).await?;
        is_fresh(age, ttl).then_some(value)
    }

    /// Insert or replace the entry for `key`, stamped with the current time.
    pub async fn insert(&self, key: K, value: V) -> Arc<V> {
        let value = Arc::new(value);
        let mut guard = self.entries.write().await;
        guard.insert(
            key,
            CacheEntry {
                value: Arc::clone(&value),
                fetched_at: self.clock.now(),
            },
        );
        value
    }

    /// Number of cached entries (for monitoring).
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the store holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
