//! Thread-safe wrapper around [`HierarchyCache`].
//!
//! ## Architecture
//! - One `parking_lot::RwLock` around the single-threaded core. Lookups take
//!   the read lock and proceed in parallel (the hit/miss counters are atomic,
//!   so counting under shared access is sound). Structural operations take
//!   the write lock, which makes each compound operation, ancestor walk or
//!   full removal sweep, atomic with respect to every other cache call.
//! - Shared as `Arc<ConcurrentHierarchyCache>`; every method takes `&self`.
//!
//! ## Locking Caveats
//! - `close()` hooks run inside `remove` while the write lock is held. A
//!   container with a slow shutdown hook blocks other cache calls for the
//!   duration.
//! - Compound *workflows* spanning several calls (check, build, insert) are
//!   not atomic here. The loading facade accepts that window; last write
//!   wins. Workload-level structural mutation is expected to be serialized
//!   by the embedding framework.
//!
//! ## Example Usage
//!
//! ```
//! use std::sync::Arc;
//! use std::thread;
//!
//! use ctxcache::cache::ConcurrentHierarchyCache;
//! use ctxcache::key::SimpleKey;
//!
//! let cache = Arc::new(ConcurrentHierarchyCache::new());
//! let key = SimpleKey::root("app");
//! cache.insert(key.clone(), "ctx".to_string());
//!
//! let reader = {
//!     let cache = Arc::clone(&cache);
//!     let key = key.clone();
//!     thread::spawn(move || cache.get(&key).is_some())
//! };
//! assert!(reader.join().unwrap());
//! ```

use std::sync::Arc;

use parking_lot::RwLock;

use crate::cache::hierarchy::{CacheStatistics, HierarchyCache, RemovalReport};
use crate::error::InvariantError;
use crate::traits::{Context, ContextKey, HierarchyMode};

#[cfg(feature = "metrics")]
use crate::metrics::snapshot::HierarchyMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{MetricsReset, MetricsSnapshotProvider};

/// [`HierarchyCache`] behind an `RwLock`, sharable across threads.
pub struct ConcurrentHierarchyCache<K, V> {
    inner: RwLock<HierarchyCache<K, V>>,
}

impl<K, V> ConcurrentHierarchyCache<K, V>
where
    K: ContextKey,
    V: Context,
{
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HierarchyCache::new()),
        }
    }

    /// Wraps an already-populated core.
    pub fn from_cache(cache: HierarchyCache<K, V>) -> Self {
        Self {
            inner: RwLock::new(cache),
        }
    }

    /// See [`HierarchyCache::contains`]. Read lock.
    pub fn contains(&self, key: &K) -> bool {
        self.inner.read().contains(key)
    }

    /// See [`HierarchyCache::get`]. Read lock.
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        self.inner.read().get(key)
    }

    /// See [`HierarchyCache::peek`]. Read lock.
    pub fn peek(&self, key: &K) -> Option<Arc<V>> {
        self.inner.read().peek(key)
    }

    /// See [`HierarchyCache::insert`]. Write lock.
    pub fn insert(&self, key: K, context: V) -> Option<Arc<V>> {
        self.inner.write().insert(key, context)
    }

    /// See [`HierarchyCache::insert_arc`]. Write lock.
    pub fn insert_arc(&self, key: K, context: Arc<V>) -> Option<Arc<V>> {
        self.inner.write().insert_arc(key, context)
    }

    /// See [`HierarchyCache::remove`]. Write lock, held across the sweep and
    /// its `close()` calls.
    pub fn remove(&self, key: &K, mode: HierarchyMode) -> RemovalReport<K> {
        self.inner.write().remove(key, mode)
    }

    /// See [`HierarchyCache::clear`]. Write lock.
    pub fn clear(&self) {
        self.inner.write().clear();
    }

    /// See [`HierarchyCache::clear_statistics`]. Read lock suffices; the
    /// counters are atomic.
    pub fn clear_statistics(&self) {
        self.inner.read().clear_statistics();
    }

    /// See [`HierarchyCache::len`]. Read lock.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// See [`HierarchyCache::is_empty`]. Read lock.
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// See [`HierarchyCache::hit_count`]. Read lock.
    pub fn hit_count(&self) -> u64 {
        self.inner.read().hit_count()
    }

    /// See [`HierarchyCache::miss_count`]. Read lock.
    pub fn miss_count(&self) -> u64 {
        self.inner.read().miss_count()
    }

    /// See [`HierarchyCache::parent_context_count`]. Read lock.
    pub fn parent_context_count(&self) -> usize {
        self.inner.read().parent_context_count()
    }

    /// See [`HierarchyCache::statistics`]. Read lock; the snapshot is
    /// internally consistent because the lock blocks writers.
    pub fn statistics(&self) -> CacheStatistics {
        self.inner.read().statistics()
    }

    /// See [`HierarchyCache::check_invariants`]. Read lock.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.inner.read().check_invariants()
    }
}

#[cfg(feature = "metrics")]
impl<K, V> ConcurrentHierarchyCache<K, V>
where
    K: ContextKey,
    V: Context,
{
    /// See [`HierarchyCache::metrics_snapshot`]. Read lock.
    pub fn metrics_snapshot(&self) -> HierarchyMetricsSnapshot {
        self.inner.read().metrics_snapshot()
    }
}

#[cfg(feature = "metrics")]
impl<K, V> MetricsSnapshotProvider<HierarchyMetricsSnapshot> for ConcurrentHierarchyCache<K, V>
where
    K: ContextKey,
    V: Context,
{
    fn snapshot(&self) -> HierarchyMetricsSnapshot {
        self.metrics_snapshot()
    }
}

#[cfg(feature = "metrics")]
impl<K, V> MetricsReset for ConcurrentHierarchyCache<K, V>
where
    K: ContextKey,
    V: Context,
{
    fn reset_metrics(&self) {
        self.inner.write().reset_metrics();
    }
}

impl<K, V> Default for ConcurrentHierarchyCache<K, V>
where
    K: ContextKey,
    V: Context,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> std::fmt::Debug for ConcurrentHierarchyCache<K, V>
where
    K: ContextKey,
    V: Context,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stats = self.statistics();
        f.debug_struct("ConcurrentHierarchyCache")
            .field("len", &stats.len)
            .field("hit_count", &stats.hits)
            .field("miss_count", &stats.misses)
            .field("parent_context_count", &stats.parent_contexts)
            .finish_non_exhaustive()
    }
}
