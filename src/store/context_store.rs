//! Primary key → container store.
//!
//! ## Architecture
//! - Entries live in an `FxHashMap<K, Arc<V>>`; `Arc` keeps a returned handle
//!   valid after its entry is evicted.
//! - Hit/miss counters are `AtomicU64`, so lookups count through `&self` and
//!   stay sound when the owning cache sits behind a read lock.
//! - Unbounded: entries are few, heavy, and live until explicitly removed.
//!
//! ## Core Operations
//! - `get`: fetch by key, bumping the hit or miss counter.
//! - `peek` / `contains`: counter-neutral queries.
//! - `insert`: insert or replace, returning the previous container.
//! - `remove` / `clear`: deletion; `clear` leaves the counters untouched.
//!
//! ## Thread Safety
//! - Single-threaded ownership; the counters alone use atomics. Concurrent
//!   use goes through [`ConcurrentHierarchyCache`](crate::cache::ConcurrentHierarchyCache).

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use rustc_hash::FxHashMap;

/// Lookup counters, shared-access safe.
#[derive(Debug, Default)]
struct AccessCounters {
    hits: AtomicU64,
    misses: AtomicU64,
}

impl AccessCounters {
    /// Increment hit counter.
    fn inc_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment miss counter.
    fn inc_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Zero both counters.
    fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }
}

/// Map of cached containers plus lookup accounting.
#[derive(Debug)]
pub struct ContextStore<K, V> {
    map: FxHashMap<K, Arc<V>>,
    counters: AccessCounters,
}

impl<K, V> ContextStore<K, V>
where
    K: Eq + std::hash::Hash,
{
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            map: FxHashMap::default(),
            counters: AccessCounters::default(),
        }
    }

    /// Fetches the container for `key`, counting a hit or a miss.
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        match self.map.get(key) {
            Some(context) => {
                self.counters.inc_hit();
                Some(Arc::clone(context))
            }
            None => {
                self.counters.inc_miss();
                None
            }
        }
    }

    /// Fetches the container for `key` without touching the counters.
    pub fn peek(&self, key: &K) -> Option<Arc<V>> {
        self.map.get(key).cloned()
    }

    /// True when `key` has an entry. Counter-neutral.
    #[inline]
    pub fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Inserts or replaces the container for `key`, returning the previous
    /// one if the key was already present.
    pub fn insert(&mut self, key: K, context: Arc<V>) -> Option<Arc<V>> {
        self.map.insert(key, context)
    }

    /// Removes and returns the container for `key`.
    pub fn remove(&mut self, key: &K) -> Option<Arc<V>> {
        self.map.remove(key)
    }

    /// Drops every entry. Counters keep their values.
    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Number of cached containers.
    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// True when no container is cached.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Lookups that found an entry.
    #[inline]
    pub fn hit_count(&self) -> u64 {
        self.counters.hits()
    }

    /// Lookups that found nothing.
    #[inline]
    pub fn miss_count(&self) -> u64 {
        self.counters.misses()
    }

    /// Zeroes the hit/miss counters. Entries are unaffected.
    pub fn reset_counters(&self) {
        self.counters.reset();
    }
}

impl<K, V> Default for ContextStore<K, V>
where
    K: Eq + std::hash::Hash,
{
    fn default() -> Self {
        Self::new()
    }
}
