//! # Hierarchy Cache
//!
//! Keyed cache for expensive, long-lived containers with parent-aware
//! eviction. Entries are never aged out: they leave through an explicit
//! removal sweep or a hard [`clear`](HierarchyCache::clear). What makes the
//! cache more than a map is the derived child index, which lets one removal
//! take out a whole configuration subtree, closing children before parents.
//!
//! ## Architecture
//!
//! ```text
//!            ┌───────────────────────────────────────────────┐
//!            │            HierarchyCache<K, V>               │
//!            │                                               │
//!            │  ┌──────────────────┐  ┌────────────────────┐ │
//!            │  │ ContextStore     │  │ HierarchyIndex     │ │
//!            │  │ K -> Arc<V>      │  │ K -> {child K}     │ │
//!            │  │ hit/miss atomics │  │ identity only      │ │
//!            │  └──────────────────┘  └────────────────────┘ │
//!            └───────────────────────────────────────────────┘
//!
//!   insert(g):  store g, then file g under c, c under r   (walk to root)
//!
//!                 r                remove(c, CurrentLevel)
//!                 │                  sweeps {c, g}, r stays
//!                 c
//!                 │                remove(g, Exhaustive)
//!                 g                  walks up to r, sweeps {r, c, g}
//! ```
//!
//! ## Key Components
//!
//! | Component | Purpose |
//! |-----------|---------|
//! | [`HierarchyCache`] | Single-threaded core implementing the full contract |
//! | [`RemovalReport`] | Evicted keys (close order) plus any close failures |
//! | [`CacheStatistics`] | Copyable len / parent-count / hit / miss snapshot |
//!
//! ## Algorithm
//!
//! A removal sweep is post-order over the derived child tree:
//!
//! 1. Resolve the start key. `CurrentLevel` starts at the given key;
//!    `Exhaustive` walks parent links to the root first.
//! 2. Detach the node's child set and recurse into each child, so children
//!    are dealt with before their parent. Sibling order is unspecified.
//! 3. On the way back up, remove the node's primary entry. If one existed,
//!    call `close()` on it exactly once; a failure is recorded and the sweep
//!    carries on.
//! 4. After the recursion, scrub every visited key from the surviving child
//!    sets and prune sets that became empty. Visited keys without a primary
//!    entry (index-only ancestors) take part in the scrub but are not
//!    reported as evicted.
//!
//! ## Performance Characteristics
//!
//! | Operation | Cost |
//! |-----------|------|
//! | `get` / `contains` / `peek` | O(1) average |
//! | `insert` | O(depth) for the ancestor walk |
//! | `remove` | O(subtree + parents) plus the `close()` calls themselves |
//! | `clear` | O(n) |
//!
//! ## Trade-offs
//!
//! - The child index is maintained eagerly on insert so removal needs no
//!   full-map scan; the cost is O(depth) hashing per insert. Hierarchies in
//!   practice are shallow.
//! - `close()` runs inside the sweep. A container with a slow shutdown hook
//!   makes removal slow; nothing watches or times it out.
//!
//! ## When to Use
//!
//! - Test-infrastructure context reuse: many suites, few distinct
//!   configurations, each expensive to build.
//! - Any keyed registry of heavyweight objects where invalidating a parent
//!   must invalidate its dependents.
//!
//! ## Example Usage
//!
//! ```
//! use ctxcache::cache::HierarchyCache;
//! use ctxcache::key::SimpleKey;
//! use ctxcache::traits::HierarchyMode;
//!
//! let root = SimpleKey::root("r");
//! let child = root.child("c");
//! let grandchild = child.child("g");
//!
//! let mut cache = HierarchyCache::new();
//! cache.insert(root.clone(), "root ctx".to_string());
//! cache.insert(child.clone(), "child ctx".to_string());
//! cache.insert(grandchild.clone(), "grandchild ctx".to_string());
//!
//! assert_eq!(cache.len(), 3);
//! assert_eq!(cache.parent_context_count(), 2);
//!
//! // Invalidate the child level; the root survives.
//! let report = cache.remove(&child, HierarchyMode::CurrentLevel);
//! assert_eq!(report.evicted, vec![grandchild, child]);
//! assert_eq!(cache.len(), 1);
//! assert!(cache.contains(&root));
//! ```
//!
//! ## Thread Safety
//!
//! `HierarchyCache` is single-threaded; hit/miss counters alone are atomic.
//! For shared use wrap it in
//! [`ConcurrentHierarchyCache`](crate::cache::ConcurrentHierarchyCache).

use std::fmt;
use std::sync::Arc;

use crate::ds::HierarchyIndex;
use crate::error::{CloseError, InvariantError};
use crate::store::ContextStore;
use crate::traits::{Context, ContextKey, HierarchyMode};

#[cfg(feature = "metrics")]
use crate::metrics::metrics_impl::HierarchyMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::HierarchyMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{HierarchyMetricsRecorder, MetricsSnapshotProvider};

/// Outcome of one removal sweep.
///
/// `evicted` lists the keys whose entries actually left the cache, in close
/// order: children strictly before their parents. `close_failures` pairs each
/// failing key with its error; a failing entry is still evicted.
#[derive(Debug, Clone)]
pub struct RemovalReport<K> {
    /// Keys evicted by the sweep, children before parents.
    pub evicted: Vec<K>,
    /// Keys whose `close()` returned an error, with the error.
    pub close_failures: Vec<(K, CloseError)>,
}

impl<K> RemovalReport<K> {
    /// True when the sweep evicted nothing.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.evicted.is_empty()
    }

    /// Number of evicted entries.
    #[inline]
    pub fn evicted_len(&self) -> usize {
        self.evicted.len()
    }

    /// Number of entries whose close hook failed.
    #[inline]
    pub fn failed_len(&self) -> usize {
        self.close_failures.len()
    }
}

impl<K> Default for RemovalReport<K> {
    fn default() -> Self {
        Self {
            evicted: Vec::new(),
            close_failures: Vec::new(),
        }
    }
}

/// Copyable snapshot of the always-on cache gauges and counters.
///
/// # Example
///
/// ```
/// use ctxcache::cache::HierarchyCache;
/// use ctxcache::key::SimpleKey;
///
/// let mut cache = HierarchyCache::new();
/// cache.insert(SimpleKey::root("r"), "ctx".to_string());
/// cache.get(&SimpleKey::root("r"));
///
/// let stats = cache.statistics();
/// assert_eq!(stats.len, 1);
/// assert_eq!(stats.hits, 1);
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStatistics {
    /// Cached containers.
    pub len: usize,
    /// Distinct parent keys tracked by the child index.
    pub parent_contexts: usize,
    /// Lookups that found an entry.
    pub hits: u64,
    /// Lookups that found nothing.
    pub misses: u64,
}

/// Parent-aware container cache. See the module docs for the full contract.
pub struct HierarchyCache<K, V> {
    contexts: ContextStore<K, V>,
    hierarchy: HierarchyIndex<K>,
    #[cfg(feature = "metrics")]
    metrics: HierarchyMetrics,
}

impl<K, V> HierarchyCache<K, V>
where
    K: ContextKey,
    V: Context,
{
    /// Creates an empty cache.
    ///
    /// The cache is an explicit collaborator: construct it once, hand it to
    /// whoever loads contexts. There is no process-global instance.
    pub fn new() -> Self {
        Self {
            contexts: ContextStore::new(),
            hierarchy: HierarchyIndex::new(),
            #[cfg(feature = "metrics")]
            metrics: HierarchyMetrics::default(),
        }
    }

    /// True when `key` has a cached container. Counter-neutral.
    ///
    /// # Example
    ///
    /// ```
    /// use ctxcache::cache::HierarchyCache;
    /// use ctxcache::key::SimpleKey;
    ///
    /// let mut cache = HierarchyCache::new();
    /// let key = SimpleKey::root("app");
    /// assert!(!cache.contains(&key));
    ///
    /// cache.insert(key.clone(), "ctx".to_string());
    /// assert!(cache.contains(&key));
    /// assert_eq!(cache.miss_count(), 0);
    /// ```
    #[inline]
    pub fn contains(&self, key: &K) -> bool {
        self.contexts.contains(key)
    }

    /// Returns the container cached for `key`, counting a hit or a miss.
    ///
    /// The returned handle stays valid after the entry is evicted.
    ///
    /// # Example
    ///
    /// ```
    /// use ctxcache::cache::HierarchyCache;
    /// use ctxcache::key::SimpleKey;
    ///
    /// let mut cache = HierarchyCache::new();
    /// let key = SimpleKey::root("app");
    ///
    /// assert!(cache.get(&key).is_none());
    /// cache.insert(key.clone(), "ctx".to_string());
    /// assert!(cache.get(&key).is_some());
    ///
    /// assert_eq!(cache.hit_count(), 1);
    /// assert_eq!(cache.miss_count(), 1);
    /// ```
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        self.contexts.get(key)
    }

    /// Returns the container cached for `key` without touching the counters.
    pub fn peek(&self, key: &K) -> Option<Arc<V>> {
        self.contexts.peek(key)
    }

    /// Inserts or replaces the container for `key`, returning the previous
    /// container if the key was already present.
    ///
    /// Every insert re-runs the ancestor registration walk: `key` is filed
    /// under its parent, the parent under the grandparent, and so on to the
    /// root, whether or not those ancestors are themselves cached. The child
    /// index therefore already knows the subtree shape by the time a removal
    /// needs it.
    pub fn insert(&mut self, key: K, context: V) -> Option<Arc<V>> {
        self.insert_arc(key, Arc::new(context))
    }

    /// [`insert`](Self::insert) for a container the caller already shares.
    pub fn insert_arc(&mut self, key: K, context: Arc<V>) -> Option<Arc<V>> {
        let previous = self.contexts.insert(key.clone(), context);
        self.hierarchy.register(&key);

        #[cfg(feature = "metrics")]
        match previous {
            Some(_) => self.metrics.record_insert_replaced(),
            None => self.metrics.record_insert_new(),
        }

        previous
    }

    /// Removes `key` and its transitive children, closing each evicted
    /// container exactly once, children before parents.
    ///
    /// With [`HierarchyMode::Exhaustive`] the sweep first walks to the root
    /// key and takes the entire tree with it, siblings included. Removing an
    /// absent key is a no-op returning an empty report.
    ///
    /// A failing `close()` is recorded in the report and never stops the
    /// sweep; the failing entry is evicted regardless.
    ///
    /// # Example
    ///
    /// ```
    /// use ctxcache::cache::HierarchyCache;
    /// use ctxcache::key::SimpleKey;
    /// use ctxcache::traits::HierarchyMode;
    ///
    /// let root = SimpleKey::root("r");
    /// let child = root.child("c");
    ///
    /// let mut cache = HierarchyCache::new();
    /// cache.insert(root.clone(), "r".to_string());
    /// cache.insert(child.clone(), "c".to_string());
    ///
    /// let report = cache.remove(&root, HierarchyMode::CurrentLevel);
    /// assert_eq!(report.evicted, vec![child, root]);
    /// assert!(cache.is_empty());
    /// assert_eq!(cache.parent_context_count(), 0);
    /// ```
    pub fn remove(&mut self, key: &K, mode: HierarchyMode) -> RemovalReport<K> {
        #[cfg(feature = "metrics")]
        match mode {
            HierarchyMode::CurrentLevel => self.metrics.record_current_level_sweep(),
            HierarchyMode::Exhaustive => self.metrics.record_exhaustive_sweep(),
        }

        let start = match mode {
            HierarchyMode::CurrentLevel => key.clone(),
            HierarchyMode::Exhaustive => Self::root_of(key),
        };

        let mut report = RemovalReport::default();
        let mut visited = Vec::new();
        self.sweep(&start, &mut visited, &mut report);

        // Scrub the swept keys out of every surviving child set, then drop
        // sets that became empty. Without this the index would keep edges to
        // keys that no longer exist anywhere.
        self.hierarchy.strip(&visited);
        self.hierarchy.prune_empty();

        report
    }

    /// Drops every entry and the whole child index without closing anything.
    ///
    /// This is the hard reset. Graceful teardown of a tree is spelled
    /// `remove(root, HierarchyMode::Exhaustive)`. Hit/miss counters keep
    /// their values; see [`clear_statistics`](Self::clear_statistics).
    pub fn clear(&mut self) {
        self.contexts.clear();
        self.hierarchy.clear();

        #[cfg(feature = "metrics")]
        self.metrics.record_clear();
    }

    /// Zeroes the hit/miss counters. Entries and index are unaffected;
    /// independent of [`clear`](Self::clear).
    pub fn clear_statistics(&self) {
        self.contexts.reset_counters();
    }

    /// Number of cached containers.
    #[inline]
    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    /// True when no container is cached.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    /// Lookups that found an entry.
    #[inline]
    pub fn hit_count(&self) -> u64 {
        self.contexts.hit_count()
    }

    /// Lookups that found nothing.
    #[inline]
    pub fn miss_count(&self) -> u64 {
        self.contexts.miss_count()
    }

    /// Number of distinct parent keys currently tracked by the child index.
    ///
    /// Counts index entries, not cached containers: inserting a grandchild
    /// whose ancestors were never cached still yields two parents here.
    #[inline]
    pub fn parent_context_count(&self) -> usize {
        self.hierarchy.parent_count()
    }

    /// Point-in-time statistics snapshot.
    pub fn statistics(&self) -> CacheStatistics {
        CacheStatistics {
            len: self.len(),
            parent_contexts: self.parent_context_count(),
            hits: self.hit_count(),
            misses: self.miss_count(),
        }
    }

    /// Verifies index invariants; for debug and test use.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.hierarchy.check_invariants()
    }

    /// Direct children currently recorded for `key`, if any. Test aid.
    pub fn children_of(&self, key: &K) -> Option<Vec<K>> {
        self.hierarchy
            .children(key)
            .map(|set| set.iter().cloned().collect())
    }

    /// Follows parent links from `key` to its root.
    fn root_of(key: &K) -> K {
        let mut current = key;
        while let Some(parent) = current.parent() {
            current = parent;
        }
        current.clone()
    }

    /// Post-order subtree sweep: children first, then the node itself.
    fn sweep(&mut self, key: &K, visited: &mut Vec<K>, report: &mut RemovalReport<K>) {
        if let Some(children) = self.hierarchy.take_children(key) {
            for child in &children {
                self.sweep(child, visited, report);
            }
        }

        if let Some(context) = self.contexts.remove(key) {
            match context.close() {
                Ok(()) => {
                    #[cfg(feature = "metrics")]
                    self.metrics.record_context_closed();
                }
                Err(err) => {
                    #[cfg(feature = "metrics")]
                    self.metrics.record_close_failure();
                    report.close_failures.push((key.clone(), err));
                }
            }
            report.evicted.push(key.clone());

            #[cfg(feature = "metrics")]
            self.metrics.record_evicted_entry();
        }

        // Visited regardless of eviction: index-only ancestors must still be
        // scrubbed from surviving child sets.
        visited.push(key.clone());
    }
}

#[cfg(feature = "metrics")]
impl<K, V> HierarchyCache<K, V>
where
    K: ContextKey,
    V: Context,
{
    /// Snapshot of the extended per-operation telemetry plus gauges.
    pub fn metrics_snapshot(&self) -> HierarchyMetricsSnapshot {
        HierarchyMetricsSnapshot {
            inserts_new: self.metrics.inserts_new,
            inserts_replaced: self.metrics.inserts_replaced,
            current_level_sweeps: self.metrics.current_level_sweeps,
            exhaustive_sweeps: self.metrics.exhaustive_sweeps,
            evicted_entries: self.metrics.evicted_entries,
            contexts_closed: self.metrics.contexts_closed,
            close_failures: self.metrics.close_failures,
            clears: self.metrics.clears,
            get_hits: self.hit_count(),
            get_misses: self.miss_count(),
            cache_len: self.len(),
            parent_contexts: self.parent_context_count(),
        }
    }

    /// Zeroes the extended telemetry. The always-on hit/miss counters are
    /// governed by [`clear_statistics`](Self::clear_statistics) instead.
    pub fn reset_metrics(&mut self) {
        self.metrics = HierarchyMetrics::default();
    }
}

#[cfg(feature = "metrics")]
impl<K, V> MetricsSnapshotProvider<HierarchyMetricsSnapshot> for HierarchyCache<K, V>
where
    K: ContextKey,
    V: Context,
{
    fn snapshot(&self) -> HierarchyMetricsSnapshot {
        self.metrics_snapshot()
    }
}

impl<K, V> Default for HierarchyCache<K, V>
where
    K: ContextKey,
    V: Context,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for HierarchyCache<K, V>
where
    K: ContextKey,
    V: Context,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HierarchyCache")
            .field("len", &self.contexts.len())
            .field("hit_count", &self.contexts.hit_count())
            .field("miss_count", &self.contexts.miss_count())
            .field("parent_context_count", &self.hierarchy.parent_count())
            .finish_non_exhaustive()
    }
}
