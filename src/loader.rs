//! Cache-aware loading facade.
//!
//! [`CachingContextLoader`] pairs a shared [`ConcurrentHierarchyCache`] with
//! the embedder's [`ContextBuilder`]. Callers ask for a key; they get the
//! cached container or a freshly built one, and never talk to the builder
//! directly.
//!
//! ## Behavior
//! - [`load`](CachingContextLoader::load): `contains` then `get` (a hit) or
//!   build, insert, return. A build failure propagates unchanged and caches
//!   nothing, so a broken configuration stays rebuildable.
//! - [`close`](CachingContextLoader::close): delegates to the cache's removal
//!   sweep, logging close failures at `warn` level.
//! - The check-build-insert sequence spans lock boundaries; two racing
//!   loaders may both build, and the later insert wins. Embedding frameworks
//!   serialize workload-level mutation, so the duplicate build is a
//!   startup-time curiosity, not a correctness problem.
//!
//! ## Example Usage
//!
//! ```
//! use std::sync::Arc;
//!
//! use ctxcache::cache::ConcurrentHierarchyCache;
//! use ctxcache::key::SimpleKey;
//! use ctxcache::loader::CachingContextLoader;
//! use ctxcache::traits::ContextBuilder;
//!
//! struct EnvBuilder;
//!
//! impl ContextBuilder<SimpleKey, String> for EnvBuilder {
//!     type Error = std::io::Error;
//!
//!     fn build(&self, key: &SimpleKey) -> Result<String, Self::Error> {
//!         Ok(format!("context for {}", key.name()))
//!     }
//! }
//!
//! let cache = Arc::new(ConcurrentHierarchyCache::new());
//! let loader = CachingContextLoader::new(Arc::clone(&cache), EnvBuilder);
//!
//! let key = SimpleKey::root("app");
//! let first = loader.load(&key).unwrap();
//! let second = loader.load(&key).unwrap();
//!
//! assert!(Arc::ptr_eq(&first, &second));
//! assert_eq!(cache.hit_count(), 1);
//! ```

use std::sync::Arc;

use log::{debug, warn};

use crate::cache::{ConcurrentHierarchyCache, RemovalReport};
use crate::traits::{Context, ContextBuilder, ContextKey, HierarchyMode};

/// Facade that loads containers through a shared cache.
pub struct CachingContextLoader<K, V, B> {
    cache: Arc<ConcurrentHierarchyCache<K, V>>,
    builder: B,
}

impl<K, V, B> CachingContextLoader<K, V, B>
where
    K: ContextKey,
    V: Context,
    B: ContextBuilder<K, V>,
{
    /// Pairs a shared cache with a builder.
    pub fn new(cache: Arc<ConcurrentHierarchyCache<K, V>>, builder: B) -> Self {
        Self { cache, builder }
    }

    /// The shared cache handle.
    pub fn cache(&self) -> &Arc<ConcurrentHierarchyCache<K, V>> {
        &self.cache
    }

    /// Returns the container for `key`, building it on a cache miss.
    ///
    /// On the cached path this is `contains` followed by `get`, so the hit
    /// counter advances. On the build path the builder's error propagates
    /// unchanged and nothing is stored; a successful build is inserted
    /// (running the ancestor registration walk) and returned.
    pub fn load(&self, key: &K) -> Result<Arc<V>, B::Error> {
        if self.cache.contains(key) {
            if let Some(context) = self.cache.get(key) {
                return Ok(context);
            }
            // The entry was removed between contains and get; build afresh.
        }

        let context = Arc::new(self.builder.build(key)?);
        self.cache.insert_arc(key.clone(), Arc::clone(&context));
        debug!(
            "stored newly built container; cache statistics: {:?}",
            self.cache.statistics()
        );
        Ok(context)
    }

    /// Evicts `key` per `mode`, closing the swept containers.
    ///
    /// Close failures are logged at `warn` level and returned in the report;
    /// the sweep itself never fails.
    pub fn close(&self, key: &K, mode: HierarchyMode) -> RemovalReport<K> {
        let report = self.cache.remove(key, mode);
        for (_, err) in &report.close_failures {
            warn!("container close failed during eviction: {}", err);
        }
        if !report.is_empty() {
            debug!(
                "evicted {} container(s); cache statistics: {:?}",
                report.evicted_len(),
                self.cache.statistics()
            );
        }
        report
    }
}

impl<K, V, B> std::fmt::Debug for CachingContextLoader<K, V, B>
where
    K: ContextKey,
    V: Context,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachingContextLoader")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}
