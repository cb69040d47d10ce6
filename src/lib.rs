//! ctxcache: hierarchical context caching primitives.
//!
//! Keyed containers form parent/child hierarchies. The cache tracks both the
//! containers and the hierarchy, so eviction can sweep whole subtrees and
//! close children before their parents.

pub mod cache;
pub mod ds;
pub mod error;
pub mod key;

#[cfg(feature = "concurrency")]
pub mod loader;

#[cfg(feature = "metrics")]
pub mod metrics;

pub mod prelude;
pub mod store;
pub mod traits;
