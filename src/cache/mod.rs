#[cfg(feature = "concurrency")]
pub mod concurrent;
pub mod hierarchy;

#[cfg(feature = "concurrency")]
pub use concurrent::ConcurrentHierarchyCache;
pub use hierarchy::{CacheStatistics, HierarchyCache, RemovalReport};
