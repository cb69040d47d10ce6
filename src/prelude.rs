pub use crate::cache::{CacheStatistics, HierarchyCache, RemovalReport};
pub use crate::ds::HierarchyIndex;
pub use crate::error::{CloseError, InvariantError};
pub use crate::key::SimpleKey;
pub use crate::store::ContextStore;
pub use crate::traits::{Context, ContextBuilder, ContextKey, HierarchyMode};

#[cfg(feature = "concurrency")]
pub use crate::cache::ConcurrentHierarchyCache;
#[cfg(feature = "concurrency")]
pub use crate::loader::CachingContextLoader;

#[cfg(feature = "metrics")]
pub use crate::metrics::{
    HierarchyMetrics, HierarchyMetricsSnapshot, MetricsExporter, MetricsReset,
    MetricsSnapshotProvider, PrometheusTextExporter,
};
