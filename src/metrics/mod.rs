//! Opt-in telemetry for the hierarchy cache.
//!
//! Compiled only under the `metrics` feature. Recording, snapshotting, and
//! export are separate concerns; see [`traits`] for the split.

pub mod exporter;
pub mod metrics_impl;
pub mod snapshot;
pub mod traits;

pub use exporter::PrometheusTextExporter;
pub use metrics_impl::HierarchyMetrics;
pub use snapshot::HierarchyMetricsSnapshot;
pub use traits::{
    HierarchyMetricsRecorder, MetricsExporter, MetricsReset, MetricsSnapshotProvider,
};
