//! # Metrics Trait Hierarchy
//!
//! This module mirrors the cache trait design by separating *recording*,
//! *snapshotting*, and *export* responsibilities into small, composable traits.
//! It enables production monitoring and bench/testing without coupling those
//! concerns to the hierarchy bookkeeping itself.
//!
//! ## Architecture
//!
//! ```text
//!                  ┌─────────────────────────────┐
//!                  │  HierarchyMetricsRecorder   │
//!                  │  insert/sweep/evict/close   │
//!                  │  clear                      │
//!                  └──────────────┬──────────────┘
//!                                 │ written by HierarchyCache
//!                                 ▼
//!                       ┌──────────────────┐
//!                       │ HierarchyMetrics │
//!                       └──────────────────┘
//!
//!   Consumption (decoupled from recording):
//!   ┌──────────────────────────────┐    ┌──────────────────────────────┐
//!   │ MetricsSnapshotProvider<S>   │    │ MetricsExporter<S>           │
//!   │ (bench/test)                 │    │ (production monitoring)      │
//!   └──────────────────────────────┘    └──────────────────────────────┘
//! ```
//!
//! ## Design Goals
//! - **Single responsibility**: the recorder only writes counters; providers
//!   only read/snapshot; exporters only publish to monitoring systems.
//! - **Environment split**:
//!   - Production: lightweight recorder + exporters.
//!   - Bench/Test: snapshot providers + resettable metrics.

/// Counters for hierarchy cache life cycle events.
///
/// The always-on hit/miss statistics live in the cache itself; this trait
/// covers the extended telemetry that only exists under the `metrics` feature.
pub trait HierarchyMetricsRecorder {
    fn record_insert_new(&mut self);
    fn record_insert_replaced(&mut self);
    fn record_current_level_sweep(&mut self);
    fn record_exhaustive_sweep(&mut self);
    fn record_evicted_entry(&mut self);
    fn record_context_closed(&mut self);
    fn record_close_failure(&mut self);
    fn record_clear(&mut self);
}

/// Snapshot provider for bench/testing.
pub trait MetricsSnapshotProvider<S> {
    fn snapshot(&self) -> S;
}

/// Reset metrics between tests or benchmark iterations.
pub trait MetricsReset {
    fn reset_metrics(&self);
}

/// Export/publish metrics to production monitoring backends.
pub trait MetricsExporter<S> {
    fn export(&self, snapshot: &S);
}
