use crate::metrics::traits::HierarchyMetricsRecorder;

/// Plain-counter store for the hierarchy cache's extended telemetry.
///
/// Mutated through [`HierarchyMetricsRecorder`] while the caller already holds
/// exclusive access to the cache, so plain `u64` fields suffice.
#[derive(Debug, Default)]
pub struct HierarchyMetrics {
    pub inserts_new: u64,
    pub inserts_replaced: u64,
    pub current_level_sweeps: u64,
    pub exhaustive_sweeps: u64,
    pub evicted_entries: u64,
    pub contexts_closed: u64,
    pub close_failures: u64,
    pub clears: u64,
}

impl HierarchyMetricsRecorder for HierarchyMetrics {
    fn record_insert_new(&mut self) {
        self.inserts_new += 1;
    }

    fn record_insert_replaced(&mut self) {
        self.inserts_replaced += 1;
    }

    fn record_current_level_sweep(&mut self) {
        self.current_level_sweeps += 1;
    }

    fn record_exhaustive_sweep(&mut self) {
        self.exhaustive_sweeps += 1;
    }

    fn record_evicted_entry(&mut self) {
        self.evicted_entries += 1;
    }

    fn record_context_closed(&mut self) {
        self.contexts_closed += 1;
    }

    fn record_close_failure(&mut self) {
        self.close_failures += 1;
    }

    fn record_clear(&mut self) {
        self.clears += 1;
    }
}
