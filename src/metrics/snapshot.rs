#[derive(Debug, Default, Clone, Copy)]
pub struct HierarchyMetricsSnapshot {
    pub inserts_new: u64,
    pub inserts_replaced: u64,

    pub current_level_sweeps: u64,
    pub exhaustive_sweeps: u64,
    pub evicted_entries: u64,
    pub contexts_closed: u64,
    pub close_failures: u64,

    pub clears: u64,

    // always-on access statistics folded in at snapshot time
    pub get_hits: u64,
    pub get_misses: u64,

    // gauges captured at snapshot time
    pub cache_len: usize,
    pub parent_contexts: usize,
}
