#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LfuMetricsSnapshot {
    pub get_calls: u64,
    pub get_hits: u64,
    pub get_misses: u64,

    pub insert_calls: u64,
    pub insert_updates: u64,
    pub insert_new: u64,

    pub evict_calls: u64,
    pub evicted_entries: u64,
    pub clear_calls: u64,

    pub pop_lfu_calls: u64,
    pub pop_lfu_found: u64,
    pub peek_lfu_calls: u64,
    pub peek_lfu_found: u64,
    pub frequency_calls: u64,
    pub frequency_found: u64,
    pub remove_calls: u64,
    pub remove_found: u64,

    // gauges captured at snapshot time
    pub cache_len: usize,
    pub bucket_count: usize,
    pub capacity: usize,
}

impl LfuMetricsSnapshot {
    /// Fraction of `get` calls that hit, or `0.0` before the first call.
    pub fn hit_ratio(&self) -> f64 {
        if self.get_calls == 0 {
            0.0
        } else {
            self.get_hits as f64 / self.get_calls as f64
        }
    }
}
