//! # Metrics Trait Hierarchy
//!
//! Separates *recording*, *snapshotting*, and *export* into small traits so the
//! cache policy never depends on how its counters are consumed.
//!
//! ```text
//!                ┌─────────────────────────────┐
//!                │     CoreMetricsRecorder     │
//!                │  get_hit/get_miss/insert    │
//!                │  evict/clear                │
//!                └──────────────┬──────────────┘
//!                               │
//!                               ▼
//!                ┌─────────────────────────────┐     ┌──────────────────────────┐
//!                │     LfuMetricsRecorder      │     │  LfuMetricsReadRecorder  │
//!                │  pop_lfu/remove (&mut self) │     │  peek_lfu/frequency      │
//!                └─────────────────────────────┘     │  (&self, interior mut)   │
//!                                                    └──────────────────────────┘
//!
//!   Consumption (decoupled from recording):
//!   ┌──────────────────────────────┐    ┌──────────────────────────────┐
//!   │ MetricsSnapshotProvider<S>   │    │ MetricsExporter<S>           │
//!   │ (bench/test)                 │    │ (production monitoring)      │
//!   └──────────────────────────────┘    └──────────────────────────────┘
//! ```

/// Common counters for any cache policy.
pub trait CoreMetricsRecorder {
    fn record_get_hit(&mut self);
    fn record_get_miss(&mut self);
    fn record_insert_call(&mut self);
    fn record_insert_new(&mut self);
    fn record_insert_update(&mut self);
    fn record_evict_call(&mut self);
    fn record_evicted_entry(&mut self);
    fn record_clear(&mut self);
}

/// Metrics for LFU behavior (frequency order).
pub trait LfuMetricsRecorder: CoreMetricsRecorder {
    fn record_pop_lfu_call(&mut self);
    fn record_pop_lfu_found(&mut self);
    fn record_remove_call(&mut self);
    fn record_remove_found(&mut self);
}

/// Read-only LFU metrics for &self methods (uses interior mutability).
pub trait LfuMetricsReadRecorder {
    fn record_peek_lfu_call(&self);
    fn record_peek_lfu_found(&self);
    fn record_frequency_call(&self);
    fn record_frequency_found(&self);
}

/// Snapshot provider for bench/testing.
pub trait MetricsSnapshotProvider<S> {
    fn snapshot(&self) -> S;
}

/// Export/publish metrics to production monitoring backends.
pub trait MetricsExporter<S> {
    fn export(&self, snapshot: &S);
}
