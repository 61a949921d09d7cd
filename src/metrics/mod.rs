//! Optional instrumentation for cache policies (`metrics` feature).
//!
//! Recording, snapshotting and exporting live in separate modules so the
//! cache only ever touches the recorder traits.

pub mod cell;
pub mod exporter;
pub mod metrics_impl;
pub mod snapshot;
pub mod traits;
