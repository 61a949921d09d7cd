pub use crate::builder::LfuCacheBuilder;
pub use crate::ds::{IntrusiveList, SlotArena, SlotId};
pub use crate::error::{CacheError, InvariantError};
#[cfg(feature = "metrics")]
pub use crate::metrics::snapshot::LfuMetricsSnapshot;
#[cfg(feature = "metrics")]
pub use crate::metrics::traits::{MetricsExporter, MetricsSnapshotProvider};
pub use crate::policy::lfu::{DEFAULT_CAPACITY, LfuCache};
