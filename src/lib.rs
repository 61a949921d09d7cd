//! freqcache: an O(1) least-frequently-used cache.
//!
//! [`LfuCache`](policy::lfu::LfuCache) evicts the entry with the lowest
//! use-count when a new key arrives at capacity, and breaks ties by evicting
//! the least recently used of the candidates. It is built from the
//! arena-backed list in [`ds`]: an outer list of frequency buckets, each
//! holding an inner list of entries in recency order.
//!
//! ```
//! use freqcache::prelude::*;
//!
//! let mut cache = LfuCache::new(2);
//! cache.put("a", 1);
//! cache.put("b", 2);
//! cache.get(&"a").unwrap();
//! cache.put("c", 3);
//!
//! assert_eq!(cache.get(&"b"), Err(CacheError::KeyNotFound));
//! assert_eq!(cache.frequency(&"a"), Ok(2));
//! ```

pub mod builder;
pub mod ds;
pub mod error;
pub mod policy;

#[cfg(feature = "metrics")]
pub mod metrics;

pub mod prelude;
