//! Builder for [`LfuCache`].
//!
//! Capacity is the only setting. It is accepted as a signed value so that
//! capacities coming from untrusted configuration can be validated in one
//! place; leaving it unset gives [`DEFAULT_CAPACITY`].
//!
//! ## Example
//!
//! ```rust
//! use freqcache::builder::LfuCacheBuilder;
//! use freqcache::error::CacheError;
//!
//! let mut cache = LfuCacheBuilder::new().capacity(100).build::<u64, String>();
//! cache.put(1, "hello".to_string());
//! assert_eq!(cache.get(&1), Ok(&"hello".to_string()));
//!
//! assert_eq!(LfuCacheBuilder::new().build::<u64, u64>().capacity(), 5);
//!
//! let err = LfuCacheBuilder::new().capacity(-1).try_build::<u64, u64>().unwrap_err();
//! assert_eq!(err, CacheError::InvalidCapacity(-1));
//! ```

use std::hash::Hash;

use crate::error::CacheError;
use crate::policy::lfu::{DEFAULT_CAPACITY, LfuCache};

/// Collects construction parameters for an [`LfuCache`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LfuCacheBuilder {
    capacity: Option<i64>,
}

impl LfuCacheBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum number of entries. Must be non-negative.
    pub fn capacity(mut self, capacity: i64) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Builds the cache, reporting a negative capacity as
    /// [`CacheError::InvalidCapacity`].
    pub fn try_build<K, V>(self) -> Result<LfuCache<K, V>, CacheError>
    where
        K: Eq + Hash + Clone,
    {
        let capacity = match self.capacity {
            None => DEFAULT_CAPACITY,
            Some(requested) => {
                usize::try_from(requested).map_err(|_| CacheError::InvalidCapacity(requested))?
            },
        };
        Ok(LfuCache::new(capacity))
    }

    /// Builds the cache.
    ///
    /// # Panics
    ///
    /// Panics if the configured capacity is negative. That is a programming
    /// error; use [`try_build`](Self::try_build) for capacities that come from
    /// outside the program.
    pub fn build<K, V>(self) -> LfuCache<K, V>
    where
        K: Eq + Hash + Clone,
    {
        match self.try_build() {
            Ok(cache) => cache,
            Err(err) => panic!("{}", err),
        }
    }
}
