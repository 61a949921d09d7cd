//! Error types for the freqcache library.
//!
//! ## Key Components
//!
//! - [`CacheError`]: Returned by lookups on absent keys, and by fallible
//!   construction when the requested capacity is negative.
//! - [`InvariantError`]: Returned when internal data-structure invariants are
//!   violated (`check_invariants` methods).
//!
//! ## Example Usage
//!
//! ```
//! use freqcache::error::CacheError;
//! use freqcache::policy::lfu::LfuCache;
//!
//! let mut cache: LfuCache<u32, &str> = LfuCache::new(2);
//! assert_eq!(cache.get(&1), Err(CacheError::KeyNotFound));
//!
//! cache.put(1, "one");
//! assert_eq!(cache.get(&1), Ok(&"one"));
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// CacheError
// ---------------------------------------------------------------------------

/// Error returned by cache operations.
///
/// `KeyNotFound` is the only error a running cache produces. `InvalidCapacity`
/// only surfaces from [`LfuCacheBuilder::try_build`](crate::builder::LfuCacheBuilder::try_build);
/// the panicking `build()` treats it as a programming error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheError {
    /// The requested key is not resident.
    KeyNotFound,
    /// A negative capacity was requested.
    InvalidCapacity(i64),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::KeyNotFound => f.write_str("key not found"),
            CacheError::InvalidCapacity(capacity) => {
                write!(f, "invalid capacity {}: capacity must be >= 0", capacity)
            },
        }
    }
}

impl std::error::Error for CacheError {}

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal cache invariants are violated.
///
/// Produced by [`LfuCache::check_invariants`](crate::policy::lfu::LfuCache::check_invariants).
/// Carries a human-readable description of which invariant failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
