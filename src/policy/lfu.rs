//! # LFU (Least Frequently Used) Cache Implementation
//!
//! A fixed-capacity cache that evicts the least frequently used entry when a
//! new key arrives at capacity. Ties between entries with the same use-count
//! are broken by recency: the least recently used of them goes first. Every
//! operation except traversal is O(1).
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────────┐
//!   │                           LfuCache<K, V>                                 │
//!   │                                                                          │
//!   │   index: FxHashMap<K, EntryHandle { bucket, node }>                      │
//!   │   bucket_index: FxHashMap<u64, SlotId>                                   │
//!   │   min_freq: u64                                                          │
//!   │                                                                          │
//!   │   buckets: IntrusiveList<Bucket>  (ascending frequency, front → back)    │
//!   │                                                                          │
//!   │     min_freq                                                             │
//!   │        │                                                                 │
//!   │        ▼                                                                 │
//!   │   ┌─────────┐     ┌─────────┐     ┌─────────┐                            │
//!   │   │ freq 1  │ ◄─► │ freq 2  │ ◄─► │ freq 5  │                            │
//!   │   └────┬────┘     └────┬────┘     └────┬────┘                            │
//!   │        │               │               │                                 │
//!   │   MRU [d]─[c]─[a] LRU  [b]             [e]                               │
//!   │               ▲                                                          │
//!   │               └── eviction victim: back of the min_freq bucket           │
//!   └──────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Both levels use the same arena-backed [`IntrusiveList`]. The two maps hold
//! `SlotId` handles into those lists and never own nodes, so an entry reached
//! through `index` and the same entry reached by walking its bucket are one
//! and the same value.
//!
//! ## Promotion Flow (`get`, `put` on a resident key)
//!
//! ```text
//!   entry in bucket f
//!        │
//!        ▼
//!   bucket f+1 exists? ── no ──► create it directly after bucket f
//!        │
//!        ▼
//!   unlink entry from bucket f, push to front of bucket f+1
//!        │
//!        ▼
//!   bucket f empty? ── yes ──► drop it; if f == min_freq, min_freq = f+1
//! ```
//!
//! ## Insertion Flow (`put` on a new key)
//!
//! ```text
//!   capacity == 0        → nothing can be resident; the key is dropped
//!   len == capacity      → evict back of the min_freq bucket
//!   bucket 1 missing     → create it at the front of the bucket list
//!   push entry to front of bucket 1, min_freq = 1
//! ```
//!
//! ## Operations
//!
//! | Method          | Complexity | Description                                    |
//! |-----------------|------------|------------------------------------------------|
//! | `get(&k)`       | O(1)       | Value lookup, counts as a use                  |
//! | `put(k, v)`     | O(1)       | Insert or update, may evict                    |
//! | `frequency(&k)` | O(1)       | Use-count without touching it                  |
//! | `peek(&k)`      | O(1)       | Value without touching frequency or recency    |
//! | `remove(&k)`    | O(1)       | Explicit removal                               |
//! | `pop_lfu()`     | O(1)       | Evict the current victim on demand             |
//! | `peek_lfu()`    | O(1)       | Inspect the current victim                     |
//! | `iter()`        | O(n)       | Highest frequency first, MRU first within one  |
//! | `clear()`       | O(n)       | Drop all entries                               |
//!
//! ## Thread Safety
//!
//! `LfuCache` is not thread-safe. `get` mutates frequency and recency state,
//! so shared use needs an exclusive lock around every call
//! (`Mutex<LfuCache<K, V>>`), reads included.
//!
//! ## Example Usage
//!
//! ```
//! use freqcache::policy::lfu::LfuCache;
//!
//! let mut cache = LfuCache::new(2);
//! cache.put(1, "a");
//! cache.put(2, "b");
//! assert_eq!(cache.get(&1), Ok(&"a"));
//!
//! // key 2 has the lowest use-count, so it makes room for key 3
//! cache.put(3, "c");
//! assert!(!cache.contains(&2));
//!
//! let order: Vec<_> = cache.iter().map(|(k, v)| (*k, *v)).collect();
//! assert_eq!(order, vec![(1, "a"), (3, "c")]);
//! ```

use std::hash::Hash;
use std::iter::{FusedIterator, Rev};

use rustc_hash::FxHashMap;

use crate::ds::intrusive_list::{IntrusiveList, IntrusiveListIter};
use crate::ds::slot_arena::SlotId;
use crate::error::{CacheError, InvariantError};
#[cfg(feature = "metrics")]
use crate::metrics::metrics_impl::LfuMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::LfuMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{
    CoreMetricsRecorder, LfuMetricsReadRecorder, LfuMetricsRecorder, MetricsSnapshotProvider,
};

/// Capacity used by [`LfuCache::default`] and the builder when none is given.
pub const DEFAULT_CAPACITY: usize = 5;

/// Upper bound on eager map/list reservations made by the constructor.
const MAX_PREALLOC: usize = 1 << 16;

#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
    freq: u64,
}

#[derive(Debug)]
struct Bucket<K, V> {
    freq: u64,
    entries: IntrusiveList<Entry<K, V>>,
}

impl<K, V> Bucket<K, V> {
    fn new(freq: u64) -> Self {
        Self {
            freq,
            entries: IntrusiveList::new(),
        }
    }
}

/// Location of an entry: its bucket in the outer list and its node in that
/// bucket's inner list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct EntryHandle {
    bucket: SlotId,
    node: SlotId,
}

/// LFU cache with LRU tie-breaking.
///
/// See module-level documentation for details.
#[derive(Debug)]
pub struct LfuCache<K, V> {
    capacity: usize,
    buckets: IntrusiveList<Bucket<K, V>>,
    bucket_index: FxHashMap<u64, SlotId>,
    index: FxHashMap<K, EntryHandle>,
    // 0 while the cache is empty
    min_freq: u64,
    #[cfg(feature = "metrics")]
    metrics: LfuMetrics,
}

impl<K, V> LfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a cache holding at most `capacity` entries.
    ///
    /// A capacity of zero is allowed: every `put` of a new key is evicted
    /// immediately and the cache stays empty.
    pub fn new(capacity: usize) -> Self {
        let prealloc = capacity.min(MAX_PREALLOC);
        Self {
            capacity,
            buckets: IntrusiveList::new(),
            bucket_index: FxHashMap::default(),
            index: FxHashMap::with_capacity_and_hasher(prealloc, Default::default()),
            min_freq: 0,
            #[cfg(feature = "metrics")]
            metrics: LfuMetrics::default(),
        }
    }

    /// Maximum number of resident entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of resident entries.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns `true` when no entries are resident.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Number of distinct use-counts currently present.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Returns `true` if `key` is resident. Does not count as a use.
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Looks up `key`, counting the lookup as a use.
    ///
    /// On a hit the entry's use-count grows by one and it becomes the most
    /// recently used entry of its new frequency. A miss changes nothing.
    pub fn get(&mut self, key: &K) -> Result<&V, CacheError> {
        let Some(&handle) = self.index.get(key) else {
            #[cfg(feature = "metrics")]
            self.metrics.record_get_miss();
            return Err(CacheError::KeyNotFound);
        };

        let handle = self.promote(key, handle).ok_or(CacheError::KeyNotFound)?;

        #[cfg(feature = "metrics")]
        self.metrics.record_get_hit();

        self.entry_at(handle)
            .map(|entry| &entry.value)
            .ok_or(CacheError::KeyNotFound)
    }

    /// Inserts or updates `key`.
    ///
    /// Updating a resident key counts as a use (same promotion as [`get`](Self::get))
    /// and then replaces the value. Inserting a new key into a full cache
    /// first evicts the least frequently used entry, least recently used
    /// among ties.
    pub fn put(&mut self, key: K, value: V) {
        #[cfg(feature = "metrics")]
        self.metrics.record_insert_call();

        if let Some(&handle) = self.index.get(&key) {
            #[cfg(feature = "metrics")]
            self.metrics.record_insert_update();

            let promoted = self.promote(&key, handle);
            debug_assert!(promoted.is_some(), "resident key lost its entry on promotion");
            if let Some(handle) = promoted
                && let Some(entry) = self.entry_at_mut(handle)
            {
                entry.value = value;
            }
            return;
        }

        #[cfg(feature = "metrics")]
        self.metrics.record_insert_new();

        if self.capacity == 0 {
            // The new entry would be its own eviction victim.
            #[cfg(feature = "metrics")]
            {
                self.metrics.record_evict_call();
                self.metrics.record_evicted_entry();
            }
            return;
        }

        if self.len() >= self.capacity {
            #[cfg(feature = "metrics")]
            self.metrics.record_evict_call();

            if let Some((_key, _value)) = self.evict_min_freq() {
                #[cfg(feature = "metrics")]
                self.metrics.record_evicted_entry();
            }
        }

        self.insert_new(key, value);
    }

    /// Returns the use-count of `key` without counting as a use.
    pub fn frequency(&self, key: &K) -> Result<u64, CacheError> {
        #[cfg(feature = "metrics")]
        (&self.metrics).record_frequency_call();

        let freq = self
            .index
            .get(key)
            .and_then(|handle| self.entry_at(*handle))
            .map(|entry| entry.freq)
            .ok_or(CacheError::KeyNotFound)?;

        #[cfg(feature = "metrics")]
        (&self.metrics).record_frequency_found();

        Ok(freq)
    }

    /// Returns the value for `key` without touching frequency or recency.
    pub fn peek(&self, key: &K) -> Option<&V> {
        let handle = self.index.get(key)?;
        self.entry_at(*handle).map(|entry| &entry.value)
    }

    /// Removes `key` and returns its value.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        #[cfg(feature = "metrics")]
        self.metrics.record_remove_call();

        let handle = self.index.remove(key)?;
        let entry = self.unlink(handle)?;

        #[cfg(feature = "metrics")]
        self.metrics.record_remove_found();

        Some(entry.value)
    }

    /// Removes and returns the entry `put` would evict next.
    pub fn pop_lfu(&mut self) -> Option<(K, V)> {
        #[cfg(feature = "metrics")]
        self.metrics.record_pop_lfu_call();

        let result = self.evict_min_freq();

        #[cfg(feature = "metrics")]
        if result.is_some() {
            self.metrics.record_pop_lfu_found();
        }

        result
    }

    /// Returns the entry `put` would evict next, without removing it.
    pub fn peek_lfu(&self) -> Option<(&K, &V)> {
        #[cfg(feature = "metrics")]
        (&self.metrics).record_peek_lfu_call();

        let bucket_id = self.bucket_index.get(&self.min_freq)?;
        let entry = self.buckets.get(*bucket_id)?.entries.back()?;

        #[cfg(feature = "metrics")]
        (&self.metrics).record_peek_lfu_found();

        Some((&entry.key, &entry.value))
    }

    /// Drops every entry. Capacity is unchanged.
    pub fn clear(&mut self) {
        #[cfg(feature = "metrics")]
        self.metrics.record_clear();

        self.buckets.clear();
        self.bucket_index.clear();
        self.index.clear();
        self.min_freq = 0;
    }

    /// Iterates `(key, value)` pairs from the highest use-count to the lowest,
    /// most recently used first among equal counts.
    ///
    /// Iteration is a pure read: it does not count as a use of any entry.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            buckets: self.buckets.iter().rev(),
            entries: None,
            remaining: self.len(),
        }
    }

    /// Checks every structural invariant of the cache.
    ///
    /// Walks all buckets and entries, so this is O(n); intended for tests,
    /// fuzzers and debug assertions.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.len() > self.capacity {
            return Err(InvariantError::new(format!(
                "len {} exceeds capacity {}",
                self.len(),
                self.capacity
            )));
        }

        if self.is_empty() {
            if !self.buckets.is_empty() || !self.bucket_index.is_empty() {
                return Err(InvariantError::new("empty cache still holds buckets"));
            }
            if self.min_freq != 0 {
                return Err(InvariantError::new(format!(
                    "empty cache has min_freq {}",
                    self.min_freq
                )));
            }
            return Ok(());
        }

        if self.bucket_index.len() != self.buckets.len() {
            return Err(InvariantError::new(format!(
                "bucket_index has {} entries but {} buckets are linked",
                self.bucket_index.len(),
                self.buckets.len()
            )));
        }

        let front_freq = self
            .buckets
            .front()
            .map(|bucket| bucket.freq)
            .ok_or_else(|| InvariantError::new("non-empty cache has no buckets"))?;
        if front_freq != self.min_freq {
            return Err(InvariantError::new(format!(
                "min_freq {} does not match lowest bucket {}",
                self.min_freq, front_freq
            )));
        }

        let mut previous_freq = 0u64;
        let mut entry_count = 0usize;
        for bucket_id in self.buckets.iter_ids() {
            let bucket = self
                .buckets
                .get(bucket_id)
                .ok_or_else(|| InvariantError::new("linked bucket missing from arena"))?;

            if bucket.freq <= previous_freq {
                return Err(InvariantError::new(format!(
                    "bucket {} follows bucket {}; frequencies must ascend",
                    bucket.freq, previous_freq
                )));
            }
            previous_freq = bucket.freq;

            if bucket.entries.is_empty() {
                return Err(InvariantError::new(format!(
                    "bucket {} is empty",
                    bucket.freq
                )));
            }
            if self.bucket_index.get(&bucket.freq) != Some(&bucket_id) {
                return Err(InvariantError::new(format!(
                    "bucket_index does not point at bucket {}",
                    bucket.freq
                )));
            }

            for node in bucket.entries.iter_ids() {
                let entry = bucket
                    .entries
                    .get(node)
                    .ok_or_else(|| InvariantError::new("linked entry missing from arena"))?;
                if entry.freq != bucket.freq {
                    return Err(InvariantError::new(format!(
                        "entry with use-count {} sits in bucket {}",
                        entry.freq, bucket.freq
                    )));
                }
                let expected = EntryHandle {
                    bucket: bucket_id,
                    node,
                };
                if self.index.get(&entry.key) != Some(&expected) {
                    return Err(InvariantError::new(format!(
                        "index handle for an entry in bucket {} is stale",
                        bucket.freq
                    )));
                }
                entry_count += 1;
            }
        }

        if entry_count != self.len() {
            return Err(InvariantError::new(format!(
                "buckets hold {} entries but index has {}",
                entry_count,
                self.len()
            )));
        }

        Ok(())
    }

    fn entry_at(&self, handle: EntryHandle) -> Option<&Entry<K, V>> {
        self.buckets.get(handle.bucket)?.entries.get(handle.node)
    }

    fn entry_at_mut(&mut self, handle: EntryHandle) -> Option<&mut Entry<K, V>> {
        self.buckets.get_mut(handle.bucket)?.entries.get_mut(handle.node)
    }

    /// Counts one use of the entry at `handle` and relocates it to the front of
    /// the next bucket. Returns the entry's new handle.
    fn promote(&mut self, key: &K, handle: EntryHandle) -> Option<EntryHandle> {
        let freq = self.buckets.get(handle.bucket)?.freq;

        // Saturated counts stay put and only refresh recency.
        let Some(new_freq) = freq.checked_add(1) else {
            self.buckets
                .get_mut(handle.bucket)?
                .entries
                .move_to_front(handle.node);
            return Some(handle);
        };

        // Create the target before unlinking so the old bucket is still a
        // valid anchor.
        let target = self.bucket_after(handle.bucket, new_freq);
        let mut entry = self.unlink(handle)?;
        entry.freq = new_freq;

        let node = self.buckets.get_mut(target)?.entries.push_front(entry);
        let new_handle = EntryHandle {
            bucket: target,
            node,
        };
        if let Some(slot) = self.index.get_mut(key) {
            *slot = new_handle;
        }
        Some(new_handle)
    }

    /// Returns the bucket for `freq`, creating it directly after `anchor` when
    /// absent. `freq` must be greater than the anchor's frequency and smaller
    /// than its successor's.
    fn bucket_after(&mut self, anchor: SlotId, freq: u64) -> SlotId {
        if let Some(&id) = self.bucket_index.get(&freq) {
            return id;
        }
        let id = match self.buckets.next_id(anchor) {
            Some(next) => self.buckets.push_before(next, Bucket::new(freq)),
            None => self.buckets.push_back(Bucket::new(freq)),
        };
        self.bucket_index.insert(freq, id);
        id
    }

    fn insert_new(&mut self, key: K, value: V) {
        let bucket_id = match self.bucket_index.get(&1) {
            Some(&id) => id,
            None => {
                // 1 is the smallest possible count, so the new bucket always
                // leads the list.
                let id = self.buckets.push_front(Bucket::new(1));
                self.bucket_index.insert(1, id);
                id
            },
        };

        let Some(bucket) = self.buckets.get_mut(bucket_id) else {
            debug_assert!(false, "bucket 1 missing right after lookup or creation");
            return;
        };
        let node = bucket.entries.push_front(Entry {
            key: key.clone(),
            value,
            freq: 1,
        });
        self.index.insert(
            key,
            EntryHandle {
                bucket: bucket_id,
                node,
            },
        );
        self.min_freq = 1;
    }

    /// Unlinks the entry at `handle` from its bucket, dropping the bucket when
    /// it empties. Does not touch `index`.
    fn unlink(&mut self, handle: EntryHandle) -> Option<Entry<K, V>> {
        let bucket = self.buckets.get_mut(handle.bucket)?;
        let entry = bucket.entries.remove(handle.node)?;
        if bucket.entries.is_empty() {
            self.drop_bucket(handle.bucket);
        }
        Some(entry)
    }

    fn drop_bucket(&mut self, id: SlotId) {
        let next_freq = self
            .buckets
            .next_id(id)
            .and_then(|next| self.buckets.get(next))
            .map(|bucket| bucket.freq);

        if let Some(bucket) = self.buckets.remove(id) {
            self.bucket_index.remove(&bucket.freq);
            if bucket.freq == self.min_freq {
                // Buckets ascend, so the successor holds the new minimum.
                self.min_freq = next_freq.unwrap_or(0);
            }
        }
    }

    fn evict_min_freq(&mut self) -> Option<(K, V)> {
        let bucket_id = *self.bucket_index.get(&self.min_freq)?;
        let bucket = self.buckets.get_mut(bucket_id)?;
        let entry = bucket.entries.pop_back()?;
        if bucket.entries.is_empty() {
            self.drop_bucket(bucket_id);
        }
        self.index.remove(&entry.key);
        Some((entry.key, entry.value))
    }
}

impl<K, V> Default for LfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(feature = "metrics")]
impl<K, V> LfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn metrics_snapshot(&self) -> LfuMetricsSnapshot {
        LfuMetricsSnapshot {
            get_calls: self.metrics.get_calls,
            get_hits: self.metrics.get_hits,
            get_misses: self.metrics.get_misses,
            insert_calls: self.metrics.insert_calls,
            insert_updates: self.metrics.insert_updates,
            insert_new: self.metrics.insert_new,
            evict_calls: self.metrics.evict_calls,
            evicted_entries: self.metrics.evicted_entries,
            clear_calls: self.metrics.clear_calls,
            pop_lfu_calls: self.metrics.pop_lfu_calls,
            pop_lfu_found: self.metrics.pop_lfu_found,
            peek_lfu_calls: self.metrics.peek_lfu_calls.get(),
            peek_lfu_found: self.metrics.peek_lfu_found.get(),
            frequency_calls: self.metrics.frequency_calls.get(),
            frequency_found: self.metrics.frequency_found.get(),
            remove_calls: self.metrics.remove_calls,
            remove_found: self.metrics.remove_found,
            cache_len: self.len(),
            bucket_count: self.bucket_count(),
            capacity: self.capacity,
        }
    }
}

#[cfg(feature = "metrics")]
impl<K, V> MetricsSnapshotProvider<LfuMetricsSnapshot> for LfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn snapshot(&self) -> LfuMetricsSnapshot {
        self.metrics_snapshot()
    }
}

/// Iterator returned by [`LfuCache::iter`].
pub struct Iter<'a, K, V> {
    buckets: Rev<IntrusiveListIter<'a, Bucket<K, V>>>,
    entries: Option<IntrusiveListIter<'a, Entry<K, V>>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entries) = self.entries.as_mut()
                && let Some(entry) = entries.next()
            {
                self.remaining = self.remaining.saturating_sub(1);
                return Some((&entry.key, &entry.value));
            }
            let bucket = self.buckets.next()?;
            self.entries = Some(bucket.entries.iter());
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<'a, K, V> IntoIterator for &'a LfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
