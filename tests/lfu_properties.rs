// ==============================================
// LFU PROPERTY TESTS (integration)
// ==============================================
//
// Drives `LfuCache` with random operation sequences and compares every
// observable result against a naive O(n) reference model.

use freqcache::error::CacheError;
use freqcache::policy::lfu::LfuCache;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Put(u8, u32),
    Get(u8),
    Frequency(u8),
    Remove(u8),
    PopLfu,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    // Small key space so hits, updates and evictions all happen often.
    prop_oneof![
        4 => (0u8..12, any::<u32>()).prop_map(|(k, v)| Op::Put(k, v)),
        4 => (0u8..12).prop_map(Op::Get),
        1 => (0u8..12).prop_map(Op::Frequency),
        1 => (0u8..12).prop_map(Op::Remove),
        1 => Just(Op::PopLfu),
    ]
}

#[derive(Debug, Clone)]
struct ModelEntry {
    key: u8,
    value: u32,
    freq: u64,
    last_use: u64,
}

/// Linear-scan LFU with LRU tie-breaking.
#[derive(Debug)]
struct Model {
    capacity: usize,
    clock: u64,
    entries: Vec<ModelEntry>,
}

impl Model {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            clock: 0,
            entries: Vec::new(),
        }
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn position(&self, key: u8) -> Option<usize> {
        self.entries.iter().position(|e| e.key == key)
    }

    fn victim(&self) -> Option<usize> {
        self.entries
            .iter()
            .enumerate()
            .min_by_key(|(_, e)| (e.freq, e.last_use))
            .map(|(idx, _)| idx)
    }

    fn get(&mut self, key: u8) -> Option<u32> {
        let idx = self.position(key)?;
        let now = self.tick();
        let entry = &mut self.entries[idx];
        entry.freq += 1;
        entry.last_use = now;
        Some(entry.value)
    }

    fn put(&mut self, key: u8, value: u32) {
        let now = self.tick();
        if let Some(idx) = self.position(key) {
            let entry = &mut self.entries[idx];
            entry.freq += 1;
            entry.last_use = now;
            entry.value = value;
            return;
        }
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() >= self.capacity
            && let Some(idx) = self.victim()
        {
            self.entries.remove(idx);
        }
        self.entries.push(ModelEntry {
            key,
            value,
            freq: 1,
            last_use: now,
        });
    }

    fn frequency(&self, key: u8) -> Option<u64> {
        self.position(key).map(|idx| self.entries[idx].freq)
    }

    fn remove(&mut self, key: u8) -> Option<u32> {
        let idx = self.position(key)?;
        Some(self.entries.remove(idx).value)
    }

    fn pop_lfu(&mut self) -> Option<(u8, u32)> {
        let idx = self.victim()?;
        let entry = self.entries.remove(idx);
        Some((entry.key, entry.value))
    }

    fn ordered(&self) -> Vec<(u8, u32)> {
        let mut sorted = self.entries.clone();
        sorted.sort_by(|a, b| b.freq.cmp(&a.freq).then(b.last_use.cmp(&a.last_use)));
        sorted.into_iter().map(|e| (e.key, e.value)).collect()
    }
}

fn not_found<T>(result: Option<T>) -> Result<T, CacheError> {
    result.ok_or(CacheError::KeyNotFound)
}

proptest! {
    /// Property: every operation agrees with the reference model, and the
    /// structural invariants hold after each step.
    #[cfg_attr(miri, ignore)]
    #[test]
    fn prop_matches_reference_model(
        capacity in 0usize..6,
        ops in prop::collection::vec(op_strategy(), 0..200)
    ) {
        let mut cache = LfuCache::new(capacity);
        let mut model = Model::new(capacity);

        for op in ops {
            match op {
                Op::Put(k, v) => {
                    cache.put(k, v);
                    model.put(k, v);
                },
                Op::Get(k) => {
                    prop_assert_eq!(cache.get(&k).copied(), not_found(model.get(k)));
                },
                Op::Frequency(k) => {
                    prop_assert_eq!(cache.frequency(&k), not_found(model.frequency(k)));
                },
                Op::Remove(k) => {
                    prop_assert_eq!(cache.remove(&k), model.remove(k));
                },
                Op::PopLfu => {
                    prop_assert_eq!(cache.pop_lfu(), model.pop_lfu());
                },
            }

            prop_assert!(cache.check_invariants().is_ok(), "{:?}", cache.check_invariants());
            prop_assert_eq!(cache.len(), model.entries.len());
            let actual: Vec<_> = cache.iter().map(|(k, v)| (*k, *v)).collect();
            prop_assert_eq!(actual, model.ordered());
        }
    }

    /// Property: len() never exceeds capacity, whatever is inserted.
    #[cfg_attr(miri, ignore)]
    #[test]
    fn prop_len_within_capacity(
        capacity in 0usize..16,
        keys in prop::collection::vec(any::<u16>(), 0..300)
    ) {
        let mut cache = LfuCache::new(capacity);
        for key in keys {
            cache.put(key, ());
            prop_assert!(cache.len() <= cache.capacity());
        }
    }

    /// Property: frequency never decreases while a key stays resident.
    #[cfg_attr(miri, ignore)]
    #[test]
    fn prop_frequency_monotonic_while_resident(
        ops in prop::collection::vec((0u8..6, any::<bool>()), 1..200)
    ) {
        let mut cache = LfuCache::new(4);
        let mut last_seen = [0u64; 6];

        for (key, is_put) in ops {
            if is_put {
                cache.put(key, key);
            } else {
                let _ = cache.get(&key);
            }
            for k in 0u8..6 {
                match cache.frequency(&k) {
                    Ok(freq) => {
                        if last_seen[k as usize] > 0 {
                            prop_assert!(freq >= last_seen[k as usize]);
                        }
                        last_seen[k as usize] = freq;
                    },
                    Err(_) => last_seen[k as usize] = 0,
                }
            }
        }
    }

    /// Property: misses and frequency reads leave every observable unchanged.
    #[cfg_attr(miri, ignore)]
    #[test]
    fn prop_reads_of_absent_keys_change_nothing(
        keys in prop::collection::vec(0u8..8, 0..40),
        probe in 8u8..16
    ) {
        let mut cache = LfuCache::new(5);
        for key in keys {
            cache.put(key, u32::from(key));
        }
        let before: Vec<_> = cache.iter().map(|(k, v)| (*k, *v)).collect();
        let freqs_before: Vec<_> = before.iter().map(|(k, _)| cache.frequency(k)).collect();

        prop_assert_eq!(cache.get(&probe), Err(CacheError::KeyNotFound));
        prop_assert_eq!(cache.frequency(&probe), Err(CacheError::KeyNotFound));

        let after: Vec<_> = cache.iter().map(|(k, v)| (*k, *v)).collect();
        let freqs_after: Vec<_> = after.iter().map(|(k, _)| cache.frequency(k)).collect();
        prop_assert_eq!(before, after);
        prop_assert_eq!(freqs_before, freqs_after);
        prop_assert_eq!(cache.capacity(), 5);
    }
}
