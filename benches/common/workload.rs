//! Workload generators for hit-rate benchmarks.
//!
//! Key streams are deterministic for a given seed so runs stay comparable.

use freqcache::policy::lfu::LfuCache;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Zipf};

#[derive(Debug, Clone, Copy)]
pub enum Workload {
    /// Uniform random keys in `[0, universe)`.
    Uniform,
    /// Hot/cold split with a configurable hot fraction and hot access probability.
    Hotset { hot_fraction: f64, hot_prob: f64 },
    /// Sequential scan in `[0, universe)`.
    Scan,
    /// Zipf-distributed keys; `exponent` 1.0 is the classic skew.
    Zipfian { exponent: f64 },
}

#[derive(Debug, Clone, Copy)]
pub struct WorkloadSpec {
    pub universe: u64,
    pub workload: Workload,
    pub seed: u64,
}

impl WorkloadSpec {
    pub fn generator(self) -> WorkloadGenerator {
        WorkloadGenerator::new(self.universe, self.workload, self.seed)
    }
}

#[derive(Debug, Clone)]
pub struct WorkloadGenerator {
    universe: u64,
    workload: Workload,
    rng: SmallRng,
    scan_pos: u64,
    zipf: Option<Zipf<f64>>,
}

impl WorkloadGenerator {
    pub fn new(universe: u64, workload: Workload, seed: u64) -> Self {
        let universe = universe.max(1);
        let zipf = match workload {
            Workload::Zipfian { exponent } => Some(Zipf::new(universe as f64, exponent).unwrap()),
            _ => None,
        };
        Self {
            universe,
            workload,
            rng: SmallRng::seed_from_u64(seed),
            scan_pos: 0,
            zipf,
        }
    }

    pub fn next_key(&mut self) -> u64 {
        match self.workload {
            Workload::Uniform => self.rng.random_range(0..self.universe),
            Workload::Hotset {
                hot_fraction,
                hot_prob,
            } => {
                let hot_size =
                    ((self.universe as f64) * hot_fraction.clamp(0.0, 1.0)).round() as u64;
                let hot_size = hot_size.clamp(1, self.universe);
                if hot_size == self.universe || self.rng.random::<f64>() < hot_prob {
                    self.rng.random_range(0..hot_size)
                } else {
                    self.rng.random_range(hot_size..self.universe)
                }
            },
            Workload::Scan => {
                let key = self.scan_pos;
                self.scan_pos = (self.scan_pos + 1) % self.universe;
                key
            },
            Workload::Zipfian { .. } => {
                let sample: f64 = match &self.zipf {
                    Some(zipf) => zipf.sample(&mut self.rng),
                    None => 1.0,
                };
                (sample as u64).saturating_sub(1).min(self.universe - 1)
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HitRate {
    pub hits: u64,
    pub misses: u64,
}

impl HitRate {
    pub fn hit_rate(self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Runs a read-through workload: `get`, then `put` on a miss.
pub fn run_hit_rate(
    cache: &mut LfuCache<u64, u64>,
    generator: &mut WorkloadGenerator,
    operations: usize,
) -> HitRate {
    let mut stats = HitRate::default();

    for _ in 0..operations {
        let key = generator.next_key();
        if cache.get(&key).is_ok() {
            stats.hits += 1;
        } else {
            stats.misses += 1;
            cache.put(key, key);
        }
    }

    stats
}
