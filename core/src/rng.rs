//! Seeded random number generation.
//!
//! RULE: Nothing in the simulation may call any platform RNG.
//! All randomness flows through the single SimRng owned by the engine,
//! seeded once per process run. Reproducibility across runs is not a
//! contract, but the same seed and the same command sequence produce the
//! same league within a build.

use rand::seq::SliceRandom;
use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;
use std::f64::consts::PI;

/// The engine-wide random stream.
pub struct SimRng {
    inner: Pcg64Mcg,
}

impl SimRng {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: Pcg64Mcg::seed_from_u64(seed),
        }
    }

    /// Roll a float in the open interval (0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        ((bits >> 11) as f64 + 0.5) * (1.0 / (1u64 << 53) as f64)
    }

    /// Draw a raw u64 (full range).
    pub fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }

    /// Roll an integer in [lo, hi].
    pub fn range_inclusive(&mut self, lo: u32, hi: u32) -> u32 {
        debug_assert!(lo <= hi);
        lo + self.next_u64_below(u64::from(hi - lo) + 1) as u32
    }

    /// Uniform index into a non-empty collection of `len` items.
    pub fn pick_index(&mut self, len: usize) -> usize {
        self.next_u64_below(len as u64) as usize
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Normal deviate via Box–Muller (two uniforms, one deviate).
    pub fn normal(&mut self, mean: f64, sigma: f64) -> f64 {
        let u = self.next_f64();
        let v = self.next_f64();
        (-2.0 * u.ln()).sqrt() * (2.0 * PI * v).cos() * sigma + mean
    }

    /// Poisson sample by the multiplicative method.
    /// Always returns k >= 0; a non-positive lambda yields 0.
    pub fn poisson(&mut self, lambda: f64) -> u32 {
        let limit = (-lambda).exp();
        let mut k: u32 = 0;
        let mut p = 1.0;
        loop {
            k += 1;
            p *= self.next_f64();
            if p <= limit {
                break;
            }
        }
        k - 1
    }

    /// Shuffle a slice in place.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.inner);
    }
}

/// Prefix-sum sampler over a fixed set of non-negative weights.
///
/// Draw one uniform scaled to the total and locate the interval that
/// contains it. Zero-weight entries are never picked unless every weight
/// is zero, in which case the pick is uniform.
#[derive(Debug, Clone)]
pub struct CumulativeWeights {
    prefix: Vec<f64>,
}

impl CumulativeWeights {
    pub fn new<I>(weights: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let mut total = 0.0;
        let prefix = weights
            .into_iter()
            .map(|w| {
                if w.is_finite() && w > 0.0 {
                    total += w;
                }
                total
            })
            .collect();
        Self { prefix }
    }

    pub fn len(&self) -> usize {
        self.prefix.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prefix.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.prefix.last().copied().unwrap_or(0.0)
    }

    /// Returns None only when there is nothing to pick from.
    pub fn pick(&self, rng: &mut SimRng) -> Option<usize> {
        if self.prefix.is_empty() {
            return None;
        }
        let total = self.total();
        if total <= 0.0 {
            return Some(rng.pick_index(self.prefix.len()));
        }
        let target = rng.next_f64() * total;
        let idx = self.prefix.partition_point(|&edge| edge < target);
        Some(idx.min(self.prefix.len() - 1))
    }
}
