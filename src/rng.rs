//! Random sources for the simulation
//!
//! The step never reaches for a global RNG. Callers pass a `RandomSource`,
//! normally a seeded [`SimRng`]; tests use [`ScriptedRandom`] to pin every
//! roll.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Source of uniform samples in `[0, 1)`
pub trait RandomSource {
    fn next_f32(&mut self) -> f32;

    /// True with probability `p`
    fn chance(&mut self, p: f32) -> bool {
        self.next_f32() < p
    }

    fn coin(&mut self) -> bool {
        self.chance(0.5)
    }

    /// Uniform float in `[lo, hi)`
    fn range_f32(&mut self, lo: f32, hi: f32) -> f32 {
        lo + (hi - lo) * self.next_f32()
    }

    /// Uniform integer in `[lo, hi]`
    fn range_i32(&mut self, lo: i32, hi: i32) -> i32 {
        if hi <= lo {
            return lo;
        }
        let width = i64::from(hi) - i64::from(lo);
        let offset = (f64::from(self.next_f32()) * (width + 1) as f64).floor() as i64;
        (i64::from(lo) + offset.clamp(0, width)) as i32
    }
}

/// Seeded PCG32 generator
#[derive(Debug, Clone)]
pub struct SimRng {
    seed: u64,
    inner: Pcg32,
}

impl SimRng {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            inner: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl RandomSource for SimRng {
    fn next_f32(&mut self) -> f32 {
        self.inner.random::<f32>()
    }

    fn range_i32(&mut self, lo: i32, hi: i32) -> i32 {
        if hi <= lo {
            return lo;
        }
        self.inner.random_range(lo..=hi)
    }
}

/// Replays a fixed cycle of samples
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    values: Vec<f32>,
    cursor: usize,
}

impl ScriptedRandom {
    /// Cycle through `values`; an empty list behaves like a constant 0.5
    pub fn new(values: Vec<f32>) -> Self {
        Self { values, cursor: 0 }
    }

    /// Always returns `value`
    pub fn constant(value: f32) -> Self {
        Self::new(vec![value])
    }
}

impl RandomSource for ScriptedRandom {
    fn next_f32(&mut self) -> f32 {
        if self.values.is_empty() {
            return 0.5;
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value.clamp(0.0, 0.999_999)
    }
}
