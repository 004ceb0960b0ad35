//! Resampling primitives for the Monte-Carlo coefficient distribution.
//!
//! Each resample draws uniform variates and maps them through the
//! cumulative distribution of a flattened table, picking one cell per draw.

use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::types::Table;

/// Counter-based RNG seed generation using SplitMix64.
///
/// Stateless PRF giving well-distributed seeds from a base seed and a
/// counter, so resample `i` is reproducible regardless of how the loop is
/// grouped or interrupted.
#[inline]
pub fn counter_rng_seed(base_seed: u64, counter: u64) -> u64 {
    // SplitMix64: https://xoshiro.di.unimi.it/splitmix64.c
    let mut z = base_seed.wrapping_add(counter.wrapping_mul(0x9e3779b97f4a7c15));
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
    z ^ (z >> 31)
}

/// Generator for resample number `counter`.
pub fn resample_rng(base_seed: u64, counter: u64) -> Xoshiro256PlusPlus {
    Xoshiro256PlusPlus::seed_from_u64(counter_rng_seed(base_seed, counter))
}

/// Cumulative proportions over a table flattened row by row.
///
/// Cell `(c, k)` has flat index `c * cols + k`; the canonical draw order
/// walks rows first, matching how the table is read.
#[derive(Debug, Clone)]
pub struct CumulativeTable {
    cumulative: Vec<f64>,
    cols: usize,
}

impl CumulativeTable {
    /// Build cumulative proportions of `table`, each prefix sum divided by
    /// `total`.
    pub fn new(table: &Table, total: f64) -> Self {
        let (rows, cols) = table.shape();
        let mut cumulative = Vec::with_capacity(rows * cols);
        let mut sum = 0.0;
        for c in 0..rows {
            for k in 0..cols {
                sum += table[(c, k)];
                cumulative.push(sum / total);
            }
        }
        Self { cumulative, cols }
    }

    /// Number of flattened cells.
    pub fn len(&self) -> usize {
        self.cumulative.len()
    }

    /// True for a table without cells.
    pub fn is_empty(&self) -> bool {
        self.cumulative.is_empty()
    }

    /// Smallest flat index whose cumulative proportion reaches `r`.
    ///
    /// Rounding can leave the final proportion a hair below 1; draws beyond
    /// it land on the last cell that carries mass.
    pub fn locate(&self, r: f64) -> usize {
        let idx = self.cumulative.partition_point(|&c| c < r);
        if idx < self.cumulative.len() {
            return idx;
        }
        self.last_with_mass()
    }

    /// Row and column of a flat index.
    pub fn cell(&self, flat: usize) -> (usize, usize) {
        (flat / self.cols, flat % self.cols)
    }

    fn last_with_mass(&self) -> usize {
        let mut prev_total = 0.0;
        let mut last = 0;
        for (i, &c) in self.cumulative.iter().enumerate() {
            if c > prev_total {
                last = i;
            }
            prev_total = c;
        }
        last
    }
}
