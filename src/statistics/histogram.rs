//! Fixed-width histogram of coefficient values over [-1, 1].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of bins, each 0.1 wide.
pub const BINS: usize = 20;

/// Histogram of a coefficient distribution in tenths.
///
/// Bin `i` covers `(-1.0 + 0.1 i, -0.9 + 0.1 i]`; the first bin is closed on
/// the left and also collects anything below -1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    counts: [usize; BINS],
    total: usize,
}

impl Histogram {
    /// Bin the finite values of `samples`, ignoring NaN.
    pub fn from_samples(samples: &[f64]) -> Self {
        let mut counts = [0usize; BINS];
        let mut total = 0;
        for &x in samples.iter().filter(|x| !x.is_nan()) {
            counts[bin_of(x)] += 1;
            total += 1;
        }
        Self { counts, total }
    }

    /// Count in bin `i`.
    pub fn count(&self, i: usize) -> usize {
        self.counts[i]
    }

    /// Total binned samples.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Proportion in bin `i`; NaN when empty.
    pub fn proportion(&self, i: usize) -> f64 {
        self.counts[i] as f64 / self.total as f64
    }

    /// Upper edge of bin `i`.
    pub fn upper_edge(i: usize) -> f64 {
        (i as f64 - 9.0) / 10.0
    }
}

fn bin_of(x: f64) -> usize {
    // Bin upper edges are -0.9, -0.8, ..., 1.0. The nudge keeps values such
    // as 0.3 (3.0000000000000004 tenths) on their own edge.
    let tenths = (x * 10.0 - 1e-9).ceil();
    let idx = tenths + 9.0;
    idx.clamp(0.0, (BINS - 1) as f64) as usize
}

impl fmt::Display for Histogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..BINS {
            let upper = Self::upper_edge(i);
            let open = if i == 0 { '[' } else { ']' };
            write!(f, "{}{:>4.1}, {:>4.1}] ", open, upper - 0.1, upper)?;
            let p = self.proportion(i);
            if p >= 0.01 {
                let stars = (p * 60.0).ceil() as usize;
                write!(f, "{} {:4.2}", "*".repeat(stars), p)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
