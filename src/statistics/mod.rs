//! Numerical building blocks shared by the reliability coefficients.
//!
//! - Standard normal distribution and quantile function
//! - Quantiles and rank counts over sorted bootstrap samples
//! - Counter-seeded resampling through cumulative tables
//! - Histograms of coefficient distributions

mod bootstrap;
mod histogram;
mod normal;
mod quantile;

pub use bootstrap::{counter_rng_seed, resample_rng, CumulativeTable};
pub use histogram::{Histogram, BINS};
pub use normal::{cdf, inverse_cdf, two_sided_critical, upper_tail};
pub use quantile::{central_interval_sorted, count_below_sorted, quantile_sorted, sort_samples};
