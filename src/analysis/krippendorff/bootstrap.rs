//! Monte-Carlo distribution of alpha.
//!
//! Follows Krippendorff's bootstrap for alpha (Hayes & Krippendorff 2007):
//! each resample draws `M` pairable value pairs from the coincidence table
//! and lowers a running alpha by each pair's share of the expected
//! disagreement. The "fourth step" then removes deterministic samples of
//! exactly 1 that the draw produces when a value is only ever paired with
//! itself.

use std::time::{Duration, Instant};

use rand::Rng;
use tracing::{debug, warn};

use super::tables::CoincidenceTables;
use crate::error::{IrrError, Result};
use crate::statistics::{
    central_interval_sorted, count_below_sorted, resample_rng, sort_samples, CumulativeTable, Histogram,
};

/// Resamples drawn between deadline checks and progress reports.
const GROUP_SIZE: usize = 1000;

/// Resampling parameters.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ResamplePlan {
    pub resamples: usize,
    pub observers: usize,
    pub seed: u64,
    pub deadline: Option<Duration>,
}

/// Sorted bootstrap samples of alpha after the fourth-step correction.
#[derive(Debug, Clone)]
pub struct BootstrapDistribution {
    samples: Vec<f64>,
    requested: usize,
    completed: usize,
    removed: usize,
    depth: usize,
    histogram: Histogram,
}

impl BootstrapDistribution {
    /// Draw the distribution for `tables`.
    ///
    /// # Errors
    ///
    /// Fails when more than two values have a positive diagonal
    /// coincidence, before any resample is drawn.
    pub(crate) fn generate(
        tables: &CoincidenceTables,
        plan: ResamplePlan,
        progress: &mut dyn FnMut(usize, usize),
    ) -> Result<Self> {
        let positive_diagonals = tables.positive_diagonals();
        if positive_diagonals > 2 {
            return Err(IrrError::BootstrapInvariant { positive_diagonals });
        }

        let depth = resample_depth(tables, plan.observers);
        let scale = depth as f64 * tables.expected_disagreement();
        let cumulative = CumulativeTable::new(tables.coincidences(), tables.n_total());
        let delta: Vec<f64> = (0..cumulative.len())
            .map(|flat| tables.delta()[cumulative.cell(flat)])
            .collect();

        debug!(
            resamples = plan.resamples,
            depth,
            cells = cumulative.len(),
            "bootstrapping alpha"
        );

        let start = Instant::now();
        let mut samples = Vec::with_capacity(plan.resamples);
        while samples.len() < plan.resamples {
            if let Some(limit) = plan.deadline {
                if start.elapsed() >= limit {
                    warn!(
                        completed = samples.len(),
                        requested = plan.resamples,
                        "bootstrap deadline reached"
                    );
                    break;
                }
            }

            let group_end = (samples.len() + GROUP_SIZE).min(plan.resamples);
            for i in samples.len()..group_end {
                let mut rng = resample_rng(plan.seed, i as u64);
                let mut alpha = 1.0;
                for _ in 0..depth {
                    let r: f64 = rng.random();
                    alpha -= delta[cumulative.locate(r)] / scale;
                }
                samples.push(alpha);
            }

            progress(samples.len(), plan.resamples);
            debug!(done = samples.len(), total = plan.resamples, "bootstrap progress");
        }

        let completed = samples.len();
        sort_samples(&mut samples);
        let removed = fourth_step(&mut samples, tables, depth)?;
        let histogram = Histogram::from_samples(&samples);

        debug!(completed, removed, retained = samples.len(), "bootstrap finished");

        Ok(Self {
            samples,
            requested: plan.resamples,
            completed,
            removed,
            depth,
            histogram,
        })
    }

    /// Retained samples, ascending.
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// Resamples asked for.
    pub fn requested(&self) -> usize {
        self.requested
    }

    /// Resamples actually drawn; fewer than requested after a deadline.
    pub fn completed(&self) -> usize {
        self.completed
    }

    /// Samples dropped by the fourth-step correction.
    pub fn removed(&self) -> usize {
        self.removed
    }

    /// Samples the interval and p-values are computed from.
    pub fn effective_count(&self) -> usize {
        self.samples.len()
    }

    /// Pairs drawn per resample (`M`).
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Whether a deadline cut the run short.
    pub fn is_truncated(&self) -> bool {
        self.completed < self.requested
    }

    /// Histogram of the retained samples.
    pub fn histogram(&self) -> &Histogram {
        &self.histogram
    }

    /// Central interval holding `level` of the retained samples.
    pub fn interval(&self, level: f64) -> (f64, f64) {
        central_interval_sorted(&self.samples, level)
    }

    /// Share of retained samples strictly below `min_value`; NaN when
    /// nothing was retained.
    pub fn p_value(&self, min_value: f64) -> f64 {
        count_below_sorted(&self.samples, min_value) as f64 / self.samples.len() as f64
    }
}

/// `M = min(25·Q, n·(m − 1)/2)`, at least 1.
fn resample_depth(tables: &CoincidenceTables, observers: usize) -> usize {
    let q = tables.positive_cells();
    let n = tables.n_total().round() as usize;
    (25 * q).min(n * observers.saturating_sub(1) / 2).max(1)
}

/// Drop the deterministic top samples; returns how many were removed.
///
/// `samples` must be sorted ascending.
fn fourth_step(samples: &mut Vec<f64>, tables: &CoincidenceTables, depth: usize) -> Result<usize> {
    let before = samples.len();
    match tables.positive_diagonals() {
        0 => {}
        1 => {
            let keep = samples.partition_point(|&x| x < 1.0);
            samples.truncate(keep);
        }
        2 => {
            let n = tables.n_total();
            let chance: f64 = tables
                .coincidences()
                .diagonal()
                .iter()
                .map(|&o| (o / n).powf(depth as f64))
                .sum();
            let target = (before as f64 * chance).round() as usize;
            let keep = samples.partition_point(|&x| x < 1.0).max(before.saturating_sub(target));
            samples.truncate(keep);
        }
        positive_diagonals => return Err(IrrError::BootstrapInvariant { positive_diagonals }),
    }
    Ok(before - samples.len())
}
