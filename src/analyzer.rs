//! Runs every reliability coefficient over one variable.

use std::time::Duration;

use tracing::info;

use crate::analysis::{CohenKappa, FleissKappa, KrippendorffAlpha, ReliabilityStatistic};
use crate::config::{Config, FleissVariance};
use crate::error::Result;
use crate::matrix::ObservationMatrix;
use crate::result::VariableReport;

/// Reliability analysis with a builder-style configuration.
///
/// # Example
///
/// ```
/// use irr::{matrix_from_rows, Analyzer, Scale};
///
/// let matrix = matrix_from_rows(
///     "relevance",
///     &["r1", "r2", "r3"],
///     Scale::Nominal,
///     &[
///         ("doc1", &["yes", "yes", "yes"]),
///         ("doc2", &["no", "no", "yes"]),
///         ("doc3", &["no", "no", "no"]),
///     ],
/// )
/// .unwrap();
///
/// let report = Analyzer::quick().seed(1).analyze(&matrix).unwrap();
/// // alpha, Fleiss' kappa, then Cohen's kappa for three observer pairs
/// assert_eq!(report.statistics.len(), 5);
/// ```
#[derive(Debug, Clone)]
pub struct Analyzer {
    config: Config,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer {
    /// Create with default configuration.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Create with fast configuration for exploration and tests.
    ///
    /// Settings:
    /// - 2,000 resamples (vs 20,000 default)
    pub fn quick() -> Self {
        Self {
            config: Config {
                resamples: 2_000,
                ..Config::default()
            },
        }
    }

    /// Create from an existing configuration.
    pub fn with_config(config: Config) -> Self {
        Self { config }
    }

    /// Set bootstrap resamples for alpha; zero disables bootstrapping.
    pub fn resamples(mut self, n: usize) -> Self {
        self.config.resamples = n;
        self
    }

    /// Set deterministic bootstrap seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Set the confidence levels reported for every statistic.
    pub fn confidence_levels(mut self, levels: impl Into<Vec<f64>>) -> Self {
        self.config.confidence_levels = levels.into();
        self
    }

    /// Set the variance estimator for Fleiss' kappa.
    pub fn fleiss_variance(mut self, variance: FleissVariance) -> Self {
        self.config.fleiss_variance = variance;
        self
    }

    /// Set the unit count below which advisories are raised.
    pub fn small_sample_threshold(mut self, threshold: usize) -> Self {
        self.config.small_sample_threshold = threshold;
        self
    }

    /// Set maximum bootstrap duration guardrail (milliseconds).
    pub fn max_duration_ms(mut self, ms: u64) -> Self {
        self.config.max_duration_ms = Some(ms);
        self
    }

    /// Get the current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Analyse one variable: alpha, Fleiss' kappa, then Cohen's kappa for
    /// every observer pair.
    ///
    /// # Errors
    ///
    /// Propagates the first statistic that fails (unsupported scale,
    /// bootstrap invariant, invalid confidence level). Nothing is reported
    /// for the variable in that case.
    pub fn analyze(&self, matrix: &ObservationMatrix) -> Result<VariableReport> {
        let config = &self.config;
        let levels = &config.confidence_levels;
        info!(
            variable = matrix.variable(),
            units = matrix.unit_count(),
            observers = matrix.observer_count(),
            values = matrix.value_count(),
            "analysing variable"
        );

        let mut statistics = Vec::new();

        let mut alpha = KrippendorffAlpha::builder(matrix)
            .resamples(config.resamples)
            .small_sample_threshold(config.small_sample_threshold);
        if let Some(seed) = config.seed {
            alpha = alpha.seed(seed);
        }
        if let Some(ms) = config.max_duration_ms {
            alpha = alpha.max_duration(Duration::from_millis(ms));
        }
        statistics.push(alpha.build()?.report(levels)?);

        let fleiss = FleissKappa::with_variance(matrix, config.fleiss_variance)
            .with_small_sample_threshold(config.small_sample_threshold);
        statistics.push(fleiss.report(levels)?);

        let m = matrix.observer_count();
        for a in 0..m {
            for b in (a + 1)..m {
                let cohen = CohenKappa::new(matrix, a, b)?
                    .with_small_sample_threshold(config.small_sample_threshold);
                statistics.push(cohen.report(levels)?);
            }
        }

        info!(
            variable = matrix.variable(),
            statistics = statistics.len(),
            "variable analysed"
        );

        Ok(VariableReport {
            variable: matrix.variable().to_string(),
            scale: matrix.scale().kind(),
            units: matrix.unit_count(),
            observers: matrix.observers().to_vec(),
            statistics,
        })
    }
}
