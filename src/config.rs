//! Configuration for reliability analysis.

use serde::{Deserialize, Serialize};

/// Configuration options for [`Analyzer`](crate::Analyzer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Bootstrap resamples for Krippendorff's alpha (default: 20,000).
    /// Zero disables bootstrapping; intervals and p-values are then NaN.
    pub resamples: usize,

    /// Confidence levels at which intervals are reported (default: 0.95, 0.99).
    pub confidence_levels: Vec<f64>,

    /// Optional deterministic seed for the bootstrap.
    pub seed: Option<u64>,

    /// Unit count below which results carry a small-sample advisory
    /// (default: 30).
    pub small_sample_threshold: usize,

    /// Variance estimator for Fleiss' kappa (default: Gwet).
    pub fleiss_variance: FleissVariance,

    /// Optional guardrail for bootstrap duration in milliseconds.
    pub max_duration_ms: Option<u64>,
}

/// Variance estimator used for Fleiss' kappa inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FleissVariance {
    /// Gwet (2008) per-unit variance, valid away from the null hypothesis.
    #[default]
    Gwet,

    /// No variance: intervals and p-values report "not implemented".
    Disabled,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            resamples: 20_000,
            confidence_levels: vec![0.95, 0.99],
            seed: None,
            small_sample_threshold: 30,
            fleiss_variance: FleissVariance::Gwet,
            max_duration_ms: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.resamples, 20_000);
        assert_eq!(config.confidence_levels, vec![0.95, 0.99]);
        assert_eq!(config.small_sample_threshold, 30);
        assert_eq!(config.fleiss_variance, FleissVariance::Gwet);
        assert!(config.seed.is_none());
        assert!(config.max_duration_ms.is_none());
    }
}
