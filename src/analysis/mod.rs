//! Reliability coefficients.
//!
//! Three statistics share the [`ReliabilityStatistic`] interface:
//!
//! 1. **Krippendorff's alpha** ([`krippendorff`]): any number of observers,
//!    missing data allowed, nominal or ordinal scale, bootstrapped inference
//! 2. **Fleiss' kappa** ([`fleiss`]): fixed observer count per unit, only
//!    fully-observed units, asymptotic inference
//! 3. **Cohen's kappa** ([`cohen`]): one pair of observers, asymptotic
//!    inference
//!
//! Advisory checks live in [`diagnostics`].

mod cohen;
mod diagnostics;
mod fleiss;
mod krippendorff;

use std::fmt;

pub use cohen::CohenKappa;
pub use diagnostics::{sample_size_advisories, Advisory};
pub use fleiss::FleissKappa;
pub use krippendorff::{
    AlphaBuilder, BootstrapDistribution, CoincidenceTables, KrippendorffAlpha,
};

use crate::error::Result;
use crate::result::{ConfidenceInterval, InferenceKind, PValue, SignificanceTest, StatisticReport};
use crate::statistics::{two_sided_critical, upper_tail};

/// Thresholds routinely tested for kappa statistics.
pub const KAPPA_THRESHOLDS: [f64; 10] = [0.9, 0.8, 0.7, 0.6, 0.5, 0.4, 0.3, 0.2, 0.1, 0.0];

/// Thresholds routinely tested for alpha, including Krippendorff's 0.667.
pub const ALPHA_THRESHOLDS: [f64; 11] = [0.9, 0.8, 0.7, 0.667, 0.6, 0.5, 0.4, 0.3, 0.2, 0.1, 0.0];

/// Capabilities shared by every reliability coefficient.
pub trait ReliabilityStatistic {
    /// Full name, e.g. "Fleiss' kappa".
    fn name(&self) -> &'static str;

    /// Symbol used in formulas.
    fn letter(&self) -> &'static str;

    /// Variable whose data was analysed.
    fn variable(&self) -> &str;

    /// Observer pair, for pairwise statistics.
    fn observers(&self) -> Option<(&str, &str)> {
        None
    }

    /// Values the coefficient is routinely tested against.
    fn threshold_values(&self) -> &'static [f64];

    /// Point estimate; NaN when undefined for the data.
    fn point_estimate(&self) -> f64;

    /// Confidence interval at `level`.
    ///
    /// # Errors
    ///
    /// Fails when `level` is outside (0, 1).
    fn confidence_interval(&self, level: f64) -> Result<ConfidenceInterval>;

    /// Probability that the true coefficient is at or below `min_value`.
    fn p_value(&self, min_value: f64) -> PValue;

    /// Warnings about the validity of the results.
    fn advisories(&self) -> Vec<Advisory>;

    /// Write supplementary diagnostic tables as plain text.
    fn write_supplementary(&self, w: &mut dyn fmt::Write) -> fmt::Result;

    /// Gather everything into a serialisable report.
    fn report(&self, levels: &[f64]) -> Result<StatisticReport> {
        let intervals = levels
            .iter()
            .map(|&level| self.confidence_interval(level))
            .collect::<Result<Vec<_>>>()?;

        let significance = self
            .threshold_values()
            .iter()
            .map(|&threshold| SignificanceTest {
                threshold,
                p_value: self.p_value(threshold),
            })
            .collect();

        let mut supplementary = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_supplementary(&mut supplementary);

        Ok(StatisticReport {
            name: self.name().to_string(),
            letter: self.letter().to_string(),
            variable: self.variable().to_string(),
            observers: self
                .observers()
                .map(|(a, b)| (a.to_string(), b.to_string())),
            estimate: self.point_estimate(),
            intervals,
            significance,
            advisories: self.advisories(),
            supplementary,
        })
    }
}

/// Clamp to [-1, 1], letting NaN through.
pub(crate) fn clamp_unit(x: f64) -> f64 {
    if x.is_nan() {
        x
    } else {
        x.clamp(-1.0, 1.0)
    }
}

/// Normal-approximation interval `estimate ± z·se`, clamped to [-1, 1].
pub(crate) fn normal_interval(estimate: f64, se: f64, level: f64) -> Result<ConfidenceInterval> {
    let z = two_sided_critical(level)?;
    Ok(ConfidenceInterval::new(
        level,
        clamp_unit(estimate - z * se),
        clamp_unit(estimate + z * se),
        InferenceKind::Asymptotic,
    ))
}

/// Upper-tail p-value for `estimate` against `min_value`.
pub(crate) fn normal_p_value(estimate: f64, se: f64, min_value: f64) -> PValue {
    let z = (estimate - min_value) / se;
    PValue::upper_tail(upper_tail(z), z)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_unit_keeps_nan() {
        assert!(clamp_unit(f64::NAN).is_nan());
        assert_eq!(clamp_unit(1.4), 1.0);
        assert_eq!(clamp_unit(-1.4), -1.0);
        assert_eq!(clamp_unit(0.3), 0.3);
    }

    #[test]
    fn test_normal_interval_symmetric() {
        let ci = normal_interval(0.5, 0.1, 0.95).unwrap();
        assert!((ci.lower - (0.5 - 0.195_996_398_454)).abs() < 1e-9);
        assert!((ci.upper - (0.5 + 0.195_996_398_454)).abs() < 1e-9);
        assert_eq!(ci.kind, InferenceKind::Asymptotic);
    }

    #[test]
    fn test_normal_interval_rejects_bad_level() {
        assert!(normal_interval(0.5, 0.1, 1.2).is_err());
    }

    #[test]
    fn test_normal_p_value() {
        // Estimate exactly at the threshold: half the mass lies below.
        let p = normal_p_value(0.6, 0.1, 0.6);
        assert!((p.p - 0.5).abs() < 1e-12);

        // Zero standard error: certain when above, undefined at the threshold.
        assert_eq!(normal_p_value(1.0, 0.0, 0.8).p, 0.0);
        assert!(normal_p_value(0.8, 0.0, 0.8).p.is_nan());
    }
}
