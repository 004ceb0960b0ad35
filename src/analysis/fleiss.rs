//! Fleiss' kappa for a fixed number of observers per unit.
//!
//! The statistic follows Fleiss (1971). The variance in that paper is
//! incorrect (Fleiss, Nee & Landis 1979), and the corrected formula only
//! holds under the null hypothesis kappa = 0. For intervals and tests
//! against arbitrary thresholds the Gwet (2008) per-unit variance is used
//! instead, or no variance at all when configured so.

use std::fmt;

use tracing::debug;

use super::{normal_interval, normal_p_value, sample_size_advisories, Advisory, ReliabilityStatistic, KAPPA_THRESHOLDS};
use crate::config::FleissVariance;
use crate::error::Result;
use crate::matrix::ObservationMatrix;
use crate::result::{ConfidenceInterval, PValue};

/// Fleiss' kappa over the fully-observed units of a matrix.
#[derive(Debug, Clone)]
pub struct FleissKappa {
    variable: String,
    /// Retained units.
    units: usize,
    /// Observers per unit.
    raters: usize,
    observed_agreement: f64,
    chance_agreement: f64,
    value: f64,
    variance: Option<f64>,
    small_sample_threshold: usize,
}

impl FleissKappa {
    /// Compute kappa with the Gwet variance.
    pub fn new(matrix: &ObservationMatrix) -> Self {
        Self::with_variance(matrix, FleissVariance::Gwet)
    }

    /// Compute kappa, choosing the variance estimator.
    ///
    /// Units with any missing observation are discarded.
    pub fn with_variance(matrix: &ObservationMatrix, estimator: FleissVariance) -> Self {
        let k = matrix.value_count();
        let n = matrix.observer_count();

        // n_ij: per retained unit, how many observers chose value j.
        let counts: Vec<Vec<usize>> = matrix
            .rows()
            .filter(|row| row.iter().all(Option::is_some))
            .map(|row| {
                let mut per_value = vec![0usize; k];
                for j in row.iter().flatten() {
                    per_value[*j] += 1;
                }
                per_value
            })
            .collect();
        let big_n = counts.len();

        let nf = n as f64;
        let big_nf = big_n as f64;

        let sum_sq: f64 = counts
            .iter()
            .flat_map(|unit| unit.iter())
            .map(|&c| (c * c) as f64)
            .sum();
        let observed_agreement = (sum_sq - big_nf * nf) / (big_nf * nf * (nf - 1.0));

        let proportions: Vec<f64> = (0..k)
            .map(|j| counts.iter().map(|unit| unit[j]).sum::<usize>() as f64 / (nf * big_nf))
            .collect();
        let chance_agreement: f64 = proportions.iter().map(|p| p * p).sum();

        let value = (observed_agreement - chance_agreement) / (1.0 - chance_agreement);

        let variance = match estimator {
            FleissVariance::Gwet => Some(gwet_variance(&counts, &proportions, n, chance_agreement, value)),
            FleissVariance::Disabled => None,
        };

        debug!(
            variable = matrix.variable(),
            units = big_n,
            raters = n,
            p_bar = observed_agreement,
            p_e = chance_agreement,
            kappa = value,
            "fleiss' kappa"
        );

        Self {
            variable: matrix.variable().to_string(),
            units: big_n,
            raters: n,
            observed_agreement,
            chance_agreement,
            value,
            variance,
            small_sample_threshold: 30,
        }
    }

    /// Set the unit count below which a small-sample advisory is raised.
    pub fn with_small_sample_threshold(mut self, threshold: usize) -> Self {
        self.small_sample_threshold = threshold;
        self
    }

    /// Variance of the estimate, if an estimator is configured.
    pub fn variance(&self) -> Option<f64> {
        self.variance
    }

    /// Fully-observed units that contributed.
    pub fn retained_units(&self) -> usize {
        self.units
    }

    /// Mean pairwise agreement within units (P̄).
    pub fn observed_agreement(&self) -> f64 {
        self.observed_agreement
    }

    /// Agreement expected by chance (Pₑ).
    pub fn chance_agreement(&self) -> f64 {
        self.chance_agreement
    }
}

/// Gwet (2008) variance: `Σ (g*_i − κ)² / (N (N − 1))`.
fn gwet_variance(counts: &[Vec<usize>], proportions: &[f64], n: usize, pe: f64, kappa: f64) -> f64 {
    let big_n = counts.len() as f64;
    let nf = n as f64;

    let sum: f64 = counts
        .iter()
        .map(|unit| {
            let pa_i: f64 = unit
                .iter()
                .map(|&c| (c as f64) * (c as f64 - 1.0) / (nf * (nf - 1.0)))
                .sum();
            let pe_i: f64 = unit
                .iter()
                .zip(proportions)
                .map(|(&c, &p)| c as f64 / nf * p)
                .sum();
            let g_i = (pa_i - pe) / (1.0 - pe);
            let g_star = g_i - 2.0 * (1.0 - kappa) * (pe_i - pe) / (1.0 - pe);
            (g_star - kappa) * (g_star - kappa)
        })
        .sum();

    sum / (big_n * (big_n - 1.0))
}

impl ReliabilityStatistic for FleissKappa {
    fn name(&self) -> &'static str {
        "Fleiss' kappa"
    }

    fn letter(&self) -> &'static str {
        "κ"
    }

    fn variable(&self) -> &str {
        &self.variable
    }

    fn threshold_values(&self) -> &'static [f64] {
        &KAPPA_THRESHOLDS
    }

    fn point_estimate(&self) -> f64 {
        self.value
    }

    fn confidence_interval(&self, level: f64) -> Result<ConfidenceInterval> {
        match self.variance {
            Some(variance) => normal_interval(self.value, variance.sqrt(), level),
            None => {
                // Still validate the level so callers see the same errors.
                crate::statistics::two_sided_critical(level)?;
                Ok(ConfidenceInterval::not_implemented(level))
            }
        }
    }

    fn p_value(&self, min_value: f64) -> PValue {
        match self.variance {
            Some(variance) => normal_p_value(self.value, variance.sqrt(), min_value),
            None => PValue::not_implemented(),
        }
    }

    fn advisories(&self) -> Vec<Advisory> {
        sample_size_advisories(self.name(), self.units, None, self.small_sample_threshold)
    }

    fn write_supplementary(&self, w: &mut dyn fmt::Write) -> fmt::Result {
        match self.variance {
            Some(variance) => writeln!(w, "variance = {:.5}", variance)?,
            None => writeln!(w, "variance = not implemented")?,
        }
        writeln!(w, "n = {} units x {} observers", self.units, self.raters)?;
        writeln!(w, "P = {:.5}, Pe = {:.5}", self.observed_agreement, self.chance_agreement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::matrix_from_rows;
    use crate::result::InferenceKind;
    use crate::types::Scale;

    /// Fleiss (1971)-style table: rows are units, entries observer labels.
    fn matrix(rows: &[&[&str]]) -> ObservationMatrix {
        let observers: Vec<String> = (0..rows[0].len()).map(|i| format!("o{}", i)).collect();
        let observers: Vec<&str> = observers.iter().map(String::as_str).collect();
        let units: Vec<String> = (0..rows.len()).map(|i| format!("u{}", i)).collect();
        let rows: Vec<(&str, &[&str])> = units.iter().map(String::as_str).zip(rows.iter().copied()).collect();
        matrix_from_rows("v", &observers, Scale::Nominal, &rows).unwrap()
    }

    #[test]
    fn test_perfect_agreement_is_one() {
        let m = matrix(&[&["a", "a", "a"], &["b", "b", "b"], &["a", "a", "a"]]);
        let kappa = FleissKappa::new(&m);
        assert_eq!(kappa.point_estimate(), 1.0);
    }

    #[test]
    fn test_single_value_everywhere_is_nan() {
        let m = matrix(&[&["a", "a", "a"], &["a", "a", "a"], &["a", "a", "a"]]);
        let kappa = FleissKappa::new(&m);
        assert_eq!(kappa.chance_agreement(), 1.0);
        assert!(kappa.point_estimate().is_nan());
        assert!(kappa.p_value(0.5).p.is_nan());
    }

    #[test]
    fn test_units_with_missing_discarded() {
        let m = matrix(&[&["a", "a", "a"], &["b", "", "b"], &["b", "b", "b"], &["a", "b", "a"]]);
        let kappa = FleissKappa::new(&m);
        assert_eq!(kappa.retained_units(), 3);
    }

    #[test]
    fn test_known_value() {
        // Two raters, four units: (a,a), (a,b), (b,b), (b,b).
        // Σ n_ij² = 4 + 2 + 4 + 4 = 14, so P̄ = (14 - 8) / (4·2·1) = 0.75.
        // p_a = 3/8, p_b = 5/8,
        // Pe = 9/64 + 25/64 = 34/64; kappa = (0.75 - 0.53125)/(0.46875).
        let m = matrix(&[&["a", "a"], &["a", "b"], &["b", "b"], &["b", "b"]]);
        let kappa = FleissKappa::new(&m);
        let expected = (0.75 - 34.0 / 64.0) / (1.0 - 34.0 / 64.0);
        assert!((kappa.point_estimate() - expected).abs() < 1e-12);
        assert!((kappa.observed_agreement() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_gwet_interval_available() {
        let m = matrix(&[
            &["a", "a", "b"],
            &["b", "b", "b"],
            &["a", "a", "a"],
            &["c", "c", "b"],
            &["c", "c", "c"],
            &["a", "b", "a"],
        ]);
        let kappa = FleissKappa::new(&m);
        let variance = kappa.variance().unwrap();
        assert!(variance > 0.0 && variance.is_finite());

        let ci = kappa.confidence_interval(0.95).unwrap();
        assert_eq!(ci.kind, InferenceKind::Asymptotic);
        assert!(ci.contains(kappa.point_estimate()));
        assert!(ci.lower >= -1.0 && ci.upper <= 1.0);

        let p = kappa.p_value(0.0);
        assert!(p.is_implemented());
        assert!((0.0..=1.0).contains(&p.p));
    }

    #[test]
    fn test_disabled_variance_reports_not_implemented() {
        let m = matrix(&[&["a", "a"], &["a", "b"], &["b", "b"], &["b", "b"]]);
        let kappa = FleissKappa::with_variance(&m, FleissVariance::Disabled);

        assert!(!kappa.point_estimate().is_nan());
        let ci = kappa.confidence_interval(0.95).unwrap();
        assert!(!ci.is_implemented());
        assert_eq!(ci.note.as_deref(), Some("not implemented"));

        let p = kappa.p_value(0.5);
        assert!(!p.is_implemented());
        assert!(p.p.is_nan());

        assert!(kappa.confidence_interval(1.5).is_err());
    }

    #[test]
    fn test_small_sample_advisory() {
        let m = matrix(&[&["a", "a"], &["a", "b"], &["b", "b"]]);
        let kappa = FleissKappa::new(&m);
        assert!(matches!(kappa.advisories()[0], Advisory::FewUnits { units: 3, .. }));
    }
}
