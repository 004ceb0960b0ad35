//! Cohen's kappa for one pair of observers.
//!
//! References:
//! - Cohen (1960), A Coefficient of Agreement for Nominal Scales.
//! - Fleiss, Cohen & Everitt (1969), Large Sample Standard Errors of Kappa
//!   and Weighted Kappa, equation 13 (the corrected variance).

use std::fmt;

use tracing::debug;

use super::{normal_interval, normal_p_value, sample_size_advisories, Advisory, ReliabilityStatistic, KAPPA_THRESHOLDS};
use crate::error::{IrrError, Result};
use crate::matrix::ObservationMatrix;
use crate::result::{ConfidenceInterval, PValue};
use crate::types::Table;

/// Cohen's kappa between two observer columns.
#[derive(Debug, Clone)]
pub struct CohenKappa {
    variable: String,
    observer_a: String,
    observer_b: String,
    /// Co-occurrence counts, rows for observer A, columns for observer B.
    contingency: Table,
    /// Units rated by both observers.
    n: usize,
    value: f64,
    variance: f64,
    se: f64,
    small_sample_threshold: usize,
}

impl CohenKappa {
    /// Compute kappa between observer columns `a` and `b` of `matrix`.
    ///
    /// Units where either observer is missing are skipped. With no
    /// remaining units the estimate and variance are NaN.
    ///
    /// # Errors
    ///
    /// Fails if either column index is out of range.
    pub fn new(matrix: &ObservationMatrix, a: usize, b: usize) -> Result<Self> {
        let m = matrix.observer_count();
        for index in [a, b] {
            if index >= m {
                return Err(IrrError::ObserverOutOfRange {
                    index,
                    observers: m,
                });
            }
        }

        let k = matrix.value_count();
        let mut contingency = Table::zeros(k, k);
        let mut n = 0usize;
        for row in matrix.rows() {
            if let (Some(va), Some(vb)) = (row[a], row[b]) {
                contingency[(va, vb)] += 1.0;
                n += 1;
            }
        }

        let (value, variance) = kappa_and_variance(&contingency, n);
        debug!(
            variable = matrix.variable(),
            a = %matrix.observers()[a],
            b = %matrix.observers()[b],
            n,
            kappa = value,
            "cohen's kappa"
        );

        Ok(Self {
            variable: matrix.variable().to_string(),
            observer_a: matrix.observers()[a].clone(),
            observer_b: matrix.observers()[b].clone(),
            contingency,
            n,
            value,
            variance,
            se: variance.sqrt(),
            small_sample_threshold: 30,
        })
    }

    /// Set the unit count below which a small-sample advisory is raised.
    pub fn with_small_sample_threshold(mut self, threshold: usize) -> Self {
        self.small_sample_threshold = threshold;
        self
    }

    /// Large-sample variance of the estimate.
    pub fn variance(&self) -> f64 {
        self.variance
    }

    /// Standard error of the estimate.
    pub fn standard_error(&self) -> f64 {
        self.se
    }

    /// Units rated by both observers.
    pub fn paired_units(&self) -> usize {
        self.n
    }

    /// Co-occurrence table, rows for the first observer.
    pub fn contingency(&self) -> &Table {
        &self.contingency
    }
}

/// Kappa and its Fleiss–Cohen–Everitt variance from a contingency table.
fn kappa_and_variance(table: &Table, n: usize) -> (f64, f64) {
    if n == 0 {
        return (f64::NAN, f64::NAN);
    }
    let nf = n as f64;
    let k = table.nrows();

    let rows: Vec<f64> = (0..k).map(|i| table.row(i).sum()).collect();
    let cols: Vec<f64> = (0..k).map(|j| table.column(j).sum()).collect();

    let f_o: f64 = (0..k).map(|i| table[(i, i)]).sum();
    let f_c: f64 = (0..k).map(|i| rows[i] * cols[i] / nf).sum();
    let value = (f_o - f_c) / (nf - f_c);

    let p_o = f_o / nf;
    let p_c = f_c / nf;

    let diagonal: f64 = (0..k)
        .map(|i| {
            let t = (1.0 - p_c) - (rows[i] / nf + cols[i] / nf) * (1.0 - p_o);
            table[(i, i)] / nf * t * t
        })
        .sum();

    let mut off_diagonal = 0.0;
    for i in 0..k {
        for j in 0..k {
            if i == j {
                continue;
            }
            let t = cols[i] / nf + rows[j] / nf;
            off_diagonal += table[(i, j)] / nf * t * t;
        }
    }
    off_diagonal *= (1.0 - p_o) * (1.0 - p_o);

    let centering = p_o * p_c - 2.0 * p_c + p_o;
    let variance = (diagonal + off_diagonal - centering * centering) / (nf * (1.0 - p_c).powi(4));

    // Rounding can push an exact zero slightly negative.
    let variance = if variance < 0.0 { 0.0 } else { variance };
    (value, variance)
}

impl ReliabilityStatistic for CohenKappa {
    fn name(&self) -> &'static str {
        "Cohen's kappa"
    }

    fn letter(&self) -> &'static str {
        "κ"
    }

    fn variable(&self) -> &str {
        &self.variable
    }

    fn observers(&self) -> Option<(&str, &str)> {
        Some((&self.observer_a, &self.observer_b))
    }

    fn threshold_values(&self) -> &'static [f64] {
        &KAPPA_THRESHOLDS
    }

    fn point_estimate(&self) -> f64 {
        self.value
    }

    fn confidence_interval(&self, level: f64) -> Result<ConfidenceInterval> {
        normal_interval(self.value, self.se, level)
    }

    fn p_value(&self, min_value: f64) -> PValue {
        normal_p_value(self.value, self.se, min_value)
    }

    fn advisories(&self) -> Vec<Advisory> {
        sample_size_advisories(self.name(), self.n, None, self.small_sample_threshold)
    }

    fn write_supplementary(&self, w: &mut dyn fmt::Write) -> fmt::Result {
        writeln!(w, "variance = {:.5}", self.variance)?;
        writeln!(w, "n = {}", self.n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::matrix_from_rows;
    use crate::types::Scale;

    fn two_observers(a: &[&str], b: &[&str]) -> ObservationMatrix {
        let units: Vec<String> = (0..a.len()).map(|i| format!("u{}", i)).collect();
        let cells: Vec<[&str; 2]> = a.iter().zip(b).map(|(x, y)| [*x, *y]).collect();
        let rows: Vec<(&str, &[&str])> = units
            .iter()
            .zip(&cells)
            .map(|(u, c)| (u.as_str(), &c[..]))
            .collect();
        matrix_from_rows("v", &["A", "B"], Scale::Nominal, &rows).unwrap()
    }

    #[test]
    fn test_perfect_agreement_is_one() {
        let m = two_observers(&["x", "y", "x", "z"], &["x", "y", "x", "z"]);
        let kappa = CohenKappa::new(&m, 0, 1).unwrap();
        assert_eq!(kappa.point_estimate(), 1.0);
        assert!(kappa.variance().abs() < 1e-12);
    }

    #[test]
    fn test_one_disagreement_below_one() {
        let m = two_observers(&["A", "A", "A", "A"], &["A", "A", "A", "B"]);
        let kappa = CohenKappa::new(&m, 0, 1).unwrap();
        let v = kappa.point_estimate();
        // Observer A used one value only, so chance agreement equals observed
        // agreement and kappa is exactly 0 here.
        assert!(v < 1.0, "kappa = {}", v);
        assert!(v.abs() < 1e-12);
    }

    #[test]
    fn test_known_value() {
        // Classic 2x2 example: 20 yes/yes, 5 yes/no, 10 no/yes, 15 no/no.
        let mut a = Vec::new();
        let mut b = Vec::new();
        for (x, y, count) in [("y", "y", 20), ("y", "n", 5), ("n", "y", 10), ("n", "n", 15)] {
            for _ in 0..count {
                a.push(x);
                b.push(y);
            }
        }
        let m = two_observers(&a, &b);
        let kappa = CohenKappa::new(&m, 0, 1).unwrap();
        // p_o = 0.7, p_e = 0.5 * 0.6 + 0.5 * 0.4 = 0.5, kappa = 0.4
        assert!((kappa.point_estimate() - 0.4).abs() < 1e-12);
        assert!(kappa.variance() > 0.0);
    }

    #[test]
    fn test_symmetric_in_observers() {
        let m = two_observers(
            &["a", "b", "c", "a", "b", "a", "c", "c"],
            &["a", "b", "a", "a", "c", "b", "c", "a"],
        );
        let ab = CohenKappa::new(&m, 0, 1).unwrap();
        let ba = CohenKappa::new(&m, 1, 0).unwrap();
        assert!((ab.point_estimate() - ba.point_estimate()).abs() < 1e-12);
        assert!((ab.variance() - ba.variance()).abs() < 1e-12);
    }

    #[test]
    fn test_no_paired_units_is_nan() {
        let m = two_observers(&["a", "", "b"], &["", "a", ""]);
        let kappa = CohenKappa::new(&m, 0, 1).unwrap();
        assert_eq!(kappa.paired_units(), 0);
        assert!(kappa.point_estimate().is_nan());
        let ci = kappa.confidence_interval(0.95).unwrap();
        assert!(ci.is_implemented());
        assert!(!ci.is_defined());
        assert!(kappa.p_value(0.5).p.is_nan());
    }

    #[test]
    fn test_interval_brackets_estimate() {
        let m = two_observers(
            &["a", "b", "c", "a", "b", "a", "c", "c", "a", "b"],
            &["a", "b", "a", "a", "c", "b", "c", "c", "a", "b"],
        );
        let kappa = CohenKappa::new(&m, 0, 1).unwrap();
        let ci95 = kappa.confidence_interval(0.95).unwrap();
        let ci99 = kappa.confidence_interval(0.99).unwrap();
        assert!(ci95.contains(kappa.point_estimate()));
        assert!(ci99.lower <= ci95.lower && ci99.upper >= ci95.upper);
        assert!(ci99.lower >= -1.0 && ci99.upper <= 1.0);
    }

    #[test]
    fn test_p_value_decreases_with_threshold() {
        let m = two_observers(
            &["a", "b", "c", "a", "b", "a", "c", "c", "a", "b"],
            &["a", "b", "a", "a", "c", "b", "c", "c", "a", "b"],
        );
        let kappa = CohenKappa::new(&m, 0, 1).unwrap();
        let low = kappa.p_value(0.0).p;
        let high = kappa.p_value(0.9).p;
        assert!(low < high);
        assert_eq!(kappa.p_value(0.0).statistic.unwrap().name, "z");
    }

    #[test]
    fn test_observer_out_of_range() {
        let m = two_observers(&["a"], &["a"]);
        assert!(matches!(
            CohenKappa::new(&m, 0, 2),
            Err(IrrError::ObserverOutOfRange { index: 2, .. })
        ));
    }

    #[test]
    fn test_small_sample_advisory() {
        let m = two_observers(&["a", "b"], &["a", "b"]);
        let kappa = CohenKappa::new(&m, 0, 1).unwrap();
        assert_eq!(kappa.advisories().len(), 1);
        let kappa = kappa.with_small_sample_threshold(2);
        assert!(kappa.advisories().is_empty());
    }
}
