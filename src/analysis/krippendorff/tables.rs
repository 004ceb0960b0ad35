//! Coincidence, expectation and distance tables for Krippendorff's alpha.
//!
//! Reference: Krippendorff (2004), Content Analysis, chapter 11.

use std::fmt;

use crate::error::{IrrError, Result};
use crate::matrix::ObservationMatrix;
use crate::types::{Scale, ScaleType, Table};

/// The deterministic tabulation behind alpha.
///
/// Every table is square and indexed by value rank: for ordinal data the
/// declared order, otherwise the matrix's label order.
#[derive(Debug, Clone, PartialEq)]
pub struct CoincidenceTables {
    labels: Vec<String>,
    coincidences: Table,
    expected: Table,
    delta: Table,
    value_sums: Vec<f64>,
    n_total: f64,
    pairable_units: usize,
}

impl CoincidenceTables {
    /// Tabulate `matrix` under `scale`.
    ///
    /// # Errors
    ///
    /// Interval scale is rejected. An ordinal order that repeats a label or
    /// misses an observed value is rejected.
    pub fn from_matrix(matrix: &ObservationMatrix, scale: &Scale) -> Result<Self> {
        let (labels, rank) = rank_mapping(matrix, scale)?;
        let k = labels.len();

        let mut coincidences = Table::zeros(k, k);
        let mut pairable_units = 0;
        let mut per_value = vec![0.0f64; k];
        for row in matrix.rows() {
            per_value.iter_mut().for_each(|n| *n = 0.0);
            for v in row.iter().flatten() {
                per_value[rank[*v]] += 1.0;
            }
            let mu: f64 = per_value.iter().sum();
            if mu <= 1.0 {
                continue;
            }
            pairable_units += 1;
            for c in 0..k {
                let nc = per_value[c];
                if nc == 0.0 {
                    continue;
                }
                for kk in 0..k {
                    let nk = if c == kk { per_value[kk] - 1.0 } else { per_value[kk] };
                    coincidences[(c, kk)] += nc * nk / (mu - 1.0);
                }
            }
        }

        let value_sums: Vec<f64> = (0..k).map(|c| coincidences.column(c).sum()).collect();
        let n_total: f64 = value_sums.iter().sum();

        let expected = Table::from_fn(k, k, |c, kk| {
            let same = if c == kk { 1.0 } else { 0.0 };
            value_sums[c] * (value_sums[kk] - same) / (n_total - 1.0)
        });

        let delta = match scale.kind() {
            ScaleType::Ordinal => ordinal_delta(&value_sums),
            _ => Table::from_fn(k, k, |c, kk| if c == kk { 0.0 } else { 1.0 }),
        };

        Ok(Self {
            labels,
            coincidences,
            expected,
            delta,
            value_sums,
            n_total,
            pairable_units,
        })
    }

    /// Value labels in table order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Observed coincidences `o[c][k]`.
    pub fn coincidences(&self) -> &Table {
        &self.coincidences
    }

    /// Expected coincidences `e[c][k]`.
    pub fn expected(&self) -> &Table {
        &self.expected
    }

    /// Squared distances `δ²[c][k]`.
    pub fn delta(&self) -> &Table {
        &self.delta
    }

    /// Marginal totals of the coincidence table.
    pub fn value_sums(&self) -> &[f64] {
        &self.value_sums
    }

    /// Pairable observations: the grand total of the coincidence table.
    pub fn n_total(&self) -> f64 {
        self.n_total
    }

    /// Units with at least two observations.
    pub fn pairable_units(&self) -> usize {
        self.pairable_units
    }

    /// `Σ o·δ² / n`.
    pub fn observed_disagreement(&self) -> f64 {
        self.coincidences.component_mul(&self.delta).sum() / self.n_total
    }

    /// `Σ e·δ² / n`.
    pub fn expected_disagreement(&self) -> f64 {
        self.expected.component_mul(&self.delta).sum() / self.n_total
    }

    /// `1 − Dₒ/Dₑ`, NaN when the expected disagreement is zero.
    pub fn alpha(&self) -> f64 {
        let de = self.expected_disagreement();
        if de == 0.0 || !de.is_finite() {
            return f64::NAN;
        }
        1.0 - self.observed_disagreement() / de
    }

    /// Value pairs, diagonal included, with a positive coincidence entry.
    pub fn positive_cells(&self) -> usize {
        self.coincidences.iter().filter(|&&o| o > 0.0).count()
    }

    /// Values with a positive diagonal coincidence entry.
    pub fn positive_diagonals(&self) -> usize {
        self.coincidences.diagonal().iter().filter(|&&o| o > 0.0).count()
    }

    /// Write `table` with value labels, optionally adding row sums.
    pub fn write_table(&self, w: &mut dyn fmt::Write, table: &Table, row_sums: bool) -> fmt::Result {
        let width = self.labels.iter().map(|l| l.chars().count()).max().unwrap_or(0).max(8);

        write!(w, "{:width$}", "", width = width)?;
        for label in &self.labels {
            write!(w, " {:>width$}", label, width = width)?;
        }
        if row_sums {
            write!(w, " {:>width$}", "Σ", width = width)?;
        }
        writeln!(w)?;

        for (c, label) in self.labels.iter().enumerate() {
            write!(w, "{:width$}", label, width = width)?;
            for kk in 0..self.labels.len() {
                write!(w, " {:>width$.3}", table[(c, kk)], width = width)?;
            }
            if row_sums {
                write!(w, " {:>width$.3}", table.row(c).sum(), width = width)?;
            }
            writeln!(w)?;
        }
        Ok(())
    }
}

/// Labels in table order and, per matrix value index, its table rank.
fn rank_mapping(matrix: &ObservationMatrix, scale: &Scale) -> Result<(Vec<String>, Vec<usize>)> {
    match scale {
        Scale::Interval => Err(IrrError::UnsupportedScale {
            statistic: "Krippendorff's alpha",
            scale: ScaleType::Interval,
        }),
        Scale::Nominal => Ok((matrix.values().to_vec(), (0..matrix.value_count()).collect())),
        Scale::Ordinal(order) => {
            for (i, label) in order.iter().enumerate() {
                if order[..i].contains(label) {
                    return Err(IrrError::DuplicateValue {
                        variable: matrix.variable().to_string(),
                        value: label.clone(),
                    });
                }
            }
            let rank = matrix
                .values()
                .iter()
                .map(|value| {
                    order.iter().position(|l| l == value).ok_or_else(|| IrrError::UnknownOrdinalValue {
                        variable: matrix.variable().to_string(),
                        value: value.clone(),
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            Ok((order.clone(), rank))
        }
    }
}

/// Ordinal metric: `(Σ_{g=c..=k} n_g − (n_c + n_k)/2)²`.
fn ordinal_delta(value_sums: &[f64]) -> Table {
    let k = value_sums.len();
    Table::from_fn(k, k, |c, kk| {
        if c == kk {
            return 0.0;
        }
        let (lo, hi) = if c < kk { (c, kk) } else { (kk, c) };
        let between: f64 = value_sums[lo..=hi].iter().sum();
        let d = between - (value_sums[c] + value_sums[kk]) / 2.0;
        d * d
    })
}
