//! Result types returned by the reliability statistics.

use serde::{Deserialize, Serialize};

use crate::analysis::Advisory;
use crate::types::ScaleType;

/// How an interval or p-value was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InferenceKind {
    /// Large-sample normal approximation around the point estimate.
    Asymptotic,
    /// Quantiles and ranks of a bootstrapped distribution.
    Bootstrapped,
    /// Inference is not available for this statistic or configuration.
    /// The numeric fields are NaN.
    NotImplemented,
}

/// Confidence interval for a statistic.
///
/// Bounds are NaN when the estimate is undefined; check
/// [`ConfidenceInterval::is_implemented`] to tell that apart from missing
/// inference machinery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    /// Confidence level in (0, 1), e.g. 0.95.
    pub level: f64,
    /// Lower bound.
    pub lower: f64,
    /// Upper bound.
    pub upper: f64,
    /// Method used.
    pub kind: InferenceKind,
    /// Optional caveat for readers.
    pub note: Option<String>,
}

impl ConfidenceInterval {
    /// Interval computed by `kind`.
    pub fn new(level: f64, lower: f64, upper: f64, kind: InferenceKind) -> Self {
        Self {
            level,
            lower,
            upper,
            kind,
            note: None,
        }
    }

    /// Marker for a statistic without interval machinery.
    pub fn not_implemented(level: f64) -> Self {
        Self {
            level,
            lower: f64::NAN,
            upper: f64::NAN,
            kind: InferenceKind::NotImplemented,
            note: Some("not implemented".to_string()),
        }
    }

    /// Attach a caveat.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// False for the "not implemented" marker.
    pub fn is_implemented(&self) -> bool {
        self.kind != InferenceKind::NotImplemented
    }

    /// True when both bounds are numbers.
    pub fn is_defined(&self) -> bool {
        !self.lower.is_nan() && !self.upper.is_nan()
    }

    /// Whether `value` lies within the bounds (inclusive).
    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }
}

/// A named test statistic reported alongside a p-value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestStatistic {
    /// Symbol, e.g. "z".
    pub name: String,
    /// Value.
    pub value: f64,
}

/// Probability that the true coefficient does not exceed a minimum value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PValue {
    /// Probability in [0, 1], or NaN.
    pub p: f64,
    /// Test statistic behind `p`, if any.
    pub statistic: Option<TestStatistic>,
    /// Method used.
    pub kind: InferenceKind,
    /// Optional remark, e.g. "upper tail".
    pub note: Option<String>,
}

impl PValue {
    /// p-value from the normal upper tail at `z`.
    pub fn upper_tail(p: f64, z: f64) -> Self {
        Self {
            p,
            statistic: Some(TestStatistic {
                name: "z".to_string(),
                value: z,
            }),
            kind: InferenceKind::Asymptotic,
            note: Some("upper tail".to_string()),
        }
    }

    /// p-value read off a bootstrapped distribution.
    pub fn bootstrapped(p: f64) -> Self {
        Self {
            p,
            statistic: None,
            kind: InferenceKind::Bootstrapped,
            note: Some("bootstrapped".to_string()),
        }
    }

    /// Marker for a statistic without significance testing.
    pub fn not_implemented() -> Self {
        Self {
            p: f64::NAN,
            statistic: None,
            kind: InferenceKind::NotImplemented,
            note: Some("not implemented".to_string()),
        }
    }

    /// False for the "not implemented" marker.
    pub fn is_implemented(&self) -> bool {
        self.kind != InferenceKind::NotImplemented
    }
}

/// Significance test against one threshold value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignificanceTest {
    /// Minimum acceptable value of the coefficient.
    pub threshold: f64,
    /// Probability the coefficient is at or below `threshold`.
    pub p_value: PValue,
}

/// Everything reported for one statistic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatisticReport {
    /// Full name, e.g. "Cohen's kappa".
    pub name: String,
    /// Symbol used in formulas.
    pub letter: String,
    /// Variable analysed.
    pub variable: String,
    /// Observer pair, for pairwise statistics.
    pub observers: Option<(String, String)>,
    /// Point estimate, NaN when undefined.
    pub estimate: f64,
    /// One interval per configured confidence level.
    pub intervals: Vec<ConfidenceInterval>,
    /// One test per threshold value.
    pub significance: Vec<SignificanceTest>,
    /// Advisory warnings about result validity.
    pub advisories: Vec<Advisory>,
    /// Plain-text supplementary tables.
    pub supplementary: String,
}

/// Reports for all statistics of one variable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableReport {
    /// Variable name.
    pub variable: String,
    /// Declared scale.
    pub scale: ScaleType,
    /// Number of units.
    pub units: usize,
    /// Observer identifiers.
    pub observers: Vec<String>,
    /// Per-statistic reports.
    pub statistics: Vec<StatisticReport>,
}
