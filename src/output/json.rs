//! JSON serialization for reliability reports.
//!
//! Undefined values (NaN) serialize as `null`.

use crate::result::VariableReport;

/// Serialize a VariableReport to a compact JSON string.
///
/// # Errors
///
/// Returns an error if serialization fails (should not happen for
/// VariableReport).
pub fn to_json(report: &VariableReport) -> Result<String, serde_json::Error> {
    serde_json::to_string(report)
}

/// Serialize a VariableReport to a pretty-printed JSON string.
///
/// # Errors
///
/// Returns an error if serialization fails (should not happen for
/// VariableReport).
pub fn to_json_pretty(report: &VariableReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::{ConfidenceInterval, InferenceKind, PValue, SignificanceTest, StatisticReport};
    use crate::types::ScaleType;

    fn make_report(estimate: f64) -> VariableReport {
        VariableReport {
            variable: "tone".to_string(),
            scale: ScaleType::Ordinal,
            units: 40,
            observers: vec!["ann".to_string(), "bob".to_string()],
            statistics: vec![StatisticReport {
                name: "Krippendorff's alpha".to_string(),
                letter: "α".to_string(),
                variable: "tone".to_string(),
                observers: None,
                estimate,
                intervals: vec![ConfidenceInterval::new(0.95, 0.5, 0.75, InferenceKind::Bootstrapped)],
                significance: vec![SignificanceTest {
                    threshold: 0.667,
                    p_value: PValue::bootstrapped(0.25),
                }],
                advisories: Vec::new(),
                supplementary: String::new(),
            }],
        }
    }

    #[test]
    fn test_to_json() {
        let json = to_json(&make_report(0.625)).unwrap();
        assert!(json.contains("\"variable\":\"tone\""));
        assert!(json.contains("\"scale\":\"ordinal\""));
        assert!(json.contains("\"estimate\":0.625"));
        assert!(json.contains("\"kind\":\"Bootstrapped\""));
    }

    #[test]
    fn test_nan_serializes_as_null() {
        let json = to_json(&make_report(f64::NAN)).unwrap();
        assert!(json.contains("\"estimate\":null"));
    }

    #[test]
    fn test_to_json_pretty() {
        let json = to_json_pretty(&make_report(0.625)).unwrap();
        assert!(json.contains('\n'));
        assert!(json.contains("significance"));
    }
}
