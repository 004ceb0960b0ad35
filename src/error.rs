//! Error type shared by the statistics, the data model and the input reader.
//!
//! Undefined estimates (zero denominators, no qualifying units) are not
//! errors; they surface as NaN values in the results.

use std::io;

use thiserror::Error;

use crate::types::ScaleType;

/// Errors raised while building data or computing a statistic.
#[derive(Error, Debug)]
pub enum IrrError {
    /// The statistic cannot handle the variable's scale.
    #[error("unsupported data kind: {statistic} does not support {scale} data")]
    UnsupportedScale {
        /// Name of the statistic that rejected the data.
        statistic: &'static str,
        /// Scale declared for the variable.
        scale: ScaleType,
    },

    /// A probability argument outside the open interval (0, 1).
    #[error("probability {0} is outside the open interval (0, 1)")]
    ProbabilityOutOfRange(f64),

    /// More than two values have a positive diagonal coincidence, a case
    /// the bootstrap correction has no rule for.
    #[error(
        "bootstrap correction undefined: {positive_diagonals} values have positive \
         diagonal coincidences (at most 2 supported); rerun with resampling disabled"
    )]
    BootstrapInvariant {
        /// Number of values with a positive diagonal coincidence entry.
        positive_diagonals: usize,
    },

    /// Observed value missing from the declared ordinal order.
    #[error("variable {variable}: value {value:?} is not listed in the declared ordinal order")]
    UnknownOrdinalValue {
        /// Variable being built or analysed.
        variable: String,
        /// Offending value label.
        value: String,
    },

    /// A declared ordinal order lists the same label twice.
    #[error("variable {variable}: value {value:?} appears twice in the declared order")]
    DuplicateValue {
        /// Variable being built.
        variable: String,
        /// Repeated label.
        value: String,
    },

    /// Observer column index out of range.
    #[error("observer index {index} out of range ({observers} observers)")]
    ObserverOutOfRange {
        /// Requested column.
        index: usize,
        /// Number of observer columns in the matrix.
        observers: usize,
    },

    /// Malformed input.
    #[error("line {line}: {message}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// What went wrong.
        message: String,
    },

    /// Failure reading input.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, IrrError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_scale_message() {
        let err = IrrError::UnsupportedScale {
            statistic: "Krippendorff's alpha",
            scale: ScaleType::Interval,
        };
        let msg = err.to_string();
        assert!(msg.contains("unsupported data kind"));
        assert!(msg.contains("interval"));
    }

    #[test]
    fn test_parse_error_carries_line() {
        let err = IrrError::Parse {
            line: 7,
            message: "empty header".to_string(),
        };
        assert_eq!(err.to_string(), "line 7: empty header");
    }
}
