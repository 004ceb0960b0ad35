//! Type aliases and common types.

use std::fmt;

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

/// Square value-by-value table (coincidences, expectations, distances).
pub type Table = DMatrix<f64>;

/// Measurement scale of a variable, without the ordinal declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleType {
    /// Unordered categories.
    Nominal,
    /// Ranked categories.
    Ordinal,
    /// Numeric values with meaningful differences.
    Interval,
}

impl fmt::Display for ScaleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ScaleType::Nominal => "nominal",
            ScaleType::Ordinal => "ordinal",
            ScaleType::Interval => "interval",
        })
    }
}

impl std::str::FromStr for ScaleType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nominal" => Ok(ScaleType::Nominal),
            "ordinal" => Ok(ScaleType::Ordinal),
            "interval" => Ok(ScaleType::Interval),
            other => Err(format!("unknown scale {:?}", other)),
        }
    }
}

/// Measurement scale of a variable.
///
/// Ordinal scales carry their declared order, lowest rank first. The order
/// is never inferred from the data.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Scale {
    /// Unordered categories.
    #[default]
    Nominal,
    /// Ranked categories in declared order.
    Ordinal(Vec<String>),
    /// Numeric values.
    Interval,
}

impl Scale {
    /// The scale kind, dropping any ordinal declaration.
    pub fn kind(&self) -> ScaleType {
        match self {
            Scale::Nominal => ScaleType::Nominal,
            Scale::Ordinal(_) => ScaleType::Ordinal,
            Scale::Interval => ScaleType::Interval,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_type_from_str() {
        assert_eq!("Ordinal".parse::<ScaleType>(), Ok(ScaleType::Ordinal));
        assert_eq!(" nominal ".parse::<ScaleType>(), Ok(ScaleType::Nominal));
        assert!("ratio".parse::<ScaleType>().is_err());
    }

    #[test]
    fn test_scale_kind() {
        let scale = Scale::Ordinal(vec!["Low".into(), "High".into()]);
        assert_eq!(scale.kind(), ScaleType::Ordinal);
        assert_eq!(Scale::default().kind(), ScaleType::Nominal);
    }
}
