//! # irr
//!
//! Inter-rater reliability for categorical data.
//!
//! Given one variable's observations (units rated by observers, with missing
//! ratings allowed), this crate computes:
//! - Krippendorff's alpha (nominal or ordinal) with a bootstrapped
//!   distribution for confidence intervals and significance tests
//! - Fleiss' kappa with the Gwet (2008) variance
//! - Cohen's kappa for every pair of observers
//!
//! Undefined estimates are NaN, never errors.
//!
//! ## Quick Start
//!
//! ```
//! use irr::{parse_blocks, Analyzer};
//!
//! let data = "\
//! tone,ann,bob,cid
//! d1,pos,pos,pos
//! d2,neg,neg,pos
//! d3,neg,neg,neg
//! d4,pos,,pos
//! ";
//!
//! let analyzer = Analyzer::quick().seed(42);
//! for matrix in parse_blocks(data.as_bytes()) {
//!     let report = analyzer.analyze(&matrix.unwrap()).unwrap();
//!     println!("{}", irr::output::format_report(&report));
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
mod analyzer;
mod config;
mod error;
mod matrix;
mod result;
mod types;

// Functional modules
pub mod analysis;
pub mod input;
pub mod output;
pub mod statistics;

// Re-exports for public API
pub use analysis::{
    AlphaBuilder, BootstrapDistribution, CohenKappa, CoincidenceTables, FleissKappa,
    KrippendorffAlpha, ReliabilityStatistic,
};
pub use analyzer::Analyzer;
pub use config::{Config, FleissVariance};
pub use error::{IrrError, Result};
pub use input::{parse_blocks, read_path};
pub use matrix::{matrix_from_rows, MatrixBuilder, ObservationMatrix};
pub use result::{
    ConfidenceInterval, InferenceKind, PValue, SignificanceTest, StatisticReport, TestStatistic,
    VariableReport,
};
pub use types::{Scale, ScaleType, Table};

/// Analyse one variable with the default configuration.
///
/// Equivalent to `Analyzer::new().analyze(matrix)`.
pub fn analyze(matrix: &ObservationMatrix) -> Result<VariableReport> {
    Analyzer::new().analyze(matrix)
}
