//! Advisory checks on result validity.
//!
//! Small samples are not errors: the estimate is still computed, but the
//! large-sample assumptions behind intervals and p-values may not hold, so
//! an advisory travels with the numbers.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Warning attached to a statistic's results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Advisory {
    /// Fewer units than the configured threshold contributed.
    FewUnits {
        /// Contributing units.
        units: usize,
        /// Configured threshold.
        threshold: usize,
    },

    /// Fewer pairable observations than the configured threshold.
    FewObservations {
        /// Contributing observations.
        observations: usize,
        /// Configured threshold.
        threshold: usize,
    },

    /// The bootstrap deadline expired before all resamples were drawn.
    BootstrapTruncated {
        /// Resamples actually drawn.
        completed: usize,
        /// Resamples requested.
        requested: usize,
    },

    /// Bootstrapping was disabled, so no interval or p-value is available.
    BootstrapDisabled,
}

impl Advisory {
    /// Human-readable description.
    pub fn description(&self) -> String {
        match self {
            Advisory::FewUnits { units, threshold } => format!(
                "The sample is small ({} units, fewer than {}). The assumptions \
                 behind the confidence intervals and significance tests are \
                 probably invalid.",
                units, threshold
            ),
            Advisory::FewObservations {
                observations,
                threshold,
            } => format!(
                "Only {} pairable observations (fewer than {}). Confidence \
                 intervals and significance tests are probably invalid.",
                observations, threshold
            ),
            Advisory::BootstrapTruncated {
                completed,
                requested,
            } => format!(
                "Bootstrap stopped at the deadline after {} of {} resamples; \
                 interval bounds and p-values are coarser than requested.",
                completed, requested
            ),
            Advisory::BootstrapDisabled => {
                "Bootstrapping is disabled; no confidence intervals or p-values.".to_string()
            }
        }
    }
}

/// Collect sample-size advisories for `statistic`.
///
/// `observations` is checked only when given.
pub fn sample_size_advisories(
    statistic: &str,
    units: usize,
    observations: Option<usize>,
    threshold: usize,
) -> Vec<Advisory> {
    let mut advisories = Vec::new();
    if units < threshold {
        warn!(statistic, units, threshold, "small sample");
        advisories.push(Advisory::FewUnits { units, threshold });
    }
    if let Some(observations) = observations {
        if observations < threshold {
            warn!(statistic, observations, threshold, "few observations");
            advisories.push(Advisory::FewObservations {
                observations,
                threshold,
            });
        }
    }
    advisories
}
