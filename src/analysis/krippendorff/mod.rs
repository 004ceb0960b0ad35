//! Krippendorff's alpha for nominal and ordinal data.
//!
//! Alpha accepts any number of observers and missing observations. Only
//! units with at least two observations are pairable. Inference comes from
//! a bootstrapped distribution; see [`BootstrapDistribution`].

mod bootstrap;
mod tables;

use std::fmt;
use std::time::Duration;

use tracing::debug;

pub use bootstrap::BootstrapDistribution;
pub use tables::CoincidenceTables;

use self::bootstrap::ResamplePlan;
use super::{clamp_unit, sample_size_advisories, Advisory, ReliabilityStatistic, ALPHA_THRESHOLDS};
use crate::error::Result;
use crate::matrix::ObservationMatrix;
use crate::result::{ConfidenceInterval, InferenceKind, PValue};
use crate::statistics::two_sided_critical;
use crate::types::{Scale, ScaleType};

type Progress<'a> = Box<dyn FnMut(usize, usize) + 'a>;

/// Builder for [`KrippendorffAlpha`].
///
/// # Example
///
/// ```
/// use irr::{matrix_from_rows, KrippendorffAlpha, ReliabilityStatistic, Scale};
///
/// let matrix = matrix_from_rows(
///     "tone",
///     &["ann", "bob"],
///     Scale::Nominal,
///     &[("d1", &["pos", "pos"]), ("d2", &["neg", "neg"]), ("d3", &["pos", "neg"])],
/// )
/// .unwrap();
///
/// let alpha = KrippendorffAlpha::builder(&matrix)
///     .resamples(2_000)
///     .seed(7)
///     .build()
///     .unwrap();
/// assert!(alpha.point_estimate() < 1.0);
/// ```
pub struct AlphaBuilder<'a> {
    matrix: &'a ObservationMatrix,
    scale: Option<Scale>,
    resamples: usize,
    seed: Option<u64>,
    deadline: Option<Duration>,
    small_sample_threshold: usize,
    progress: Option<Progress<'a>>,
}

impl<'a> AlphaBuilder<'a> {
    fn new(matrix: &'a ObservationMatrix) -> Self {
        Self {
            matrix,
            scale: None,
            resamples: 20_000,
            seed: None,
            deadline: None,
            small_sample_threshold: 30,
            progress: None,
        }
    }

    /// Override the matrix's declared scale.
    ///
    /// An ordinal override must list every observed value in rank order.
    pub fn scale(mut self, scale: Scale) -> Self {
        self.scale = Some(scale);
        self
    }

    /// Bootstrap resamples (default 20,000). Zero disables inference.
    pub fn resamples(mut self, n: usize) -> Self {
        self.resamples = n;
        self
    }

    /// Fix the bootstrap seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Stop resampling after `limit`, keeping what was drawn.
    pub fn max_duration(mut self, limit: Duration) -> Self {
        self.deadline = Some(limit);
        self
    }

    /// Unit and observation count below which advisories are raised.
    pub fn small_sample_threshold(mut self, threshold: usize) -> Self {
        self.small_sample_threshold = threshold;
        self
    }

    /// Called with `(done, total)` after each group of resamples.
    pub fn on_progress(mut self, f: impl FnMut(usize, usize) + 'a) -> Self {
        self.progress = Some(Box::new(f));
        self
    }

    /// Tabulate and, unless disabled or undefined, bootstrap.
    ///
    /// # Errors
    ///
    /// - [`IrrError::UnsupportedScale`](crate::IrrError::UnsupportedScale)
    ///   for interval data.
    /// - [`IrrError::BootstrapInvariant`](crate::IrrError::BootstrapInvariant)
    ///   when resampling is enabled and more than two values have a
    ///   positive diagonal coincidence.
    pub fn build(self) -> Result<KrippendorffAlpha> {
        let matrix = self.matrix;
        let scale = self.scale.unwrap_or_else(|| matrix.scale().clone());
        let tables = CoincidenceTables::from_matrix(matrix, &scale)?;
        let value = tables.alpha();

        debug!(
            variable = matrix.variable(),
            scale = %scale.kind(),
            n = tables.n_total(),
            pairable_units = tables.pairable_units(),
            alpha = value,
            "krippendorff's alpha"
        );

        let bootstrap = if self.resamples == 0 || value.is_nan() {
            None
        } else {
            let plan = ResamplePlan {
                resamples: self.resamples,
                observers: matrix.observer_count(),
                seed: self.seed.unwrap_or_else(rand::random),
                deadline: self.deadline,
            };
            let mut progress = self.progress;
            let mut noop = |_: usize, _: usize| {};
            let callback: &mut dyn FnMut(usize, usize) = match progress.as_mut() {
                Some(f) => &mut **f,
                None => &mut noop,
            };
            Some(BootstrapDistribution::generate(&tables, plan, callback)?)
        };

        Ok(KrippendorffAlpha {
            variable: matrix.variable().to_string(),
            scale: scale.kind(),
            units: matrix.unit_count(),
            observers: matrix.observer_count(),
            observations: matrix.observation_count(),
            tables,
            value,
            resamples: self.resamples,
            bootstrap,
            small_sample_threshold: self.small_sample_threshold,
        })
    }
}

/// Krippendorff's alpha with its tables and bootstrapped distribution.
#[derive(Debug, Clone)]
pub struct KrippendorffAlpha {
    variable: String,
    scale: ScaleType,
    units: usize,
    observers: usize,
    observations: usize,
    tables: CoincidenceTables,
    value: f64,
    resamples: usize,
    bootstrap: Option<BootstrapDistribution>,
    small_sample_threshold: usize,
}

impl KrippendorffAlpha {
    /// Alpha with default settings: declared scale, 20,000 resamples,
    /// fresh seed.
    pub fn new(matrix: &ObservationMatrix) -> Result<Self> {
        Self::builder(matrix).build()
    }

    /// Configure before computing.
    pub fn builder(matrix: &ObservationMatrix) -> AlphaBuilder<'_> {
        AlphaBuilder::new(matrix)
    }

    /// Scale the coefficient was computed under.
    pub fn scale(&self) -> ScaleType {
        self.scale
    }

    /// The deterministic tabulation.
    pub fn tables(&self) -> &CoincidenceTables {
        &self.tables
    }

    /// The bootstrapped distribution, absent when resampling was disabled
    /// or alpha is undefined.
    pub fn bootstrap(&self) -> Option<&BootstrapDistribution> {
        self.bootstrap.as_ref()
    }
}

impl ReliabilityStatistic for KrippendorffAlpha {
    fn name(&self) -> &'static str {
        "Krippendorff's alpha"
    }

    fn letter(&self) -> &'static str {
        "α"
    }

    fn variable(&self) -> &str {
        &self.variable
    }

    fn threshold_values(&self) -> &'static [f64] {
        &ALPHA_THRESHOLDS
    }

    fn point_estimate(&self) -> f64 {
        self.value
    }

    fn confidence_interval(&self, level: f64) -> Result<ConfidenceInterval> {
        two_sided_critical(level)?;
        if self.resamples == 0 {
            return Ok(ConfidenceInterval::not_implemented(level).with_note("bootstrap disabled"));
        }
        let (lower, upper) = match &self.bootstrap {
            Some(dist) => dist.interval(level),
            None => (f64::NAN, f64::NAN),
        };
        Ok(ConfidenceInterval::new(
            level,
            clamp_unit(lower),
            clamp_unit(upper),
            InferenceKind::Bootstrapped,
        ))
    }

    fn p_value(&self, min_value: f64) -> PValue {
        if self.resamples == 0 {
            return PValue::not_implemented();
        }
        match &self.bootstrap {
            Some(dist) => PValue::bootstrapped(dist.p_value(min_value)),
            None => PValue::bootstrapped(f64::NAN),
        }
    }

    fn advisories(&self) -> Vec<Advisory> {
        let mut advisories = sample_size_advisories(
            self.name(),
            self.tables.pairable_units(),
            Some(self.tables.n_total().round() as usize),
            self.small_sample_threshold,
        );
        match &self.bootstrap {
            Some(dist) if dist.is_truncated() => advisories.push(Advisory::BootstrapTruncated {
                completed: dist.completed(),
                requested: dist.requested(),
            }),
            None if self.resamples == 0 => advisories.push(Advisory::BootstrapDisabled),
            _ => {}
        }
        advisories
    }

    fn write_supplementary(&self, w: &mut dyn fmt::Write) -> fmt::Result {
        if let Some(dist) = &self.bootstrap {
            writeln!(
                w,
                "Bootstrapped distribution (X = {}, M = {}, retained = {}):",
                dist.completed(),
                dist.depth(),
                dist.effective_count()
            )?;
            write!(w, "{}", dist.histogram())?;
            writeln!(w)?;
        }

        writeln!(w, "Data is {}.", self.scale)?;
        writeln!(
            w,
            "units = {}, observers = {}, values = {}, observations = {}",
            self.units,
            self.observers,
            self.tables.labels().len(),
            self.observations
        )?;
        writeln!(w)?;

        writeln!(w, "Coincidences:")?;
        self.tables.write_table(w, self.tables.coincidences(), true)?;
        writeln!(w)?;
        writeln!(w, "Expected coincidences:")?;
        self.tables.write_table(w, self.tables.expected(), true)?;
        writeln!(w)?;
        writeln!(w, "Delta:")?;
        self.tables.write_table(w, self.tables.delta(), false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IrrError;
    use crate::matrix::matrix_from_rows;

    fn mixed() -> ObservationMatrix {
        matrix_from_rows(
            "v",
            &["a", "b", "c"],
            Scale::Nominal,
            &[
                ("u1", &["x", "x", "x"]),
                ("u2", &["y", "y", "x"]),
                ("u3", &["z", "z", "z"]),
                ("u4", &["x", "y", ""]),
                ("u5", &["y", "y", "y"]),
                ("u6", &["z", "x", "z"]),
                ("u7", &["x", "x", ""]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_perfect_agreement_is_one() {
        let m = matrix_from_rows(
            "v",
            &["a", "b"],
            Scale::Nominal,
            &[("u1", &["x", "x"]), ("u2", &["y", "y"]), ("u3", &["x", ""])],
        )
        .unwrap();
        let alpha = KrippendorffAlpha::builder(&m).resamples(500).seed(1).build().unwrap();
        assert_eq!(alpha.point_estimate(), 1.0);
    }

    #[test]
    fn test_interval_scale_rejected() {
        let m = matrix_from_rows("v", &["a", "b"], Scale::Interval, &[("u1", &["1", "2"])]).unwrap();
        let err = KrippendorffAlpha::new(&m).unwrap_err();
        assert!(matches!(err, IrrError::UnsupportedScale { .. }));
    }

    #[test]
    fn test_three_unanimous_values_fail_bootstrap() {
        // x, y, z each paired with themselves somewhere.
        let err = KrippendorffAlpha::builder(&mixed()).resamples(100).seed(1).build().unwrap_err();
        assert!(matches!(err, IrrError::BootstrapInvariant { positive_diagonals: 3 }));

        // Without resampling the estimate is still available.
        let alpha = KrippendorffAlpha::builder(&mixed()).resamples(0).build().unwrap();
        assert!(!alpha.point_estimate().is_nan());
        assert!(alpha.bootstrap().is_none());
        assert!(!alpha.confidence_interval(0.95).unwrap().is_implemented());
        assert!(!alpha.p_value(0.667).is_implemented());
        assert!(alpha.advisories().contains(&Advisory::BootstrapDisabled));
    }

    #[test]
    fn test_undefined_alpha_skips_bootstrap() {
        let m = matrix_from_rows("v", &["a", "b"], Scale::Nominal, &[("u1", &["x", "x"]), ("u2", &["x", "x"])])
            .unwrap();
        let alpha = KrippendorffAlpha::builder(&m).resamples(1000).build().unwrap();
        assert!(alpha.point_estimate().is_nan());
        assert!(alpha.bootstrap().is_none());

        let ci = alpha.confidence_interval(0.95).unwrap();
        assert!(ci.is_implemented());
        assert!(!ci.is_defined());
        assert!(alpha.p_value(0.5).p.is_nan());
    }

    #[test]
    fn test_bootstrap_inference() {
        let m = matrix_from_rows(
            "v",
            &["a", "b", "c"],
            Scale::Nominal,
            &[
                ("u1", &["x", "x", "y"]),
                ("u2", &["y", "y", "y"]),
                ("u3", &["x", "y", "x"]),
                ("u4", &["y", "x", "y"]),
                ("u5", &["x", "x", "x"]),
                ("u6", &["y", "y", "x"]),
            ],
        )
        .unwrap();
        let alpha = KrippendorffAlpha::builder(&m).resamples(4000).seed(11).build().unwrap();
        let dist = alpha.bootstrap().unwrap();
        assert_eq!(dist.completed(), 4000);
        assert!(dist.effective_count() <= 4000);

        let ci95 = alpha.confidence_interval(0.95).unwrap();
        let ci99 = alpha.confidence_interval(0.99).unwrap();
        assert_eq!(ci95.kind, InferenceKind::Bootstrapped);
        assert!(ci99.lower <= ci95.lower && ci95.upper <= ci99.upper);
        assert!(ci95.lower >= -1.0 && ci95.upper <= 1.0);

        let p_strict = alpha.p_value(0.9).p;
        let p_lenient = alpha.p_value(0.0).p;
        assert!((0.0..=1.0).contains(&p_strict));
        assert!(p_lenient <= p_strict);
    }

    #[test]
    fn test_seed_reproduces_distribution() {
        let m = matrix_from_rows(
            "v",
            &["a", "b"],
            Scale::Nominal,
            &[("u1", &["x", "y"]), ("u2", &["y", "y"]), ("u3", &["x", "x"]), ("u4", &["y", "x"])],
        )
        .unwrap();
        let a = KrippendorffAlpha::builder(&m).resamples(1500).seed(3).build().unwrap();
        let b = KrippendorffAlpha::builder(&m).resamples(1500).seed(3).build().unwrap();
        assert_eq!(a.bootstrap().unwrap().samples(), b.bootstrap().unwrap().samples());
    }

    #[test]
    fn test_progress_callback_invoked() {
        let m = matrix_from_rows("v", &["a", "b"], Scale::Nominal, &[("u1", &["x", "y"]), ("u2", &["y", "x"])])
            .unwrap();
        let mut last = (0, 0);
        KrippendorffAlpha::builder(&m)
            .resamples(1200)
            .seed(5)
            .on_progress(|done, total| last = (done, total))
            .build()
            .unwrap();
        assert_eq!(last, (1200, 1200));
    }

    #[test]
    fn test_ordinal_penalises_distant_disagreement_more() {
        let order = Scale::Ordinal(vec!["Low".into(), "Mid".into(), "High".into()]);
        let rows_near: [(&str, &[&str]); 4] = [
            ("u1", &["Low", "Mid"]),
            ("u2", &["Mid", "Mid"]),
            ("u3", &["High", "High"]),
            ("u4", &["Low", "Low"]),
        ];
        let rows_far: [(&str, &[&str]); 4] = [
            ("u1", &["Low", "High"]),
            ("u2", &["Mid", "Mid"]),
            ("u3", &["High", "High"]),
            ("u4", &["Low", "Low"]),
        ];
        let near = matrix_from_rows("v", &["a", "b"], order.clone(), &rows_near).unwrap();
        let far = matrix_from_rows("v", &["a", "b"], order, &rows_far).unwrap();

        let near = KrippendorffAlpha::builder(&near).resamples(0).build().unwrap();
        let far = KrippendorffAlpha::builder(&far).resamples(0).build().unwrap();
        assert_eq!(near.scale(), ScaleType::Ordinal);
        assert!(far.point_estimate() < near.point_estimate());
    }

    #[test]
    fn test_supplementary_lists_tables() {
        let m = matrix_from_rows("v", &["a", "b"], Scale::Nominal, &[("u1", &["x", "y"]), ("u2", &["y", "x"])])
            .unwrap();
        let alpha = KrippendorffAlpha::builder(&m).resamples(200).seed(9).build().unwrap();
        let mut out = String::new();
        alpha.write_supplementary(&mut out).unwrap();
        assert!(out.contains("Bootstrapped distribution"));
        assert!(out.contains("Data is nominal."));
        assert!(out.contains("Coincidences:"));
        assert!(out.contains("Expected coincidences:"));
        assert!(out.contains("Delta:"));
    }

    #[test]
    fn test_small_sample_advisories() {
        let alpha = KrippendorffAlpha::builder(&mixed()).resamples(0).build().unwrap();
        let advisories = alpha.advisories();
        assert!(matches!(advisories[0], Advisory::FewUnits { units: 7, .. }));
        assert!(matches!(advisories[1], Advisory::FewObservations { .. }));
    }
}
