//! Quantiles and rank counts over sorted samples.
//!
//! Bootstrap distributions are sorted once and then queried many times
//! (one interval per confidence level, one rank count per threshold), so
//! everything here works on pre-sorted slices.

/// Compute a quantile from pre-sorted data using the R-7 definition
/// (linear interpolation between adjacent ranks).
///
/// Returns NaN for empty input.
///
/// # Panics
///
/// Panics if `p` is outside [0, 1].
pub fn quantile_sorted(sorted: &[f64], p: f64) -> f64 {
    assert!(
        (0.0..=1.0).contains(&p),
        "Quantile probability must be in [0, 1]"
    );

    let n = sorted.len();
    if n == 0 {
        return f64::NAN;
    }
    if n == 1 {
        return sorted[0];
    }

    let h = (n - 1) as f64 * p;
    let h_floor = h.floor() as usize;
    let h_frac = h - h.floor();

    if h_floor >= n - 1 {
        sorted[n - 1]
    } else if h_frac == 0.0 {
        sorted[h_floor]
    } else {
        sorted[h_floor] + h_frac * (sorted[h_floor + 1] - sorted[h_floor])
    }
}

/// Central interval holding `level` of the mass of sorted data.
///
/// Returns `(lower, upper)` quantiles at `(1 - level)/2` and
/// `1 - (1 - level)/2`.
pub fn central_interval_sorted(sorted: &[f64], level: f64) -> (f64, f64) {
    let tail = (1.0 - level) / 2.0;
    (
        quantile_sorted(sorted, tail),
        quantile_sorted(sorted, 1.0 - tail),
    )
}

/// Number of sorted samples strictly below `bound`.
pub fn count_below_sorted(sorted: &[f64], bound: f64) -> usize {
    sorted.partition_point(|&x| x < bound)
}

/// Sort samples ascending in place, NaN last.
pub fn sort_samples(data: &mut [f64]) {
    data.sort_unstable_by(|a, b| a.total_cmp(b));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantile_median() {
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        assert!((quantile_sorted(&data, 0.5) - 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_quantile_extremes() {
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        assert!((quantile_sorted(&data, 0.0) - 1.0).abs() < 1e-10);
        assert!((quantile_sorted(&data, 1.0) - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_quantile_interpolates() {
        let data = vec![0.0, 10.0];
        assert!((quantile_sorted(&data, 0.25) - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_quantile_empty_is_nan() {
        assert!(quantile_sorted(&[], 0.5).is_nan());
    }

    #[test]
    #[should_panic(expected = "Quantile probability must be in [0, 1]")]
    fn test_quantile_rejects_bad_probability() {
        quantile_sorted(&[1.0], 1.5);
    }

    #[test]
    fn test_central_interval() {
        let data: Vec<f64> = (0..=100).map(|x| x as f64).collect();
        let (lo, hi) = central_interval_sorted(&data, 0.9);
        assert!((lo - 5.0).abs() < 1e-10);
        assert!((hi - 95.0).abs() < 1e-10);
    }

    #[test]
    fn test_count_below_is_strict() {
        let data = vec![0.1, 0.2, 0.2, 0.3];
        assert_eq!(count_below_sorted(&data, 0.2), 1);
        assert_eq!(count_below_sorted(&data, 0.25), 3);
        assert_eq!(count_below_sorted(&data, -1.0), 0);
        assert_eq!(count_below_sorted(&data, 2.0), 4);
    }

    #[test]
    fn test_sort_samples() {
        let mut data = vec![0.3, -0.2, 1.0, 0.0];
        sort_samples(&mut data);
        assert_eq!(data, vec![-0.2, 0.0, 0.3, 1.0]);
    }
}
