//! Per-series statistics and log-scale axis math.

/// Floor for the lower y-bound so the logarithmic axis never sees a
/// non-positive value.
pub const LOG_FLOOR_GBPS: f64 = 0.01;

/// Minimum, maximum, and arithmetic mean of a series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl SeriesStats {
    /// Compute stats over a series. Returns `None` for an empty series,
    /// where min/max/mean are undefined.
    pub fn compute(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        for &v in values {
            min = min.min(v);
            max = max.max(v);
            sum += v;
        }

        Some(Self {
            min,
            max,
            mean: sum / values.len() as f64,
        })
    }
}

/// Shared y-range for plotting two series on one logarithmic axis.
///
/// The lower bound backs off 20% below the smaller minimum but is floored
/// at [`LOG_FLOOR_GBPS`]; the upper bound adds 20% headroom above the
/// larger maximum.
pub fn log_axis_range(a: &SeriesStats, b: &SeriesStats) -> (f64, f64) {
    let lower = (a.min.min(b.min) * 0.8).max(LOG_FLOOR_GBPS);
    let upper = a.max.max(b.max) * 1.2;
    (lower, upper)
}

/// `count` log-spaced tick positions across `[lower, upper]`, inclusive of
/// both endpoints.
pub fn log_ticks(lower: f64, upper: f64, count: usize) -> Vec<f64> {
    match count {
        0 => return Vec::new(),
        1 => return vec![lower],
        _ => {}
    }

    let lo = lower.log10();
    let hi = upper.log10();
    let step = (hi - lo) / (count - 1) as f64;
    (0..count).map(|i| 10f64.powf(lo + step * i as f64)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        let tolerance = 1e-9 * expected.abs().max(1.0);
        assert!(
            (actual - expected).abs() < tolerance,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_stats_match_hand_computed_values() {
        let values = [3.2, 4.1, 3.9, 4.4, 3.7, 4.0, 3.5, 4.2, 3.8, 4.6];
        let stats = SeriesStats::compute(&values).unwrap();

        assert_close(stats.min, 3.2);
        assert_close(stats.max, 4.6);
        assert_close(stats.mean, 3.94);
    }

    #[test]
    fn test_stats_undefined_on_empty_series() {
        assert!(SeriesStats::compute(&[]).is_none());
    }

    #[test]
    fn test_single_value_series() {
        let stats = SeriesStats::compute(&[2.5]).unwrap();
        assert_close(stats.min, 2.5);
        assert_close(stats.max, 2.5);
        assert_close(stats.mean, 2.5);
    }

    #[test]
    fn test_lower_bound_stays_positive_for_zero_minimum() {
        let a = SeriesStats::compute(&[0.0, 1.0]).unwrap();
        let b = SeriesStats::compute(&[5.0, 6.0]).unwrap();

        let (lower, _) = log_axis_range(&a, &b);
        assert!(lower > 0.0);
        assert_close(lower, LOG_FLOOR_GBPS);
    }

    #[test]
    fn test_axis_range_backoff_and_headroom() {
        let a = SeriesStats::compute(&[2.0, 4.0]).unwrap();
        let b = SeriesStats::compute(&[3.0, 5.0]).unwrap();

        let (lower, upper) = log_axis_range(&a, &b);
        assert_close(lower, 1.6); // 0.8 * 2.0
        assert_close(upper, 6.0); // 1.2 * 5.0
    }

    #[test]
    fn test_log_ticks_span_range() {
        let ticks = log_ticks(0.01, 10.0, 7);
        assert_eq!(ticks.len(), 7);
        assert_close(ticks[0], 0.01);
        assert_close(ticks[6], 10.0);

        // Log-spaced: constant ratio between neighbors.
        let ratio = ticks[1] / ticks[0];
        for pair in ticks.windows(2) {
            assert_close(pair[1] / pair[0], ratio);
        }
    }
}
