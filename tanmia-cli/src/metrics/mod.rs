//! Derived-metric calculations performed at persistence time
//!
//! Pure functions over the entities' own dates and costs. Missing inputs
//! and zero or negative denominators yield `None` rather than an error:
//! an incomplete record simply has no derived value yet. The store adapter
//! calls these before committing a tracking or execution-rate row.

use chrono::NaiveDate;

/// Cost variance between a project's estimate and the tracked actual costs.
///
/// `(estimated − actual) / estimated × 100`; `None` unless actual costs are
/// recorded and the estimate is non-zero.
pub fn cost_variance_percentage(estimated_cost: f64, actual_costs: Option<f64>) -> Option<f64> {
    let actual = actual_costs?;
    if estimated_cost == 0.0 {
        return None;
    }
    Some((estimated_cost - actual) / estimated_cost * 100.0)
}

/// Delay rate and delay variance for a tracking record.
///
/// Requires all three dates. The planned duration (planned end − actual
/// start) and the actual duration (actual end − actual start) must both be
/// positive; otherwise the schedule data is inconsistent and both results
/// are `None`. Variance is `actual end − planned end` in days; the rate is
/// that variance as a percentage of the planned duration.
pub fn delay_metrics(
    planned_end: Option<NaiveDate>,
    actual_start: Option<NaiveDate>,
    actual_end: Option<NaiveDate>,
) -> (Option<f64>, Option<i64>) {
    let (Some(planned_end), Some(actual_start), Some(actual_end)) =
        (planned_end, actual_start, actual_end)
    else {
        return (None, None);
    };

    let planned_days = (planned_end - actual_start).num_days();
    if planned_days <= 0 {
        return (None, None);
    }

    let actual_days = (actual_end - actual_start).num_days();
    if actual_days <= 0 {
        return (None, None);
    }

    let delay_days = (actual_end - planned_end).num_days();
    let delay_rate = delay_days as f64 / planned_days as f64 * 100.0;

    (Some(delay_rate), Some(delay_days))
}

/// Cost difference for an execution-rate snapshot.
///
/// Same formula as [`cost_variance_percentage`] but both costs live on the
/// snapshot itself; `None` when either is absent or the estimate is zero.
pub fn cost_difference_percentage(
    estimated_costs: Option<f64>,
    actual_costs: Option<f64>,
) -> Option<f64> {
    let estimated = estimated_costs?;
    let actual = actual_costs?;
    if estimated == 0.0 {
        return None;
    }
    Some((estimated - actual) / estimated * 100.0)
}

/// Days between the actual and the expected end of a snapshot's schedule
pub fn duration_difference_days(
    expected_end: Option<NaiveDate>,
    actual_end: Option<NaiveDate>,
) -> Option<i64> {
    Some((actual_end? - expected_end?).num_days())
}

/// Duration difference as a percentage of the expected duration.
///
/// Defined only when the expected duration (expected end − actual start)
/// is positive.
pub fn delay_percentage(
    expected_end: Option<NaiveDate>,
    actual_start: Option<NaiveDate>,
    actual_end: Option<NaiveDate>,
) -> Option<f64> {
    let delta = duration_difference_days(expected_end, actual_end)?;
    let total_days = (expected_end? - actual_start?).num_days();
    if total_days <= 0 {
        return None;
    }
    Some(delta as f64 / total_days as f64 * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_cost_variance_exact() {
        // (1_000_000 − 750_000) / 1_000_000 × 100 = 25%
        assert_eq!(
            cost_variance_percentage(1_000_000.0, Some(750_000.0)),
            Some(25.0)
        );
        // Overruns go negative
        assert_eq!(
            cost_variance_percentage(100_000.0, Some(150_000.0)),
            Some(-50.0)
        );
    }

    #[test]
    fn test_cost_variance_guards() {
        assert_eq!(cost_variance_percentage(0.0, Some(500.0)), None);
        assert_eq!(cost_variance_percentage(1_000.0, None), None);
    }

    #[test]
    fn test_delay_metrics_defined() {
        // Planned: Jan 1 -> Jun 30 (180 days). Actual end Jul 18 (+18 days).
        let (rate, days) = delay_metrics(
            Some(date(2025, 6, 30)),
            Some(date(2025, 1, 1)),
            Some(date(2025, 7, 18)),
        );
        assert_eq!(days, Some(18));
        assert_eq!(rate, Some(10.0));
    }

    #[test]
    fn test_delay_metrics_early_finish() {
        let (rate, days) = delay_metrics(
            Some(date(2025, 6, 30)),
            Some(date(2025, 1, 1)),
            Some(date(2025, 6, 12)),
        );
        assert_eq!(days, Some(-18));
        assert_eq!(rate, Some(-10.0));
    }

    #[test]
    fn test_delay_metrics_missing_dates() {
        assert_eq!(
            delay_metrics(None, Some(date(2025, 1, 1)), Some(date(2025, 2, 1))),
            (None, None)
        );
        assert_eq!(
            delay_metrics(Some(date(2025, 6, 30)), None, Some(date(2025, 7, 1))),
            (None, None)
        );
    }

    #[test]
    fn test_delay_metrics_inconsistent_schedule() {
        // Planned end before actual start: planned duration <= 0
        assert_eq!(
            delay_metrics(
                Some(date(2025, 1, 1)),
                Some(date(2025, 6, 1)),
                Some(date(2025, 7, 1)),
            ),
            (None, None)
        );
        // Actual end on actual start: actual duration <= 0
        assert_eq!(
            delay_metrics(
                Some(date(2025, 6, 30)),
                Some(date(2025, 1, 1)),
                Some(date(2025, 1, 1)),
            ),
            (None, None)
        );
    }

    #[test]
    fn test_cost_difference() {
        assert_eq!(
            cost_difference_percentage(Some(200_000.0), Some(150_000.0)),
            Some(25.0)
        );
        assert_eq!(cost_difference_percentage(Some(0.0), Some(1.0)), None);
        assert_eq!(cost_difference_percentage(None, Some(1.0)), None);
        assert_eq!(cost_difference_percentage(Some(1.0), None), None);
    }

    #[test]
    fn test_duration_difference() {
        assert_eq!(
            duration_difference_days(Some(date(2025, 6, 30)), Some(date(2025, 7, 10))),
            Some(10)
        );
        assert_eq!(duration_difference_days(None, Some(date(2025, 7, 10))), None);
    }

    #[test]
    fn test_delay_percentage() {
        // Expected: Mar 1 -> Jun 29 (120 days), actual end Jul 11 (+12 days) = 10%
        assert_eq!(
            delay_percentage(
                Some(date(2025, 6, 29)),
                Some(date(2025, 3, 1)),
                Some(date(2025, 7, 11)),
            ),
            Some(10.0)
        );
        // Non-positive expected duration
        assert_eq!(
            delay_percentage(
                Some(date(2025, 3, 1)),
                Some(date(2025, 3, 1)),
                Some(date(2025, 4, 1)),
            ),
            None
        );
        // Duration difference itself undefined without the end dates
        assert_eq!(
            delay_percentage(Some(date(2025, 6, 29)), Some(date(2025, 3, 1)), None),
            None
        );
    }
}
