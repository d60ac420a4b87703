//! One-to-one tracking companion to a project

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Planned vs. actual schedule and cost for a single project
///
/// The three derived fields are recomputed by the store adapter on every
/// save (see [`crate::metrics`]); they are never written by callers.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProjectTracking {
    /// Database ID (None if not yet persisted)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub project_id: i64,
    pub market_launch_date: Option<NaiveDate>,
    pub actual_costs: Option<f64>,
    pub planned_end_date: Option<NaiveDate>,
    pub actual_start_date: Option<NaiveDate>,
    pub actual_end_date: Option<NaiveDate>,
    /// Derived: (estimated − actual) / estimated × 100
    pub cost_variance_percentage: Option<f64>,
    /// Derived: delay days relative to the planned duration, in percent
    pub delay_rate: Option<f64>,
    /// Derived: actual end − planned end, in days
    pub delay_variance_days: Option<i64>,
}

impl ProjectTracking {
    /// True when the actual end ran past the planned end
    pub fn is_delayed(&self) -> bool {
        match (self.planned_end_date, self.actual_end_date) {
            (Some(planned), Some(actual)) => actual > planned,
            _ => false,
        }
    }

    /// Human-readable progress status, in the registry's Arabic
    pub fn status_display(&self) -> String {
        if self.actual_start_date.is_none() {
            "لم يبدأ بعد".to_string()
        } else if self.actual_end_date.is_none() {
            "قيد التنفيذ".to_string()
        } else if self.is_delayed() {
            match self.delay_variance_days {
                Some(days) => format!("متأخر - {} يوم", days.abs()),
                None => "قيد التنفيذ".to_string(),
            }
        } else {
            "مكتمل في الوقت المحدد".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_is_delayed() {
        let mut t = ProjectTracking::default();
        assert!(!t.is_delayed());

        t.planned_end_date = Some(date(2025, 6, 30));
        t.actual_end_date = Some(date(2025, 7, 15));
        assert!(t.is_delayed());

        t.actual_end_date = Some(date(2025, 6, 30));
        assert!(!t.is_delayed());
    }

    #[test]
    fn test_status_display_progression() {
        let mut t = ProjectTracking::default();
        assert_eq!(t.status_display(), "لم يبدأ بعد");

        t.actual_start_date = Some(date(2025, 1, 1));
        assert_eq!(t.status_display(), "قيد التنفيذ");

        t.planned_end_date = Some(date(2025, 6, 30));
        t.actual_end_date = Some(date(2025, 6, 20));
        assert_eq!(t.status_display(), "مكتمل في الوقت المحدد");

        t.actual_end_date = Some(date(2025, 7, 10));
        t.delay_variance_days = Some(10);
        assert_eq!(t.status_display(), "متأخر - 10 يوم");
    }
}
