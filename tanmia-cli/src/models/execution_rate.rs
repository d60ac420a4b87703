//! Periodic execution-rate snapshots

use anyhow::{Result, bail};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A financial/physical progress snapshot for a project
///
/// Many snapshots accumulate per project over its lifetime. The three
/// derived fields are recomputed by the store adapter on every save.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExecutionRate {
    /// Database ID (None if not yet persisted)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub project_id: i64,
    pub programmed_amount: Option<f64>,
    pub partner_contribution: Option<f64>,
    pub programming_date: Option<NaiveDate>,
    pub market_launch_date: Option<NaiveDate>,
    pub actual_costs: Option<f64>,
    pub estimated_costs: Option<f64>,
    /// Derived: (estimated − actual) / estimated × 100
    pub cost_difference_percentage: Option<f64>,
    pub expected_end_date: Option<NaiveDate>,
    pub actual_start_date: Option<NaiveDate>,
    pub actual_end_date: Option<NaiveDate>,
    /// Derived: duration difference relative to the expected duration, in percent
    pub delay_percentage: Option<f64>,
    /// Derived: actual end − expected end, in days
    pub duration_difference_days: Option<i64>,
    /// Physical works progress, 0–100
    pub work_progress_percentage: Option<f64>,
    /// Financial achievement, 0–100
    pub financial_achievement_percentage: Option<f64>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ExecutionRate {
    /// Reject out-of-range progress percentages before any mutation
    pub fn validate(&self) -> Result<()> {
        check_percentage("work_progress_percentage", self.work_progress_percentage)?;
        check_percentage(
            "financial_achievement_percentage",
            self.financial_achievement_percentage,
        )?;
        Ok(())
    }
}

fn check_percentage(field: &str, value: Option<f64>) -> Result<()> {
    if let Some(v) = value {
        if !(0.0..=100.0).contains(&v) {
            bail!("{} must be between 0 and 100, got {}", field, v);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_bounds() {
        let rate = ExecutionRate {
            work_progress_percentage: Some(0.0),
            financial_achievement_percentage: Some(100.0),
            ..ExecutionRate::default()
        };
        assert!(rate.validate().is_ok());
    }

    #[test]
    fn test_validate_accepts_absent() {
        assert!(ExecutionRate::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let rate = ExecutionRate {
            work_progress_percentage: Some(101.0),
            ..ExecutionRate::default()
        };
        assert!(rate.validate().is_err());

        let rate = ExecutionRate {
            financial_achievement_percentage: Some(-0.5),
            ..ExecutionRate::default()
        };
        assert!(rate.validate().is_err());
    }
}
