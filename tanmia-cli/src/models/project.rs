//! The master project record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Years selectable for implementation/budget planning
pub const YEAR_CHOICES: [&str; 7] = ["2022", "2023", "2024", "2025", "2026", "2027", "2028"];

/// A public investment project
///
/// `code` is the human-facing identity and is unique across the registry.
/// The two year lists hold ordered selections from [`YEAR_CHOICES`] and are
/// persisted as JSON text columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Database ID (None if not yet persisted)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub code: String,
    pub program: String,
    /// Free-text description of the works covered by the project
    pub projects: String,
    pub location: String,
    pub district: String,
    pub planning_code: Option<String>,
    pub development_goals: Option<String>,
    pub components: String,
    pub target_group: String,
    pub project_goals: Option<String>,
    pub property_status: String,
    pub property_drawing: Option<String>,
    /// Square meters
    pub area: f64,
    /// Moroccan dirhams
    pub property_prep_cost: f64,
    pub studies: Option<String>,
    pub achievements: Option<String>,
    /// Moroccan dirhams
    pub estimated_cost: f64,
    pub start_year: u32,
    /// Months
    pub estimated_duration: u32,
    pub implementation_years: Vec<String>,
    pub budget_years: Vec<String>,
    pub indicator_1: Option<String>,
    pub indicator_2: Option<String>,
    pub indicator_3: Option<String>,
    pub potential_partners: Option<String>,
    pub funding_sources: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Project {
    /// Check a year string against the fixed selectable set
    pub fn is_valid_year(year: &str) -> bool {
        YEAR_CHOICES.contains(&year)
    }

    /// Total estimated cost: property preparation cost plus whatever of the
    /// `studies` and `achievements` free-text fields parses as a number.
    /// Non-numeric text contributes zero.
    pub fn total_estimated_cost(&self) -> f64 {
        let parse_or_zero = |text: &Option<String>| {
            text.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .and_then(|s| s.parse::<f64>().ok())
                .unwrap_or(0.0)
        };

        self.property_prep_cost + parse_or_zero(&self.studies) + parse_or_zero(&self.achievements)
    }
}

impl std::fmt::Display for Project {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.code, self.program)
    }
}

impl Default for Project {
    fn default() -> Self {
        Project {
            id: None,
            code: String::new(),
            program: String::new(),
            projects: String::new(),
            location: String::new(),
            district: String::new(),
            planning_code: None,
            development_goals: None,
            components: String::new(),
            target_group: String::new(),
            project_goals: None,
            property_status: String::new(),
            property_drawing: None,
            area: 0.0,
            property_prep_cost: 0.0,
            studies: None,
            achievements: None,
            estimated_cost: 0.0,
            start_year: 0,
            estimated_duration: 0,
            implementation_years: Vec::new(),
            budget_years: Vec::new(),
            indicator_1: None,
            indicator_2: None,
            indicator_3: None,
            potential_partners: None,
            funding_sources: None,
            created_at: None,
            updated_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project_with_costs(prep: f64, studies: Option<&str>, achievements: Option<&str>) -> Project {
        Project {
            property_prep_cost: prep,
            studies: studies.map(String::from),
            achievements: achievements.map(String::from),
            ..Project::default()
        }
    }

    #[test]
    fn test_total_estimated_cost_sums_numeric_text() {
        let p = project_with_costs(50000.0, Some("12500.50"), Some("2000"));
        assert_eq!(p.total_estimated_cost(), 64500.50);
    }

    #[test]
    fn test_total_estimated_cost_ignores_prose() {
        let p = project_with_costs(50000.0, Some("دراسات الجدوى"), Some("تم إنجاز 50%"));
        assert_eq!(p.total_estimated_cost(), 50000.0);
    }

    #[test]
    fn test_total_estimated_cost_blank_fields() {
        let p = project_with_costs(0.0, Some("   "), None);
        assert_eq!(p.total_estimated_cost(), 0.0);
    }

    #[test]
    fn test_year_choices() {
        assert!(Project::is_valid_year("2022"));
        assert!(Project::is_valid_year("2028"));
        assert!(!Project::is_valid_year("2029"));
        assert!(!Project::is_valid_year(""));
    }
}
