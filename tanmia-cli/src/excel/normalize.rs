//! Row normalization for the project importer
//!
//! Imported rows arrive as loosely-typed cell strings keyed by canonical
//! field name. Normalization fills the gaps the way the registry's data
//! entry always has: generated codes, cleaned numerics with field defaults,
//! year lists coerced from whatever shape the file used, and Arabic
//! placeholder text for required fields left blank.

use std::collections::HashMap;

use chrono::{Datelike, Local};
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;

use crate::models::Project;

static NON_NUMERIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^0-9.\-]").expect("valid regex"));

/// Defaults for required text fields left blank in an imported row
pub static REQUIRED_TEXT_DEFAULTS: [(&str, &str); 7] = [
    ("program", "برنامج غير محدد"),
    ("projects", "مشروع جديد"),
    ("location", "غير محدد"),
    ("district", "غير محدد"),
    ("components", "غير محدد"),
    ("target_group", "غير محدد"),
    ("property_status", "غير محدد"),
];

/// Strip everything but digits, `.` and `-`, then parse as a decimal.
/// `"1,000.5 sqm"` parses to `1000.5`; pure prose parses to nothing.
pub fn clean_number(raw: &str) -> Option<f64> {
    let cleaned = NON_NUMERIC.replace_all(raw, "");
    let cleaned = cleaned.as_ref();
    if cleaned.is_empty() || cleaned == "." || cleaned == "-" {
        return None;
    }
    cleaned.parse().ok()
}

/// Synthesize a project code: `PRJ-<YYYYMMDD>-<4-digit-random>`
pub fn generate_code() -> String {
    let today = Local::now().date_naive();
    let suffix: u32 = rand::rng().random_range(1000..=9999);
    format!("PRJ-{}-{}", today.format("%Y%m%d"), suffix)
}

/// Coerce a year-list cell to a list of year strings.
///
/// Accepts a bracketed JSON-like list (`["2025","2026"]`), a
/// comma-separated string (`2025,2026`), or a single bare value. Blank
/// entries are dropped.
pub fn normalize_years(raw: &str) -> Vec<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Vec::new();
    }

    if raw.starts_with('[') && raw.ends_with(']') {
        if let Ok(values) = serde_json::from_str::<Vec<serde_json::Value>>(raw) {
            return values
                .into_iter()
                .filter_map(|v| match v {
                    serde_json::Value::String(s) => Some(s.trim().to_string()),
                    serde_json::Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .filter(|s| !s.is_empty())
                .collect();
        }
        // Not valid JSON after all: fall through with the brackets shed
        return split_years(raw.trim_start_matches('[').trim_end_matches(']'));
    }

    split_years(raw)
}

fn split_years(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|part| part.trim().trim_matches(|c| c == '"' || c == '\'').trim())
        .filter(|part| !part.is_empty())
        .map(String::from)
        .collect()
}

fn take(cells: &mut HashMap<String, String>, field: &str) -> Option<String> {
    cells
        .remove(field)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn take_number(cells: &mut HashMap<String, String>, field: &str, default: f64) -> f64 {
    take(cells, field)
        .as_deref()
        .and_then(clean_number)
        .unwrap_or(default)
}

fn take_text_or(cells: &mut HashMap<String, String>, field: &str) -> String {
    if let Some(value) = take(cells, field) {
        return value;
    }
    REQUIRED_TEXT_DEFAULTS
        .iter()
        .find(|(name, _)| *name == field)
        .map(|(_, default)| default.to_string())
        .unwrap_or_default()
}

/// Build a [`Project`] from one normalized import row.
///
/// `cells` maps canonical field names to trimmed cell text; missing or
/// unparseable values fall back to the registry's defaults.
pub fn build_project(mut cells: HashMap<String, String>) -> Project {
    let code = take(&mut cells, "code").unwrap_or_else(generate_code);

    let area = take_number(&mut cells, "area", 0.0);
    let property_prep_cost = take_number(&mut cells, "property_prep_cost", 0.0);
    let estimated_cost = take_number(&mut cells, "estimated_cost", 0.0);
    let estimated_duration =
        take_number(&mut cells, "estimated_duration", 12.0).max(0.0) as u32;
    let current_year = Local::now().year() as f64;
    let start_year = take_number(&mut cells, "start_year", current_year).max(0.0) as u32;

    let implementation_years = take(&mut cells, "implementation_years")
        .map(|v| normalize_years(&v))
        .unwrap_or_default();
    let budget_years = take(&mut cells, "budget_years")
        .map(|v| normalize_years(&v))
        .unwrap_or_default();

    Project {
        id: None,
        code,
        program: take_text_or(&mut cells, "program"),
        projects: take_text_or(&mut cells, "projects"),
        location: take_text_or(&mut cells, "location"),
        district: take_text_or(&mut cells, "district"),
        planning_code: take(&mut cells, "planning_code"),
        development_goals: take(&mut cells, "development_goals"),
        components: take_text_or(&mut cells, "components"),
        target_group: take_text_or(&mut cells, "target_group"),
        project_goals: take(&mut cells, "project_goals"),
        property_status: take_text_or(&mut cells, "property_status"),
        property_drawing: take(&mut cells, "property_drawing"),
        area,
        property_prep_cost,
        studies: take(&mut cells, "studies"),
        achievements: take(&mut cells, "achievements"),
        estimated_cost,
        start_year,
        estimated_duration,
        implementation_years,
        budget_years,
        indicator_1: take(&mut cells, "indicator_1"),
        indicator_2: take(&mut cells, "indicator_2"),
        indicator_3: take(&mut cells, "indicator_3"),
        potential_partners: take(&mut cells, "potential_partners"),
        funding_sources: take(&mut cells, "funding_sources"),
        created_at: None,
        updated_at: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_clean_number() {
        assert_eq!(clean_number("1,000.5 sqm"), Some(1000.5));
        assert_eq!(clean_number("50000.00 درهم"), Some(50000.0));
        assert_eq!(clean_number("-12"), Some(-12.0));
        assert_eq!(clean_number("غير محدد"), None);
        assert_eq!(clean_number(""), None);
        assert_eq!(clean_number("."), None);
    }

    #[test]
    fn test_generate_code_shape() {
        let code = generate_code();
        let re = Regex::new(r"^PRJ-\d{8}-\d{4}$").unwrap();
        assert!(re.is_match(&code), "unexpected code {}", code);
    }

    #[test]
    fn test_normalize_years_shapes() {
        assert_eq!(normalize_years("2025,2026"), vec!["2025", "2026"]);
        assert_eq!(normalize_years(" 2025 , 2026 "), vec!["2025", "2026"]);
        assert_eq!(
            normalize_years(r#"["2025", "2026"]"#),
            vec!["2025", "2026"]
        );
        assert_eq!(normalize_years("[2025, 2026]"), vec!["2025", "2026"]);
        assert_eq!(normalize_years("2025"), vec!["2025"]);
        assert!(normalize_years("").is_empty());
        assert!(normalize_years("[]").is_empty());
    }

    #[test]
    fn test_build_project_generates_code() {
        let project = build_project(row(&[("program", "برنامج")]));
        assert!(project.code.starts_with("PRJ-"));
        assert_eq!(project.code.len(), "PRJ-20250101-1234".len());
    }

    #[test]
    fn test_build_project_keeps_explicit_code() {
        let project = build_project(row(&[("code", "CUSTOM-001")]));
        assert_eq!(project.code, "CUSTOM-001");
    }

    #[test]
    fn test_build_project_numeric_defaults() {
        let project = build_project(row(&[
            ("area", "1,000.5 sqm"),
            ("estimated_cost", "نص غير رقمي"),
            ("estimated_duration", ""),
        ]));
        assert_eq!(project.area, 1000.5);
        assert_eq!(project.estimated_cost, 0.0);
        assert_eq!(project.estimated_duration, 12);
        assert_eq!(project.start_year, Local::now().year() as u32);
    }

    #[test]
    fn test_build_project_text_defaults() {
        let project = build_project(row(&[("location", "  ")]));
        assert_eq!(project.program, "برنامج غير محدد");
        assert_eq!(project.projects, "مشروع جديد");
        assert_eq!(project.location, "غير محدد");
        assert_eq!(project.property_status, "غير محدد");
        // Optional fields stay absent
        assert_eq!(project.planning_code, None);
        assert_eq!(project.studies, None);
    }

    #[test]
    fn test_build_project_year_lists() {
        let project = build_project(row(&[
            ("implementation_years", "2025,2026"),
            ("budget_years", r#"["2024"]"#),
        ]));
        assert_eq!(project.implementation_years, vec!["2025", "2026"]);
        assert_eq!(project.budget_years, vec!["2024"]);
    }
}
