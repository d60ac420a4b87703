//! Handlers for the CLI command tree

pub mod export;
pub mod import;
pub mod projects;
pub mod rates;
pub mod tracking;

use anyhow::{Context, Result};
use chrono::NaiveDate;

/// Parse a YYYY-MM-DD argument
pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date {:?}, expected YYYY-MM-DD", raw))
}

/// Parse and validate a comma-separated year-selection argument
pub(crate) fn parse_year_list(raw: &str) -> Result<Vec<String>> {
    let years = crate::excel::normalize::normalize_years(raw);
    for year in &years {
        if !crate::models::Project::is_valid_year(year) {
            anyhow::bail!(
                "Invalid year {:?}: selectable years are {}",
                year,
                crate::models::YEAR_CHOICES.join(", ")
            );
        }
    }
    Ok(years)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert!(parse_date("2025-07-01").is_ok());
        assert!(parse_date(" 2025-07-01 ").is_ok());
        assert!(parse_date("01/07/2025").is_err());
        assert!(parse_date("").is_err());
    }

    #[test]
    fn test_parse_year_list() {
        assert_eq!(parse_year_list("2025,2026").unwrap(), vec!["2025", "2026"]);
        assert!(parse_year_list("2029").is_err());
        assert!(parse_year_list("").unwrap().is_empty());
    }
}
