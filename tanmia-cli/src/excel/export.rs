//! Styled spreadsheet export
//!
//! Both workbooks are right-to-left with Arabic headers: the full project
//! table and the (optionally filtered) execution-rate set. Column order,
//! labels and widths come from the static tables in [`super::headers`].

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Local, NaiveDate, Utc};
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet};

use super::headers::{Column, PROJECT_EXPORT_COLUMNS, RATE_EXPORT_COLUMNS};
use crate::models::Project;
use crate::store::rates::RateRow;

const HEADER_GRAY: Color = Color::RGB(0x808080);
const HEADER_NAVY: Color = Color::RGB(0x000080);

fn header_format(background: Color) -> Format {
    Format::new()
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(background)
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_text_wrap()
        .set_border(FormatBorder::Thin)
}

// Every data row gets the same background; see DESIGN.md on the dropped
// alternate-row banding.
fn data_format() -> Format {
    Format::new()
        .set_align(FormatAlign::Right)
        .set_align(FormatAlign::VerticalCenter)
        .set_text_wrap()
        .set_border(FormatBorder::Thin)
}

fn money_format() -> Format {
    data_format().set_num_format("#,##0.00")
}

fn percent_format() -> Format {
    data_format().set_num_format("0.00%")
}

/// Render a money amount with thousands separators and two decimals
pub fn format_thousands(value: f64) -> String {
    let negative = value < 0.0;
    let formatted = format!("{:.2}", value.abs());
    let (int_part, frac_part) = formatted.split_once('.').unwrap_or((&formatted, "00"));

    let mut grouped = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let grouped: String = grouped.chars().rev().collect();

    let sign = if negative { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, frac_part)
}

fn local_date(timestamp: Option<DateTime<Utc>>) -> String {
    timestamp
        .map(|t| t.with_timezone(&Local).format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn naive_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn write_header_row(
    worksheet: &mut Worksheet,
    columns: &[Column],
    background: Color,
) -> Result<()> {
    let format = header_format(background);
    for (col_idx, column) in columns.iter().enumerate() {
        let col = col_idx as u16;
        worksheet.set_column_width(col, column.width)?;
        worksheet.write_string_with_format(0, col, column.label, &format)?;
    }
    worksheet.set_row_height(0, 26)?;
    Ok(())
}

/// Write the full project table to `path`
pub fn export_projects(projects: &[Project], path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("المشاريع")?;
    worksheet.set_right_to_left(true);

    write_header_row(worksheet, &PROJECT_EXPORT_COLUMNS, HEADER_GRAY)?;

    let format = data_format();
    for (row_idx, project) in projects.iter().enumerate() {
        let row = (row_idx + 1) as u32;
        for (col_idx, column) in PROJECT_EXPORT_COLUMNS.iter().enumerate() {
            let value = project_cell(project, column.field);
            worksheet.write_string_with_format(row, col_idx as u16, &value, &format)?;
        }
    }

    workbook
        .save(path)
        .with_context(|| format!("Failed to save Excel file: {}", path.display()))?;

    Ok(())
}

fn project_cell(project: &Project, field: &str) -> String {
    let opt = |v: &Option<String>| v.clone().unwrap_or_default();
    match field {
        "code" => project.code.clone(),
        "program" => project.program.clone(),
        "projects" => project.projects.clone(),
        "location" => project.location.clone(),
        "district" => project.district.clone(),
        "planning_code" => opt(&project.planning_code),
        "development_goals" => opt(&project.development_goals),
        "components" => project.components.clone(),
        "target_group" => project.target_group.clone(),
        "property_status" => project.property_status.clone(),
        "property_drawing" => opt(&project.property_drawing),
        "area" => format!("{:.2}", project.area),
        "property_prep_cost" => format_thousands(project.property_prep_cost),
        "studies" => opt(&project.studies),
        "achievements" => opt(&project.achievements),
        "estimated_cost" => format_thousands(project.estimated_cost),
        "start_year" => project.start_year.to_string(),
        "estimated_duration" => project.estimated_duration.to_string(),
        "implementation_years" => project.implementation_years.join(", "),
        "budget_years" => project.budget_years.join(", "),
        "indicator_1" => opt(&project.indicator_1),
        "indicator_2" => opt(&project.indicator_2),
        "indicator_3" => opt(&project.indicator_3),
        "potential_partners" => opt(&project.potential_partners),
        "funding_sources" => opt(&project.funding_sources),
        other => {
            debug_assert!(false, "unmapped export field {}", other);
            String::new()
        }
    }
}

/// Write the execution-rate set to `path`
pub fn export_rates(rows: &[RateRow], path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("معدلات التنفيذ")?;
    worksheet.set_right_to_left(true);

    write_header_row(worksheet, &RATE_EXPORT_COLUMNS, HEADER_NAVY)?;

    let text = data_format();
    let money = money_format();
    let percent = percent_format();

    for (row_idx, entry) in rows.iter().enumerate() {
        let row = (row_idx + 1) as u32;
        let rate = &entry.rate;

        for (col_idx, column) in RATE_EXPORT_COLUMNS.iter().enumerate() {
            let col = col_idx as u16;
            match column.field {
                "code" => {
                    worksheet.write_string_with_format(row, col, &entry.project_code, &text)?;
                }
                "program" => {
                    worksheet.write_string_with_format(row, col, &entry.project_program, &text)?;
                }
                "projects" => {
                    worksheet.write_string_with_format(row, col, &entry.project_projects, &text)?;
                }
                "programmed_amount" => {
                    worksheet.write_number_with_format(
                        row,
                        col,
                        rate.programmed_amount.unwrap_or(0.0),
                        &money,
                    )?;
                }
                "partner_contribution" => {
                    worksheet.write_number_with_format(
                        row,
                        col,
                        rate.partner_contribution.unwrap_or(0.0),
                        &money,
                    )?;
                }
                "programming_date" => {
                    worksheet.write_string_with_format(
                        row,
                        col,
                        &naive_date(rate.programming_date),
                        &text,
                    )?;
                }
                "market_launch_date" => {
                    worksheet.write_string_with_format(
                        row,
                        col,
                        &naive_date(rate.market_launch_date),
                        &text,
                    )?;
                }
                "actual_costs" => {
                    worksheet.write_number_with_format(
                        row,
                        col,
                        rate.actual_costs.unwrap_or(0.0),
                        &money,
                    )?;
                }
                "estimated_costs" => {
                    worksheet.write_number_with_format(
                        row,
                        col,
                        rate.estimated_costs.unwrap_or(0.0),
                        &money,
                    )?;
                }
                // Stored 0-100; the cell format expects a fraction
                "cost_difference_percentage" => {
                    worksheet.write_number_with_format(
                        row,
                        col,
                        rate.cost_difference_percentage.unwrap_or(0.0) / 100.0,
                        &percent,
                    )?;
                }
                "expected_end_date" => {
                    worksheet.write_string_with_format(
                        row,
                        col,
                        &naive_date(rate.expected_end_date),
                        &text,
                    )?;
                }
                "actual_start_date" => {
                    worksheet.write_string_with_format(
                        row,
                        col,
                        &naive_date(rate.actual_start_date),
                        &text,
                    )?;
                }
                "actual_end_date" => {
                    worksheet.write_string_with_format(
                        row,
                        col,
                        &naive_date(rate.actual_end_date),
                        &text,
                    )?;
                }
                "duration_difference_days" => {
                    worksheet.write_number_with_format(
                        row,
                        col,
                        rate.duration_difference_days.unwrap_or(0) as f64,
                        &money,
                    )?;
                }
                "delay_percentage" => {
                    worksheet.write_number_with_format(
                        row,
                        col,
                        rate.delay_percentage.unwrap_or(0.0) / 100.0,
                        &percent,
                    )?;
                }
                "work_progress_percentage" => {
                    worksheet.write_number_with_format(
                        row,
                        col,
                        rate.work_progress_percentage.unwrap_or(0.0) / 100.0,
                        &percent,
                    )?;
                }
                "financial_achievement_percentage" => {
                    worksheet.write_number_with_format(
                        row,
                        col,
                        rate.financial_achievement_percentage.unwrap_or(0.0) / 100.0,
                        &percent,
                    )?;
                }
                "created_at" => {
                    worksheet.write_string_with_format(
                        row,
                        col,
                        &local_date(rate.created_at),
                        &text,
                    )?;
                }
                "updated_at" => {
                    worksheet.write_string_with_format(
                        row,
                        col,
                        &local_date(rate.updated_at),
                        &text,
                    )?;
                }
                other => {
                    debug_assert!(false, "unmapped export field {}", other);
                }
            }
        }
    }

    workbook
        .save(path)
        .with_context(|| format!("Failed to save Excel file: {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(1_000_000.0), "1,000,000.00");
        assert_eq!(format_thousands(1234.5), "1,234.50");
        assert_eq!(format_thousands(999.0), "999.00");
        assert_eq!(format_thousands(0.0), "0.00");
        assert_eq!(format_thousands(-50_000.25), "-50,000.25");
    }

    #[test]
    fn test_project_cell_rendering() {
        let project = Project {
            code: "PRJ-1".to_string(),
            area: 1000.5,
            estimated_cost: 2_500_000.0,
            start_year: 2024,
            estimated_duration: 18,
            implementation_years: vec!["2024".to_string(), "2025".to_string()],
            ..Project::default()
        };

        assert_eq!(project_cell(&project, "code"), "PRJ-1");
        assert_eq!(project_cell(&project, "area"), "1000.50");
        assert_eq!(project_cell(&project, "estimated_cost"), "2,500,000.00");
        assert_eq!(project_cell(&project, "implementation_years"), "2024, 2025");
        // Absent optional text renders empty
        assert_eq!(project_cell(&project, "studies"), "");
    }

    #[test]
    fn test_naive_date_rendering() {
        let d = NaiveDate::from_ymd_opt(2025, 7, 1);
        assert_eq!(naive_date(d), "2025-07-01");
        assert_eq!(naive_date(None), "");
    }

    #[tokio::test]
    async fn test_export_reimports_equivalently() {
        use crate::excel::import::import_projects;
        use crate::store::{projects, test_pool};

        let original = Project {
            code: "PRJ-RT-1".to_string(),
            program: "برنامج التنمية المحلية".to_string(),
            projects: "مشروع نموذجي".to_string(),
            location: "الرباط".to_string(),
            district: "أكدال".to_string(),
            components: "بناء وتجهيز".to_string(),
            target_group: "السكان المحليون".to_string(),
            property_status: "ملكية عمومية".to_string(),
            studies: Some("12500.50".to_string()),
            area: 1000.5,
            property_prep_cost: 50_000.0,
            estimated_cost: 1_000_000.0,
            start_year: 2025,
            estimated_duration: 12,
            implementation_years: vec!["2025".to_string(), "2026".to_string()],
            budget_years: vec!["2025".to_string()],
            ..Project::default()
        };

        let path = std::env::temp_dir().join("tanmia_roundtrip.xlsx");
        export_projects(std::slice::from_ref(&original), &path).unwrap();

        let pool = test_pool().await;
        let report = import_projects(&pool, &path).await.unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(report.imported, 1);

        let loaded = projects::get_by_code(&pool, "PRJ-RT-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.program, original.program);
        assert_eq!(loaded.district, original.district);
        assert_eq!(loaded.studies, original.studies);
        assert_eq!(loaded.area, original.area);
        // The thousands separators written on export clean away on import
        assert_eq!(loaded.property_prep_cost, original.property_prep_cost);
        assert_eq!(loaded.estimated_cost, original.estimated_cost);
        assert_eq!(loaded.start_year, original.start_year);
        assert_eq!(loaded.implementation_years, original.implementation_years);
        assert_eq!(loaded.budget_years, original.budget_years);
    }
}
