//! Import-template generator
//!
//! Writes a workbook whose header row is the raw field names the importer
//! accepts, pre-filled with two sample projects so data-entry staff can see
//! the expected shape of every column.

use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::Workbook;

use super::headers::TEMPLATE_FIELDS;

/// Two sample rows mirroring the import column layout. The first leaves
/// `code` blank to show that codes are generated when omitted.
const SAMPLE_ROWS: [[&str; 26]; 2] = [
    [
        "",
        "برنامج التنمية المحلية",
        "مشروع نموذجي",
        "الرباط",
        "أكدال",
        "PLAN-001",
        "تحسين البنية التحتية",
        "بناء وتجهيز",
        "السكان المحليون",
        "تحسين جودة الحياة",
        "ملكية عمومية",
        "R-2023-001",
        "1000.00",
        "50000.00",
        "دراسات الجدوى",
        "تم إنجاز 50%",
        "1000000.00",
        "2025",
        "12",
        "2025,2026",
        "2025,2026",
        "مؤشر الأداء 1",
        "مؤشر الأداء 2",
        "مؤشر الأداء 3",
        "الوزارة المكلفة بالإسكان",
        "الميزانية العامة للدولة",
    ],
    [
        "CUSTOM-CODE-001",
        "برنامج التنمية القروية",
        "مشروع تنموي",
        "مراكش",
        "سيدي يوسف بن علي",
        "PLAN-002",
        "تعزيز البنية التحتية الريفية",
        "تعبيد الطرق",
        "سكان العالم القروي",
        "تحسين التنقل",
        "ملكية جماعية",
        "R-2023-002",
        "2000.50",
        "75000.00",
        "دراسات تقنية",
        "في طور الإنجاز",
        "2500000.00",
        "2024",
        "18",
        "2024,2025,2026",
        "2024,2025",
        "مؤشر التنقل",
        "مؤشر الرضا",
        "مؤشر الجودة",
        "المجلس الإقليمي",
        "صندوق التنمية القروية",
    ],
];

/// Write the import template to `path`
pub fn write_import_template(path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (col, field) in TEMPLATE_FIELDS.iter().enumerate() {
        worksheet.write_string(0, col as u16, *field)?;
    }

    for (row_idx, sample) in SAMPLE_ROWS.iter().enumerate() {
        let row = (row_idx + 1) as u32;
        for (col, value) in sample.iter().enumerate() {
            if !value.is_empty() {
                worksheet.write_string(row, col as u16, *value)?;
            }
        }
    }

    workbook
        .save(path)
        .with_context(|| format!("Failed to save template: {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_rows_match_template_width() {
        for sample in &SAMPLE_ROWS {
            assert_eq!(sample.len(), TEMPLATE_FIELDS.len());
        }
    }

    #[test]
    fn test_template_rows_normalize_cleanly() {
        use crate::excel::normalize::build_project;
        use std::collections::HashMap;

        let cells: HashMap<String, String> = TEMPLATE_FIELDS
            .iter()
            .zip(SAMPLE_ROWS[1].iter())
            .map(|(f, v)| (f.to_string(), v.to_string()))
            .collect();

        let project = build_project(cells);
        assert_eq!(project.code, "CUSTOM-CODE-001");
        assert_eq!(project.area, 2000.5);
        assert_eq!(project.start_year, 2024);
        assert_eq!(
            project.implementation_years,
            vec!["2024", "2025", "2026"]
        );
    }
}
