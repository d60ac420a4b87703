//! Project import from spreadsheet files
//!
//! The file-level checks each fail with their own message before any row is
//! touched. After that every row stands alone: a bad row is reported and
//! the batch keeps going.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use calamine::{Data, Reader, open_workbook_auto};
use sqlx::SqlitePool;

use super::headers;
use super::normalize;
use crate::store::projects;

/// Upload ceiling, matching the registry's historical 5 MB limit
pub const MAX_IMPORT_BYTES: u64 = 5 * 1024 * 1024;

/// How many row errors the report prints before collapsing the rest
const ERROR_DISPLAY_CAP: usize = 5;

const OLE2_MAGIC: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Outcome of one import run
#[derive(Debug, Default)]
pub struct ImportReport {
    /// Data rows seen in the sheet
    pub total_rows: usize,
    /// Rows persisted
    pub imported: usize,
    /// Duplicate-code warnings, one per skipped row
    pub skipped: Vec<String>,
    /// Row-level failures, in row order
    pub errors: Vec<String>,
}

impl ImportReport {
    /// Error lines for display: the first few verbatim, the rest counted
    pub fn error_summary(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .errors
            .iter()
            .take(ERROR_DISPLAY_CAP)
            .cloned()
            .collect();
        if self.errors.len() > ERROR_DISPLAY_CAP {
            lines.push(format!(
                "... and {} more errors",
                self.errors.len() - ERROR_DISPLAY_CAP
            ));
        }
        lines
    }
}

/// File-level validation: extension, size, content magic. Runs before the
/// workbook is parsed so a bad upload never reaches row processing.
pub fn precheck_file(path: &Path) -> Result<()> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    if extension != "xls" && extension != "xlsx" {
        bail!("Unsupported file type: only .xls and .xlsx spreadsheets can be imported");
    }

    let metadata = std::fs::metadata(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    if metadata.len() > MAX_IMPORT_BYTES {
        bail!(
            "File is too large ({} bytes); the import limit is 5 MB",
            metadata.len()
        );
    }

    let mut magic = [0u8; 8];
    let mut file = std::fs::File::open(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    let read = file.read(&mut magic).unwrap_or(0);

    let matches = match extension.as_str() {
        // xlsx is a ZIP archive
        "xlsx" => read >= 2 && magic[..2] == [0x50, 0x4B],
        // xls is an OLE2 compound document
        "xls" => read >= 8 && magic == OLE2_MAGIC,
        _ => unreachable!(),
    };
    if !matches {
        bail!("File content does not match its extension; the file may be renamed or corrupt");
    }

    Ok(())
}

fn cell_to_string(cell: &Data) -> Option<String> {
    match cell {
        Data::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) => {
            if f.fract() == 0.0 {
                Some((*f as i64).to_string())
            } else {
                Some(f.to_string())
            }
        }
        Data::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Import projects from a spreadsheet file.
///
/// Headers may be the Arabic export labels or raw field names; unknown
/// columns are ignored. Rows whose code is already present (in the store
/// or earlier in the same file) are skipped with a warning. Each accepted
/// row is saved individually.
pub async fn import_projects(pool: &SqlitePool, path: &Path) -> Result<ImportReport> {
    precheck_file(path)?;

    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("Failed to open spreadsheet (corrupt file?): {}", path.display()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .context("The spreadsheet has no sheets")?
        .clone();
    let range = workbook
        .worksheet_range(&sheet_name)
        .with_context(|| format!("Failed to read sheet: {}", sheet_name))?;

    let rows: Vec<_> = range.rows().collect();
    if rows.len() < 2 {
        bail!("The spreadsheet is empty or contains no data rows");
    }

    // Header row: map Arabic labels (or raw names) to canonical fields.
    // Unrecognized headers stay as-is and simply never match a field.
    let fields: Vec<String> = rows[0]
        .iter()
        .map(|cell| {
            let raw = cell_to_string(cell).unwrap_or_default();
            headers::header_to_field(&raw).to_string()
        })
        .collect();

    let mut known_codes = projects::all_codes(pool).await?;
    let mut report = ImportReport::default();

    for (row_idx, row) in rows.iter().enumerate().skip(1) {
        let row_num = row_idx + 1; // 1-based, matching what the user sees in Excel

        let mut cells: HashMap<String, String> = HashMap::new();
        for (field, cell) in fields.iter().zip(row.iter()) {
            if !headers::is_project_field(field) {
                continue;
            }
            if let Some(value) = cell_to_string(cell) {
                cells.insert(field.clone(), value);
            }
        }
        if cells.is_empty() {
            continue;
        }
        report.total_rows += 1;

        let project = normalize::build_project(cells);

        if known_codes.contains(&project.code) {
            log::warn!("row {}: duplicate code {}, skipped", row_num, project.code);
            report.skipped.push(format!(
                "Row {}: project {} already exists, skipped",
                row_num, project.code
            ));
            continue;
        }

        match projects::insert(pool, &project).await {
            Ok(_) => {
                log::debug!("row {}: imported {}", row_num, project.code);
                known_codes.insert(project.code);
                report.imported += 1;
            }
            Err(e) => {
                log::error!("row {}: {:#}", row_num, e);
                report
                    .errors
                    .push(format!("Row {}: {:#}", row_num, e));
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::test_pool;
    use rust_xlsxwriter::Workbook;

    fn write_fixture(name: &str, rows: &[Vec<&str>]) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(name);
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                worksheet
                    .write_string(r as u32, c as u16, *value)
                    .unwrap();
            }
        }
        workbook.save(&path).unwrap();
        path
    }

    #[tokio::test]
    async fn test_import_with_duplicates_and_generated_codes() {
        let pool = test_pool().await;
        let path = write_fixture(
            "tanmia_import_fixture.xlsx",
            &[
                vec!["code", "program", "implementation_years", "area"],
                vec!["PRJ-SAME", "برنامج أ", "2025,2026", "1,000.5 sqm"],
                vec!["PRJ-SAME", "برنامج ب", "2025", "10"],
                vec!["", "برنامج ج", "[\"2024\"]", ""],
            ],
        );

        let report = import_projects(&pool, &path).await.unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(report.total_rows, 3);
        assert_eq!(report.imported, 2);
        assert_eq!(report.skipped.len(), 1);
        assert!(report.skipped[0].contains("PRJ-SAME"));
        assert!(report.errors.is_empty());

        // First occurrence won; the duplicate never overwrote it
        let kept = crate::store::projects::get_by_code(&pool, "PRJ-SAME")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(kept.program, "برنامج أ");
        assert_eq!(kept.area, 1000.5);
        assert_eq!(kept.implementation_years, vec!["2025", "2026"]);

        // The codeless row got a generated code
        let all = crate::store::projects::list(&pool, None, None).await.unwrap();
        let generated = all.iter().find(|p| p.program == "برنامج ج").unwrap();
        assert!(generated.code.starts_with("PRJ-"));
        assert_eq!(generated.budget_years, Vec::<String>::new());
        assert_eq!(generated.implementation_years, vec!["2024"]);
    }

    #[tokio::test]
    async fn test_import_skips_codes_already_in_store() {
        let pool = test_pool().await;
        let existing = crate::excel::normalize::build_project(
            [("code".to_string(), "PRJ-OLD".to_string())].into(),
        );
        crate::store::projects::insert(&pool, &existing).await.unwrap();

        let path = write_fixture(
            "tanmia_import_existing.xlsx",
            &[
                vec!["الرمز", "البرنامج"],
                vec!["PRJ-OLD", "برنامج جديد"],
            ],
        );
        let report = import_projects(&pool, &path).await.unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(report.imported, 0);
        assert_eq!(report.skipped.len(), 1);

        let kept = crate::store::projects::get_by_code(&pool, "PRJ-OLD")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(kept.program, "برنامج غير محدد");
    }

    #[test]
    fn test_error_summary_caps_output() {
        let report = ImportReport {
            errors: (1..=8).map(|i| format!("Row {}: bad", i)).collect(),
            ..ImportReport::default()
        };
        let summary = report.error_summary();
        assert_eq!(summary.len(), 6);
        assert_eq!(summary[0], "Row 1: bad");
        assert_eq!(summary[5], "... and 3 more errors");
    }

    #[test]
    fn test_error_summary_short_list() {
        let report = ImportReport {
            errors: vec!["Row 2: bad".to_string()],
            ..ImportReport::default()
        };
        assert_eq!(report.error_summary(), vec!["Row 2: bad".to_string()]);
    }

    #[test]
    fn test_precheck_rejects_extension() {
        let dir = std::env::temp_dir();
        let path = dir.join("projects.csv");
        std::fs::write(&path, b"code,program").unwrap();
        let err = precheck_file(&path).unwrap_err().to_string();
        assert!(err.contains("Unsupported file type"), "{}", err);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_precheck_rejects_oversize() {
        let dir = std::env::temp_dir();
        let path = dir.join("huge.xlsx");
        let blob = vec![0x50u8; (MAX_IMPORT_BYTES + 1) as usize];
        std::fs::write(&path, &blob).unwrap();
        let err = precheck_file(&path).unwrap_err().to_string();
        assert!(err.contains("too large"), "{}", err);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_precheck_rejects_wrong_magic() {
        let dir = std::env::temp_dir();
        let path = dir.join("renamed.xlsx");
        std::fs::write(&path, b"this is not a zip archive").unwrap();
        let err = precheck_file(&path).unwrap_err().to_string();
        assert!(err.contains("does not match"), "{}", err);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_cell_to_string_shapes() {
        assert_eq!(cell_to_string(&Data::String("  x ".into())), Some("x".into()));
        assert_eq!(cell_to_string(&Data::String("   ".into())), None);
        assert_eq!(cell_to_string(&Data::Float(2025.0)), Some("2025".into()));
        assert_eq!(cell_to_string(&Data::Float(1000.5)), Some("1000.5".into()));
        assert_eq!(cell_to_string(&Data::Int(12)), Some("12".into()));
        assert_eq!(cell_to_string(&Data::Empty), None);
    }
}
