//! Spreadsheet import handler

use std::path::Path;

use anyhow::Result;
use colored::*;
use sqlx::SqlitePool;

use crate::excel;

pub async fn handle(file: &Path, pool: &SqlitePool) -> Result<()> {
    log::info!("importing projects from {}", file.display());

    let report = excel::import_projects(pool, file).await?;

    println!(
        "Imported {} of {} row(s)",
        report.imported.to_string().bright_green().bold(),
        report.total_rows
    );

    for warning in &report.skipped {
        println!("{} {}", "skipped:".yellow(), warning);
    }

    for error in report.error_summary() {
        println!("{} {}", "error:".red().bold(), error);
    }

    Ok(())
}
