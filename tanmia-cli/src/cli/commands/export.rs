//! Spreadsheet export handlers

use anyhow::Result;
use colored::*;
use sqlx::SqlitePool;

use crate::cli::ExportCommands;
use crate::excel;
use crate::store::{projects, rates};

pub async fn handle(command: ExportCommands, pool: &SqlitePool) -> Result<()> {
    match command {
        ExportCommands::Projects { out } => {
            let all = projects::list(pool, None, None).await?;
            excel::export_projects(&all, &out)?;
            println!(
                "Exported {} project(s) to {}",
                all.len().to_string().bright_green().bold(),
                out.display().to_string().cyan()
            );
        }
        ExportCommands::Rates { out, code, project } => {
            let rows = rates::list(pool, code.as_deref(), project.as_deref()).await?;
            excel::export_rates(&rows, &out)?;
            println!(
                "Exported {} snapshot(s) to {}",
                rows.len().to_string().bright_green().bold(),
                out.display().to_string().cyan()
            );
        }
        ExportCommands::Template { out } => {
            excel::write_import_template(&out)?;
            println!(
                "Wrote import template to {}",
                out.display().to_string().cyan()
            );
        }
    }

    Ok(())
}
