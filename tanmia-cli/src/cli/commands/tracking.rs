//! Tracking record handlers

use anyhow::{Context, Result, bail};
use colored::*;
use sqlx::SqlitePool;

use super::parse_date;
use crate::cli::{TrackingCommands, TrackingSetArgs};
use crate::excel::export::format_thousands;
use crate::models::ProjectTracking;
use crate::store::{projects, tracking};

pub async fn handle(command: TrackingCommands, pool: &SqlitePool) -> Result<()> {
    match command {
        TrackingCommands::Set { code, fields } => set(&code, fields, pool).await,
        TrackingCommands::Show { code } => show(&code, pool).await,
    }
}

async fn set(code: &str, fields: TrackingSetArgs, pool: &SqlitePool) -> Result<()> {
    let Some(project) = projects::get_by_code(pool, code).await? else {
        bail!("No project with code {}", code);
    };
    let project_id = project
        .id
        .context("loaded project is missing its row id")?;

    // Merge onto the existing record so a partial `set` does not wipe
    // previously entered dates
    let mut record = tracking::get(pool, project_id)
        .await?
        .unwrap_or_default();

    if let Some(raw) = fields.market_launch_date {
        record.market_launch_date = Some(parse_date(&raw)?);
    }
    if let Some(v) = fields.actual_costs {
        if v < 0.0 {
            bail!("actual-costs must be non-negative, got {}", v);
        }
        record.actual_costs = Some(v);
    }
    if let Some(raw) = fields.planned_end_date {
        record.planned_end_date = Some(parse_date(&raw)?);
    }
    if let Some(raw) = fields.actual_start_date {
        record.actual_start_date = Some(parse_date(&raw)?);
    }
    if let Some(raw) = fields.actual_end_date {
        record.actual_end_date = Some(parse_date(&raw)?);
    }

    tracking::upsert(pool, &project, &mut record).await?;

    println!("Tracking saved for {}", project.code.bright_green().bold());
    print_derived(&record);

    Ok(())
}

async fn show(code: &str, pool: &SqlitePool) -> Result<()> {
    let Some(project) = projects::get_by_code(pool, code).await? else {
        bail!("No project with code {}", code);
    };
    let project_id = project
        .id
        .context("loaded project is missing its row id")?;
    let Some(record) = tracking::get(pool, project_id).await? else {
        bail!("Project {} has no tracking record yet", code);
    };

    let date = |d: Option<chrono::NaiveDate>| {
        d.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string())
    };

    println!("{}", format!("تتبع - {}", project).bold());
    println!("  market launch:     {}", date(record.market_launch_date));
    println!(
        "  actual costs:      {}",
        record
            .actual_costs
            .map(format_thousands)
            .unwrap_or_else(|| "-".to_string())
    );
    println!("  planned end:       {}", date(record.planned_end_date));
    println!("  actual start:      {}", date(record.actual_start_date));
    println!("  actual end:        {}", date(record.actual_end_date));
    print_derived(&record);
    println!("  status:            {}", record.status_display().yellow());

    Ok(())
}

fn print_derived(record: &ProjectTracking) {
    let pct = |v: Option<f64>| {
        v.map(|v| format!("{:.2}%", v))
            .unwrap_or_else(|| "-".to_string())
    };
    println!("  cost variance:     {}", pct(record.cost_variance_percentage));
    println!("  delay rate:        {}", pct(record.delay_rate));
    println!(
        "  delay (days):      {}",
        record
            .delay_variance_days
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string())
    );
}
