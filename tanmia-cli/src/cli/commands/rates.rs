//! Execution-rate snapshot handlers

use anyhow::{Context, Result, bail};
use colored::*;
use sqlx::SqlitePool;

use super::parse_date;
use crate::cli::{RateCommands, RateFieldArgs};
use crate::excel::export::format_thousands;
use crate::models::ExecutionRate;
use crate::store::{projects, rates};

pub async fn handle(command: RateCommands, pool: &SqlitePool) -> Result<()> {
    match command {
        RateCommands::Add { code, fields } => add(&code, fields, pool).await,
        RateCommands::List { code, project } => list(code, project, pool).await,
        RateCommands::Show { id } => show(id, pool).await,
        RateCommands::Edit { id, fields } => edit(id, fields, pool).await,
        RateCommands::Delete { id, yes } => delete(id, yes, pool).await,
    }
}

fn apply_fields(rate: &mut ExecutionRate, fields: RateFieldArgs) -> Result<()> {
    if let Some(v) = fields.programmed_amount {
        rate.programmed_amount = Some(v);
    }
    if let Some(v) = fields.partner_contribution {
        rate.partner_contribution = Some(v);
    }
    if let Some(raw) = fields.programming_date {
        rate.programming_date = Some(parse_date(&raw)?);
    }
    if let Some(raw) = fields.market_launch_date {
        rate.market_launch_date = Some(parse_date(&raw)?);
    }
    if let Some(v) = fields.actual_costs {
        rate.actual_costs = Some(v);
    }
    if let Some(v) = fields.estimated_costs {
        rate.estimated_costs = Some(v);
    }
    if let Some(raw) = fields.expected_end_date {
        rate.expected_end_date = Some(parse_date(&raw)?);
    }
    if let Some(raw) = fields.actual_start_date {
        rate.actual_start_date = Some(parse_date(&raw)?);
    }
    if let Some(raw) = fields.actual_end_date {
        rate.actual_end_date = Some(parse_date(&raw)?);
    }
    if let Some(v) = fields.work_progress {
        rate.work_progress_percentage = Some(v);
    }
    if let Some(v) = fields.financial_achievement {
        rate.financial_achievement_percentage = Some(v);
    }
    Ok(())
}

async fn add(code: &str, fields: RateFieldArgs, pool: &SqlitePool) -> Result<()> {
    let Some(project) = projects::get_by_code(pool, code).await? else {
        bail!("No project with code {}", code);
    };

    let mut rate = ExecutionRate {
        project_id: project
            .id
            .context("loaded project is missing its row id")?,
        ..ExecutionRate::default()
    };
    apply_fields(&mut rate, fields)?;

    let id = rates::insert(pool, &mut rate).await?;
    println!(
        "Added snapshot {} to {}",
        id.to_string().bright_green().bold(),
        project.code.cyan()
    );
    print_derived(&rate);

    Ok(())
}

async fn list(code: Option<String>, project: Option<String>, pool: &SqlitePool) -> Result<()> {
    let rows = rates::list(pool, code.as_deref(), project.as_deref()).await?;

    if rows.is_empty() {
        println!("No execution rates found");
        return Ok(());
    }

    for row in &rows {
        let progress = row
            .rate
            .work_progress_percentage
            .map(|v| format!("{:.1}%", v))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{}  {}  {}  works {}  {}",
            row.rate.id.unwrap_or_default().to_string().cyan(),
            row.project_code,
            row.project_program.dimmed(),
            progress,
            row.rate
                .created_at
                .map(|t| t.format("%Y-%m-%d").to_string())
                .unwrap_or_default()
                .dimmed(),
        );
    }
    println!("{} snapshot(s)", rows.len());

    Ok(())
}

async fn show(id: i64, pool: &SqlitePool) -> Result<()> {
    let Some(rate) = rates::get(pool, id).await? else {
        bail!("No execution rate with id {}", id);
    };

    let date = |d: Option<chrono::NaiveDate>| {
        d.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string())
    };
    let money = |v: Option<f64>| {
        v.map(format_thousands).unwrap_or_else(|| "-".to_string())
    };

    println!("{}", format!("Execution rate #{}", id).bold());
    println!("  programmed amount:     {}", money(rate.programmed_amount));
    println!("  partner contribution:  {}", money(rate.partner_contribution));
    println!("  programming date:      {}", date(rate.programming_date));
    println!("  market launch:         {}", date(rate.market_launch_date));
    println!("  actual costs:          {}", money(rate.actual_costs));
    println!("  estimated costs:       {}", money(rate.estimated_costs));
    println!("  expected end:          {}", date(rate.expected_end_date));
    println!("  actual start:          {}", date(rate.actual_start_date));
    println!("  actual end:            {}", date(rate.actual_end_date));
    print_derived(&rate);

    Ok(())
}

async fn edit(id: i64, fields: RateFieldArgs, pool: &SqlitePool) -> Result<()> {
    let Some(mut rate) = rates::get(pool, id).await? else {
        bail!("No execution rate with id {}", id);
    };

    apply_fields(&mut rate, fields)?;
    rates::update(pool, &mut rate).await?;

    println!("Updated snapshot {}", id.to_string().bright_green().bold());
    print_derived(&rate);

    Ok(())
}

async fn delete(id: i64, yes: bool, pool: &SqlitePool) -> Result<()> {
    if rates::get(pool, id).await?.is_none() {
        bail!("No execution rate with id {}", id);
    }

    if !yes {
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(format!("Delete execution rate {}?", id))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("Aborted");
            return Ok(());
        }
    }

    rates::delete(pool, id).await?;
    println!("Deleted execution rate {}", id.to_string().red());

    Ok(())
}

fn print_derived(rate: &ExecutionRate) {
    let pct = |v: Option<f64>| {
        v.map(|v| format!("{:.2}%", v))
            .unwrap_or_else(|| "-".to_string())
    };
    println!("  cost difference:       {}", pct(rate.cost_difference_percentage));
    println!("  delay:                 {}", pct(rate.delay_percentage));
    println!(
        "  duration diff (days):  {}",
        rate.duration_difference_days
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string())
    );
    println!("  work progress:         {}", pct(rate.work_progress_percentage));
    println!(
        "  financial achievement: {}",
        pct(rate.financial_achievement_percentage)
    );
}
