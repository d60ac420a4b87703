//! Repository for execution-rate snapshots

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::metrics;
use crate::models::ExecutionRate;

/// An execution rate joined with its project's identity columns, as the
/// listing and export pipelines consume it
#[derive(Debug, Clone)]
pub struct RateRow {
    pub rate: ExecutionRate,
    pub project_code: String,
    pub project_program: String,
    pub project_projects: String,
}

fn rate_from_row(row: &SqliteRow) -> Result<ExecutionRate> {
    Ok(ExecutionRate {
        id: Some(row.try_get("id")?),
        project_id: row.try_get("project_id")?,
        programmed_amount: row.try_get("programmed_amount")?,
        partner_contribution: row.try_get("partner_contribution")?,
        programming_date: row.try_get("programming_date")?,
        market_launch_date: row.try_get("market_launch_date")?,
        actual_costs: row.try_get("actual_costs")?,
        estimated_costs: row.try_get("estimated_costs")?,
        cost_difference_percentage: row.try_get("cost_difference_percentage")?,
        expected_end_date: row.try_get("expected_end_date")?,
        actual_start_date: row.try_get("actual_start_date")?,
        actual_end_date: row.try_get("actual_end_date")?,
        delay_percentage: row.try_get("delay_percentage")?,
        duration_difference_days: row.try_get("duration_difference_days")?,
        work_progress_percentage: row.try_get("work_progress_percentage")?,
        financial_achievement_percentage: row.try_get("financial_achievement_percentage")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn recompute(rate: &mut ExecutionRate) {
    rate.cost_difference_percentage =
        metrics::cost_difference_percentage(rate.estimated_costs, rate.actual_costs);
    rate.duration_difference_days =
        metrics::duration_difference_days(rate.expected_end_date, rate.actual_end_date);
    rate.delay_percentage = metrics::delay_percentage(
        rate.expected_end_date,
        rate.actual_start_date,
        rate.actual_end_date,
    );
}

/// Insert a new snapshot, returning its row id.
///
/// Validates the progress percentages and recomputes the derived fields
/// before committing.
pub async fn insert(pool: &SqlitePool, rate: &mut ExecutionRate) -> Result<i64> {
    rate.validate()?;
    recompute(rate);

    let now = Utc::now();
    let result = sqlx::query(
        r#"
        INSERT INTO execution_rates (
            project_id, programmed_amount, partner_contribution,
            programming_date, market_launch_date, actual_costs,
            estimated_costs, cost_difference_percentage, expected_end_date,
            actual_start_date, actual_end_date, delay_percentage,
            duration_difference_days, work_progress_percentage,
            financial_achievement_percentage, created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(rate.project_id)
    .bind(rate.programmed_amount)
    .bind(rate.partner_contribution)
    .bind(rate.programming_date)
    .bind(rate.market_launch_date)
    .bind(rate.actual_costs)
    .bind(rate.estimated_costs)
    .bind(rate.cost_difference_percentage)
    .bind(rate.expected_end_date)
    .bind(rate.actual_start_date)
    .bind(rate.actual_end_date)
    .bind(rate.delay_percentage)
    .bind(rate.duration_difference_days)
    .bind(rate.work_progress_percentage)
    .bind(rate.financial_achievement_percentage)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to insert execution rate")?;

    let id = result.last_insert_rowid();
    rate.id = Some(id);
    rate.created_at = Some(now);
    rate.updated_at = Some(now);

    Ok(id)
}

/// Update an existing snapshot (matched by id), recomputing derived fields
pub async fn update(pool: &SqlitePool, rate: &mut ExecutionRate) -> Result<()> {
    let id = rate
        .id
        .context("Cannot update an execution rate that was never persisted")?;
    rate.validate()?;
    recompute(rate);

    sqlx::query(
        r#"
        UPDATE execution_rates SET
            programmed_amount = ?, partner_contribution = ?,
            programming_date = ?, market_launch_date = ?, actual_costs = ?,
            estimated_costs = ?, cost_difference_percentage = ?,
            expected_end_date = ?, actual_start_date = ?, actual_end_date = ?,
            delay_percentage = ?, duration_difference_days = ?,
            work_progress_percentage = ?, financial_achievement_percentage = ?,
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(rate.programmed_amount)
    .bind(rate.partner_contribution)
    .bind(rate.programming_date)
    .bind(rate.market_launch_date)
    .bind(rate.actual_costs)
    .bind(rate.estimated_costs)
    .bind(rate.cost_difference_percentage)
    .bind(rate.expected_end_date)
    .bind(rate.actual_start_date)
    .bind(rate.actual_end_date)
    .bind(rate.delay_percentage)
    .bind(rate.duration_difference_days)
    .bind(rate.work_progress_percentage)
    .bind(rate.financial_achievement_percentage)
    .bind(Utc::now())
    .bind(id)
    .execute(pool)
    .await
    .context("Failed to update execution rate")?;

    Ok(())
}

/// Get a snapshot by row id
pub async fn get(pool: &SqlitePool, id: i64) -> Result<Option<ExecutionRate>> {
    let row = sqlx::query("SELECT * FROM execution_rates WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get execution rate")?;

    row.as_ref().map(rate_from_row).transpose()
}

/// List snapshots joined with project identity, newest first.
///
/// `code` filters on the project code, `project` on the program or works
/// description, both case-insensitive substring matches.
pub async fn list(
    pool: &SqlitePool,
    code: Option<&str>,
    project: Option<&str>,
) -> Result<Vec<RateRow>> {
    let mut sql = String::from(
        r#"
        SELECT er.*, p.code AS project_code, p.program AS project_program,
               p.projects AS project_projects
        FROM execution_rates er
        JOIN projects p ON p.id = er.project_id
        WHERE 1=1
        "#,
    );
    if code.is_some() {
        sql.push_str(" AND p.code LIKE ?");
    }
    if project.is_some() {
        sql.push_str(" AND (p.program LIKE ? OR p.projects LIKE ?)");
    }
    sql.push_str(" ORDER BY er.created_at DESC, er.id DESC");

    let mut query = sqlx::query(&sql);
    if let Some(c) = code {
        query = query.bind(format!("%{}%", c));
    }
    if let Some(p) = project {
        let pattern = format!("%{}%", p);
        query = query.bind(pattern.clone()).bind(pattern);
    }

    let rows = query
        .fetch_all(pool)
        .await
        .context("Failed to list execution rates")?;

    rows.iter()
        .map(|row| {
            Ok(RateRow {
                rate: rate_from_row(row)?,
                project_code: row.try_get("project_code")?,
                project_program: row.try_get("project_program")?,
                project_projects: row.try_get("project_projects")?,
            })
        })
        .collect()
}

/// Delete a snapshot by row id
pub async fn delete(pool: &SqlitePool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM execution_rates WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete execution rate")?;

    Ok(result.rows_affected() > 0)
}
