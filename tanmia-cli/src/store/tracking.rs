//! Repository for project tracking records

use anyhow::{Context, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::metrics;
use crate::models::{Project, ProjectTracking};

fn tracking_from_row(row: &SqliteRow) -> Result<ProjectTracking> {
    Ok(ProjectTracking {
        id: Some(row.try_get("id")?),
        project_id: row.try_get("project_id")?,
        market_launch_date: row.try_get("market_launch_date")?,
        actual_costs: row.try_get("actual_costs")?,
        planned_end_date: row.try_get("planned_end_date")?,
        actual_start_date: row.try_get("actual_start_date")?,
        actual_end_date: row.try_get("actual_end_date")?,
        cost_variance_percentage: row.try_get("cost_variance_percentage")?,
        delay_rate: row.try_get("delay_rate")?,
        delay_variance_days: row.try_get("delay_variance_days")?,
    })
}

/// Get the tracking record for a project, if one exists
pub async fn get(pool: &SqlitePool, project_id: i64) -> Result<Option<ProjectTracking>> {
    let row = sqlx::query("SELECT * FROM project_tracking WHERE project_id = ?")
        .bind(project_id)
        .fetch_optional(pool)
        .await
        .context("Failed to get tracking record")?;

    row.as_ref().map(tracking_from_row).transpose()
}

/// Insert or replace the tracking record for `project`.
///
/// Recomputes the derived metrics from the record's dates/costs and the
/// project's estimated cost before committing, then applies the completion
/// side effect: a project that finished with no achievements text gets a
/// dated completion note.
pub async fn upsert(
    pool: &SqlitePool,
    project: &Project,
    tracking: &mut ProjectTracking,
) -> Result<i64> {
    let project_id = project
        .id
        .context("Cannot track a project that was never persisted")?;
    tracking.project_id = project_id;

    tracking.cost_variance_percentage =
        metrics::cost_variance_percentage(project.estimated_cost, tracking.actual_costs);
    let (delay_rate, delay_variance_days) = metrics::delay_metrics(
        tracking.planned_end_date,
        tracking.actual_start_date,
        tracking.actual_end_date,
    );
    tracking.delay_rate = delay_rate;
    tracking.delay_variance_days = delay_variance_days;

    sqlx::query(
        r#"
        INSERT INTO project_tracking (
            project_id, market_launch_date, actual_costs, planned_end_date,
            actual_start_date, actual_end_date, cost_variance_percentage,
            delay_rate, delay_variance_days
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(project_id) DO UPDATE SET
            market_launch_date = excluded.market_launch_date,
            actual_costs = excluded.actual_costs,
            planned_end_date = excluded.planned_end_date,
            actual_start_date = excluded.actual_start_date,
            actual_end_date = excluded.actual_end_date,
            cost_variance_percentage = excluded.cost_variance_percentage,
            delay_rate = excluded.delay_rate,
            delay_variance_days = excluded.delay_variance_days
        "#,
    )
    .bind(project_id)
    .bind(tracking.market_launch_date)
    .bind(tracking.actual_costs)
    .bind(tracking.planned_end_date)
    .bind(tracking.actual_start_date)
    .bind(tracking.actual_end_date)
    .bind(tracking.cost_variance_percentage)
    .bind(tracking.delay_rate)
    .bind(tracking.delay_variance_days)
    .execute(pool)
    .await
    .with_context(|| format!("Failed to save tracking record for {}", project.code))?;

    let (id,): (i64,) = sqlx::query_as("SELECT id FROM project_tracking WHERE project_id = ?")
        .bind(project_id)
        .fetch_one(pool)
        .await
        .context("Failed to read back tracking record id")?;
    tracking.id = Some(id);

    write_completion_note(pool, project, tracking).await?;

    Ok(id)
}

/// A finished project with no achievements text gets a dated note
async fn write_completion_note(
    pool: &SqlitePool,
    project: &Project,
    tracking: &ProjectTracking,
) -> Result<()> {
    let Some(actual_end) = tracking.actual_end_date else {
        return Ok(());
    };

    let has_achievements = project
        .achievements
        .as_deref()
        .is_some_and(|s| !s.trim().is_empty());
    if has_achievements {
        return Ok(());
    }

    let note = format!("تم الانتهاء من المشروع في {}", actual_end.format("%Y-%m-%d"));
    sqlx::query("UPDATE projects SET achievements = ? WHERE id = ?")
        .bind(&note)
        .bind(tracking.project_id)
        .execute(pool)
        .await
        .with_context(|| format!("Failed to write completion note for {}", project.code))?;

    log::debug!("wrote completion note for {}", project.code);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{projects, test_pool};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn seeded_project(pool: &SqlitePool, estimated_cost: f64) -> Project {
        let project = Project {
            code: "PRJ-T".to_string(),
            program: "برنامج".to_string(),
            projects: "مشروع".to_string(),
            location: "الرباط".to_string(),
            district: "أكدال".to_string(),
            components: "بناء".to_string(),
            target_group: "السكان".to_string(),
            property_status: "ملكية عمومية".to_string(),
            estimated_cost,
            start_year: 2025,
            estimated_duration: 12,
            ..Project::default()
        };
        let id = projects::insert(pool, &project).await.unwrap();
        projects::get(pool, id).await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn test_upsert_computes_metrics() {
        let pool = test_pool().await;
        let project = seeded_project(&pool, 1_000_000.0).await;

        let mut tracking = ProjectTracking {
            actual_costs: Some(750_000.0),
            planned_end_date: Some(date(2025, 6, 30)),
            actual_start_date: Some(date(2025, 1, 1)),
            actual_end_date: Some(date(2025, 7, 18)),
            ..ProjectTracking::default()
        };
        upsert(&pool, &project, &mut tracking).await.unwrap();

        let loaded = get(&pool, project.id.unwrap()).await.unwrap().unwrap();
        assert_eq!(loaded.cost_variance_percentage, Some(25.0));
        assert_eq!(loaded.delay_variance_days, Some(18));
        assert_eq!(loaded.delay_rate, Some(10.0));
    }

    #[tokio::test]
    async fn test_upsert_replaces_existing() {
        let pool = test_pool().await;
        let project = seeded_project(&pool, 1_000_000.0).await;

        let mut first = ProjectTracking {
            actual_costs: Some(100_000.0),
            ..ProjectTracking::default()
        };
        upsert(&pool, &project, &mut first).await.unwrap();

        let mut second = ProjectTracking {
            actual_costs: None,
            ..ProjectTracking::default()
        };
        upsert(&pool, &project, &mut second).await.unwrap();

        let loaded = get(&pool, project.id.unwrap()).await.unwrap().unwrap();
        assert_eq!(loaded.actual_costs, None);
        // Metrics recomputed, not carried over
        assert_eq!(loaded.cost_variance_percentage, None);
        assert_eq!(loaded.id, first.id);
    }

    #[tokio::test]
    async fn test_completion_note_written_once() {
        let pool = test_pool().await;
        let project = seeded_project(&pool, 0.0).await;

        let mut tracking = ProjectTracking {
            actual_end_date: Some(date(2025, 7, 1)),
            ..ProjectTracking::default()
        };
        upsert(&pool, &project, &mut tracking).await.unwrap();

        let reloaded = projects::get(&pool, project.id.unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            reloaded.achievements.as_deref(),
            Some("تم الانتهاء من المشروع في 2025-07-01")
        );

        // A project that already has achievements text keeps it
        let mut manual = reloaded.clone();
        manual.achievements = Some("إنجاز يدوي".to_string());
        projects::update(&pool, &manual).await.unwrap();

        upsert(&pool, &manual, &mut tracking).await.unwrap();
        let kept = projects::get(&pool, project.id.unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(kept.achievements.as_deref(), Some("إنجاز يدوي"));
    }

    #[tokio::test]
    async fn test_no_note_without_end_date() {
        let pool = test_pool().await;
        let project = seeded_project(&pool, 0.0).await;

        let mut tracking = ProjectTracking {
            actual_start_date: Some(date(2025, 1, 1)),
            ..ProjectTracking::default()
        };
        upsert(&pool, &project, &mut tracking).await.unwrap();

        let reloaded = projects::get(&pool, project.id.unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reloaded.achievements, None);
    }
}
