//! Repository for project records

use std::collections::HashSet;

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::models::Project;

fn years_from_json(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}

fn years_to_json(years: &[String]) -> Result<String> {
    serde_json::to_string(years).context("Failed to serialize year list")
}

fn project_from_row(row: &SqliteRow) -> Result<Project> {
    let implementation_years: String = row.try_get("implementation_years")?;
    let budget_years: String = row.try_get("budget_years")?;

    Ok(Project {
        id: Some(row.try_get("id")?),
        code: row.try_get("code")?,
        program: row.try_get("program")?,
        projects: row.try_get("projects")?,
        location: row.try_get("location")?,
        district: row.try_get("district")?,
        planning_code: row.try_get("planning_code")?,
        development_goals: row.try_get("development_goals")?,
        components: row.try_get("components")?,
        target_group: row.try_get("target_group")?,
        project_goals: row.try_get("project_goals")?,
        property_status: row.try_get("property_status")?,
        property_drawing: row.try_get("property_drawing")?,
        area: row.try_get("area")?,
        property_prep_cost: row.try_get("property_prep_cost")?,
        studies: row.try_get("studies")?,
        achievements: row.try_get("achievements")?,
        estimated_cost: row.try_get("estimated_cost")?,
        start_year: row.try_get::<i64, _>("start_year")? as u32,
        estimated_duration: row.try_get::<i64, _>("estimated_duration")? as u32,
        implementation_years: years_from_json(&implementation_years),
        budget_years: years_from_json(&budget_years),
        indicator_1: row.try_get("indicator_1")?,
        indicator_2: row.try_get("indicator_2")?,
        indicator_3: row.try_get("indicator_3")?,
        potential_partners: row.try_get("potential_partners")?,
        funding_sources: row.try_get("funding_sources")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Insert a new project, returning its row id
pub async fn insert(pool: &SqlitePool, project: &Project) -> Result<i64> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO projects (
            code, program, projects, location, district, planning_code,
            development_goals, components, target_group, project_goals,
            property_status, property_drawing, area, property_prep_cost,
            studies, achievements, estimated_cost, start_year,
            estimated_duration, implementation_years, budget_years,
            indicator_1, indicator_2, indicator_3, potential_partners,
            funding_sources, created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&project.code)
    .bind(&project.program)
    .bind(&project.projects)
    .bind(&project.location)
    .bind(&project.district)
    .bind(&project.planning_code)
    .bind(&project.development_goals)
    .bind(&project.components)
    .bind(&project.target_group)
    .bind(&project.project_goals)
    .bind(&project.property_status)
    .bind(&project.property_drawing)
    .bind(project.area)
    .bind(project.property_prep_cost)
    .bind(&project.studies)
    .bind(&project.achievements)
    .bind(project.estimated_cost)
    .bind(project.start_year as i64)
    .bind(project.estimated_duration as i64)
    .bind(years_to_json(&project.implementation_years)?)
    .bind(years_to_json(&project.budget_years)?)
    .bind(&project.indicator_1)
    .bind(&project.indicator_2)
    .bind(&project.indicator_3)
    .bind(&project.potential_partners)
    .bind(&project.funding_sources)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .with_context(|| format!("Failed to insert project {}", project.code))?;

    Ok(result.last_insert_rowid())
}

/// Update an existing project (matched by id)
pub async fn update(pool: &SqlitePool, project: &Project) -> Result<()> {
    let id = project
        .id
        .context("Cannot update a project that was never persisted")?;

    sqlx::query(
        r#"
        UPDATE projects SET
            code = ?, program = ?, projects = ?, location = ?, district = ?,
            planning_code = ?, development_goals = ?, components = ?,
            target_group = ?, project_goals = ?, property_status = ?,
            property_drawing = ?, area = ?, property_prep_cost = ?,
            studies = ?, achievements = ?, estimated_cost = ?,
            start_year = ?, estimated_duration = ?, implementation_years = ?,
            budget_years = ?, indicator_1 = ?, indicator_2 = ?,
            indicator_3 = ?, potential_partners = ?, funding_sources = ?,
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&project.code)
    .bind(&project.program)
    .bind(&project.projects)
    .bind(&project.location)
    .bind(&project.district)
    .bind(&project.planning_code)
    .bind(&project.development_goals)
    .bind(&project.components)
    .bind(&project.target_group)
    .bind(&project.project_goals)
    .bind(&project.property_status)
    .bind(&project.property_drawing)
    .bind(project.area)
    .bind(project.property_prep_cost)
    .bind(&project.studies)
    .bind(&project.achievements)
    .bind(project.estimated_cost)
    .bind(project.start_year as i64)
    .bind(project.estimated_duration as i64)
    .bind(years_to_json(&project.implementation_years)?)
    .bind(years_to_json(&project.budget_years)?)
    .bind(&project.indicator_1)
    .bind(&project.indicator_2)
    .bind(&project.indicator_3)
    .bind(&project.potential_partners)
    .bind(&project.funding_sources)
    .bind(Utc::now())
    .bind(id)
    .execute(pool)
    .await
    .with_context(|| format!("Failed to update project {}", project.code))?;

    Ok(())
}

/// Get a project by its unique code
pub async fn get_by_code(pool: &SqlitePool, code: &str) -> Result<Option<Project>> {
    let row = sqlx::query("SELECT * FROM projects WHERE code = ?")
        .bind(code)
        .fetch_optional(pool)
        .await
        .with_context(|| format!("Failed to get project {}", code))?;

    row.as_ref().map(project_from_row).transpose()
}

/// Get a project by row id
pub async fn get(pool: &SqlitePool, id: i64) -> Result<Option<Project>> {
    let row = sqlx::query("SELECT * FROM projects WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get project")?;

    row.as_ref().map(project_from_row).transpose()
}

/// List projects, newest first.
///
/// `search` is a case-insensitive substring match over code, program,
/// location and district; `year` filters on the start year.
pub async fn list(
    pool: &SqlitePool,
    search: Option<&str>,
    year: Option<u32>,
) -> Result<Vec<Project>> {
    let mut sql = String::from("SELECT * FROM projects WHERE 1=1");
    if search.is_some() {
        sql.push_str(
            " AND (code LIKE ? OR program LIKE ? OR location LIKE ? OR district LIKE ?)",
        );
    }
    if year.is_some() {
        sql.push_str(" AND start_year = ?");
    }
    sql.push_str(" ORDER BY id DESC");

    let mut query = sqlx::query(&sql);
    if let Some(q) = search {
        let pattern = format!("%{}%", q);
        query = query
            .bind(pattern.clone())
            .bind(pattern.clone())
            .bind(pattern.clone())
            .bind(pattern);
    }
    if let Some(y) = year {
        query = query.bind(y as i64);
    }

    let rows = query
        .fetch_all(pool)
        .await
        .context("Failed to list projects")?;

    rows.iter().map(project_from_row).collect()
}

/// Delete a project by code. Tracking and execution rates cascade.
pub async fn delete_by_code(pool: &SqlitePool, code: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM projects WHERE code = ?")
        .bind(code)
        .execute(pool)
        .await
        .with_context(|| format!("Failed to delete project {}", code))?;

    Ok(result.rows_affected() > 0)
}

/// All project codes currently in the store (the importer's duplicate set)
pub async fn all_codes(pool: &SqlitePool) -> Result<HashSet<String>> {
    let rows: Vec<(String,)> = sqlx::query_as("SELECT code FROM projects")
        .fetch_all(pool)
        .await
        .context("Failed to list project codes")?;

    Ok(rows.into_iter().map(|(code,)| code).collect())
}
