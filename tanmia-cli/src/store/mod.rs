//! Repository layer for database operations
//!
//! One module per entity, free async functions over an injected
//! `&SqlitePool`. Derived metrics are computed here, right before commit,
//! so the calculators stay pure and the entities never write themselves.

pub mod projects;
pub mod rates;
pub mod tracking;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

/// Resolve the database path: `TANMIA_DB` wins, otherwise the platform
/// data directory.
pub fn default_db_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("TANMIA_DB") {
        return Ok(PathBuf::from(path));
    }

    let data_dir = dirs::data_dir().context("Could not determine platform data directory")?;
    Ok(data_dir.join("tanmia").join("tanmia.db"))
}

/// Open (creating if missing) the registry database and ensure its schema
pub async fn open(path: &Path) -> Result<SqlitePool> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create data directory: {}", parent.display()))?;
    }

    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .with_context(|| format!("Failed to open database: {}", path.display()))?;

    init_schema(&pool).await?;

    Ok(pool)
}

/// Create the registry tables if they do not exist yet
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS projects (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            code TEXT NOT NULL UNIQUE,
            program TEXT NOT NULL,
            projects TEXT NOT NULL,
            location TEXT NOT NULL,
            district TEXT NOT NULL,
            planning_code TEXT,
            development_goals TEXT,
            components TEXT NOT NULL,
            target_group TEXT NOT NULL,
            project_goals TEXT,
            property_status TEXT NOT NULL,
            property_drawing TEXT,
            area REAL NOT NULL DEFAULT 0,
            property_prep_cost REAL NOT NULL DEFAULT 0,
            studies TEXT,
            achievements TEXT,
            estimated_cost REAL NOT NULL DEFAULT 0,
            start_year INTEGER NOT NULL,
            estimated_duration INTEGER NOT NULL,
            implementation_years TEXT NOT NULL DEFAULT '[]',
            budget_years TEXT NOT NULL DEFAULT '[]',
            indicator_1 TEXT,
            indicator_2 TEXT,
            indicator_3 TEXT,
            potential_partners TEXT,
            funding_sources TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create projects table")?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS project_tracking (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            project_id INTEGER NOT NULL UNIQUE
                REFERENCES projects(id) ON DELETE CASCADE,
            market_launch_date TEXT,
            actual_costs REAL,
            planned_end_date TEXT,
            actual_start_date TEXT,
            actual_end_date TEXT,
            cost_variance_percentage REAL,
            delay_rate REAL,
            delay_variance_days INTEGER
        )
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create project_tracking table")?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS execution_rates (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            project_id INTEGER NOT NULL
                REFERENCES projects(id) ON DELETE CASCADE,
            programmed_amount REAL,
            partner_contribution REAL,
            programming_date TEXT,
            market_launch_date TEXT,
            actual_costs REAL,
            estimated_costs REAL,
            cost_difference_percentage REAL,
            expected_end_date TEXT,
            actual_start_date TEXT,
            actual_end_date TEXT,
            delay_percentage REAL,
            duration_difference_days INTEGER,
            work_progress_percentage REAL,
            financial_achievement_percentage REAL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create execution_rates table")?;

    Ok(())
}

#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    init_schema(&pool).await.expect("schema");
    pool
}
