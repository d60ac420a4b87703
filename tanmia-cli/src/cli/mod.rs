//! Command-line surface
//!
//! One subcommand per registry operation; each invocation runs a single
//! synchronous pipeline against the injected store pool.

pub mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use sqlx::SqlitePool;

#[derive(Parser)]
#[command(
    name = "tanmia-cli",
    about = "Registry for public investment projects and their execution tracking",
    version
)]
pub struct Cli {
    /// Database file to use (overrides TANMIA_DB and the platform default)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage project records
    #[command(subcommand)]
    Project(ProjectCommands),
    /// Manage a project's one-to-one tracking record
    #[command(subcommand)]
    Tracking(TrackingCommands),
    /// Manage execution-rate snapshots
    #[command(subcommand)]
    Rate(RateCommands),
    /// Import projects from an .xls/.xlsx spreadsheet
    Import {
        /// Spreadsheet to import (max 5 MB)
        file: PathBuf,
    },
    /// Export spreadsheets
    #[command(subcommand)]
    Export(ExportCommands),
}

#[derive(Subcommand)]
pub enum ProjectCommands {
    /// Add a new project
    Add(ProjectAddArgs),
    /// List projects, newest first
    List {
        /// Substring match over code, program, location and district
        #[arg(long)]
        search: Option<String>,
        /// Keep only projects starting in this year
        #[arg(long)]
        year: Option<u32>,
    },
    /// Show one project in full, with its derived totals and status
    Show {
        /// Project code
        code: String,
    },
    /// Edit fields of an existing project
    Edit {
        /// Project code
        code: String,
        #[command(flatten)]
        fields: ProjectEditArgs,
    },
    /// Delete a project (its tracking and snapshots go with it)
    Delete {
        /// Project code
        code: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args)]
pub struct ProjectAddArgs {
    /// Project code; generated when omitted
    #[arg(long)]
    pub code: Option<String>,
    #[arg(long)]
    pub program: String,
    /// Description of the covered works
    #[arg(long)]
    pub projects: String,
    #[arg(long)]
    pub location: String,
    #[arg(long)]
    pub district: String,
    #[arg(long)]
    pub components: String,
    #[arg(long)]
    pub target_group: String,
    #[arg(long)]
    pub property_status: String,
    /// Square meters
    #[arg(long)]
    pub area: f64,
    /// Moroccan dirhams
    #[arg(long)]
    pub property_prep_cost: f64,
    /// Moroccan dirhams
    #[arg(long)]
    pub estimated_cost: f64,
    #[arg(long)]
    pub start_year: u32,
    /// Months
    #[arg(long)]
    pub estimated_duration: u32,
    /// Comma-separated years from 2022-2028
    #[arg(long)]
    pub implementation_years: String,
    /// Comma-separated years from 2022-2028
    #[arg(long)]
    pub budget_years: String,
    #[arg(long)]
    pub planning_code: Option<String>,
    #[arg(long)]
    pub development_goals: Option<String>,
    #[arg(long)]
    pub project_goals: Option<String>,
    #[arg(long)]
    pub property_drawing: Option<String>,
    #[arg(long)]
    pub studies: Option<String>,
    #[arg(long)]
    pub achievements: Option<String>,
    #[arg(long)]
    pub indicator_1: Option<String>,
    #[arg(long)]
    pub indicator_2: Option<String>,
    #[arg(long)]
    pub indicator_3: Option<String>,
    #[arg(long)]
    pub potential_partners: Option<String>,
    #[arg(long)]
    pub funding_sources: Option<String>,
}

#[derive(Args)]
pub struct ProjectEditArgs {
    #[arg(long)]
    pub program: Option<String>,
    /// Description of the covered works
    #[arg(long)]
    pub projects: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long)]
    pub district: Option<String>,
    #[arg(long)]
    pub components: Option<String>,
    #[arg(long)]
    pub target_group: Option<String>,
    #[arg(long)]
    pub property_status: Option<String>,
    #[arg(long)]
    pub area: Option<f64>,
    #[arg(long)]
    pub property_prep_cost: Option<f64>,
    #[arg(long)]
    pub estimated_cost: Option<f64>,
    #[arg(long)]
    pub start_year: Option<u32>,
    #[arg(long)]
    pub estimated_duration: Option<u32>,
    /// Comma-separated years from 2022-2028
    #[arg(long)]
    pub implementation_years: Option<String>,
    /// Comma-separated years from 2022-2028
    #[arg(long)]
    pub budget_years: Option<String>,
    #[arg(long)]
    pub planning_code: Option<String>,
    #[arg(long)]
    pub development_goals: Option<String>,
    #[arg(long)]
    pub project_goals: Option<String>,
    #[arg(long)]
    pub property_drawing: Option<String>,
    #[arg(long)]
    pub studies: Option<String>,
    #[arg(long)]
    pub achievements: Option<String>,
    #[arg(long)]
    pub indicator_1: Option<String>,
    #[arg(long)]
    pub indicator_2: Option<String>,
    #[arg(long)]
    pub indicator_3: Option<String>,
    #[arg(long)]
    pub potential_partners: Option<String>,
    #[arg(long)]
    pub funding_sources: Option<String>,
}

#[derive(Subcommand)]
pub enum TrackingCommands {
    /// Create or update the tracking record of a project
    Set {
        /// Project code
        code: String,
        #[command(flatten)]
        fields: TrackingSetArgs,
    },
    /// Show the tracking record of a project
    Show {
        /// Project code
        code: String,
    },
}

#[derive(Args)]
pub struct TrackingSetArgs {
    /// YYYY-MM-DD
    #[arg(long)]
    pub market_launch_date: Option<String>,
    /// Moroccan dirhams
    #[arg(long)]
    pub actual_costs: Option<f64>,
    /// YYYY-MM-DD
    #[arg(long)]
    pub planned_end_date: Option<String>,
    /// YYYY-MM-DD
    #[arg(long)]
    pub actual_start_date: Option<String>,
    /// YYYY-MM-DD
    #[arg(long)]
    pub actual_end_date: Option<String>,
}

#[derive(Subcommand)]
pub enum RateCommands {
    /// Add an execution-rate snapshot to a project
    Add {
        /// Project code
        code: String,
        #[command(flatten)]
        fields: RateFieldArgs,
    },
    /// List snapshots, newest first
    List {
        /// Substring match over the project code
        #[arg(long)]
        code: Option<String>,
        /// Substring match over the program or works description
        #[arg(long)]
        project: Option<String>,
    },
    /// Show one snapshot in full
    Show {
        /// Snapshot id
        id: i64,
    },
    /// Edit fields of an existing snapshot
    Edit {
        /// Snapshot id
        id: i64,
        #[command(flatten)]
        fields: RateFieldArgs,
    },
    /// Delete a snapshot
    Delete {
        /// Snapshot id
        id: i64,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args)]
pub struct RateFieldArgs {
    /// Moroccan dirhams
    #[arg(long)]
    pub programmed_amount: Option<f64>,
    /// Moroccan dirhams
    #[arg(long)]
    pub partner_contribution: Option<f64>,
    /// YYYY-MM-DD
    #[arg(long)]
    pub programming_date: Option<String>,
    /// YYYY-MM-DD
    #[arg(long)]
    pub market_launch_date: Option<String>,
    /// Moroccan dirhams
    #[arg(long)]
    pub actual_costs: Option<f64>,
    /// Moroccan dirhams
    #[arg(long)]
    pub estimated_costs: Option<f64>,
    /// YYYY-MM-DD
    #[arg(long)]
    pub expected_end_date: Option<String>,
    /// YYYY-MM-DD
    #[arg(long)]
    pub actual_start_date: Option<String>,
    /// YYYY-MM-DD
    #[arg(long)]
    pub actual_end_date: Option<String>,
    /// 0-100
    #[arg(long)]
    pub work_progress: Option<f64>,
    /// 0-100
    #[arg(long)]
    pub financial_achievement: Option<f64>,
}

#[derive(Subcommand)]
pub enum ExportCommands {
    /// Export the full project table
    Projects {
        /// Output .xlsx path
        out: PathBuf,
    },
    /// Export execution-rate snapshots, optionally filtered
    Rates {
        /// Output .xlsx path
        out: PathBuf,
        /// Substring match over the project code
        #[arg(long)]
        code: Option<String>,
        /// Substring match over the program or works description
        #[arg(long)]
        project: Option<String>,
    },
    /// Write an import template with two sample rows
    Template {
        /// Output .xlsx path
        out: PathBuf,
    },
}

/// Route a parsed invocation to its handler
pub async fn dispatch(command: Commands, pool: &SqlitePool) -> Result<()> {
    match command {
        Commands::Project(cmd) => commands::projects::handle(cmd, pool).await,
        Commands::Tracking(cmd) => commands::tracking::handle(cmd, pool).await,
        Commands::Rate(cmd) => commands::rates::handle(cmd, pool).await,
        Commands::Import { file } => commands::import::handle(&file, pool).await,
        Commands::Export(cmd) => commands::export::handle(cmd, pool).await,
    }
}
