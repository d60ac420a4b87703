//! Project CRUD handlers

use anyhow::{Result, bail};
use colored::*;
use sqlx::SqlitePool;

use super::parse_year_list;
use crate::cli::{ProjectAddArgs, ProjectCommands, ProjectEditArgs};
use crate::excel::export::format_thousands;
use crate::excel::normalize;
use crate::models::Project;
use crate::store::{projects, tracking};

pub async fn handle(command: ProjectCommands, pool: &SqlitePool) -> Result<()> {
    match command {
        ProjectCommands::Add(args) => add(args, pool).await,
        ProjectCommands::List { search, year } => list(search, year, pool).await,
        ProjectCommands::Show { code } => show(&code, pool).await,
        ProjectCommands::Edit { code, fields } => edit(&code, fields, pool).await,
        ProjectCommands::Delete { code, yes } => delete(&code, yes, pool).await,
    }
}

fn check_non_negative(field: &str, value: f64) -> Result<()> {
    if value < 0.0 {
        bail!("{} must be non-negative, got {}", field, value);
    }
    Ok(())
}

async fn add(args: ProjectAddArgs, pool: &SqlitePool) -> Result<()> {
    check_non_negative("area", args.area)?;
    check_non_negative("property-prep-cost", args.property_prep_cost)?;
    check_non_negative("estimated-cost", args.estimated_cost)?;
    if args.estimated_duration == 0 {
        bail!("estimated-duration must be at least 1 month");
    }

    let code = args.code.unwrap_or_else(normalize::generate_code);
    if projects::get_by_code(pool, &code).await?.is_some() {
        bail!("A project with code {} already exists", code);
    }

    let project = Project {
        id: None,
        code,
        program: args.program,
        projects: args.projects,
        location: args.location,
        district: args.district,
        planning_code: args.planning_code,
        development_goals: args.development_goals,
        components: args.components,
        target_group: args.target_group,
        project_goals: args.project_goals,
        property_status: args.property_status,
        property_drawing: args.property_drawing,
        area: args.area,
        property_prep_cost: args.property_prep_cost,
        studies: args.studies,
        achievements: args.achievements,
        estimated_cost: args.estimated_cost,
        start_year: args.start_year,
        estimated_duration: args.estimated_duration,
        implementation_years: parse_year_list(&args.implementation_years)?,
        budget_years: parse_year_list(&args.budget_years)?,
        indicator_1: args.indicator_1,
        indicator_2: args.indicator_2,
        indicator_3: args.indicator_3,
        potential_partners: args.potential_partners,
        funding_sources: args.funding_sources,
        created_at: None,
        updated_at: None,
    };

    projects::insert(pool, &project).await?;
    println!("Added project {}", project.code.bright_green().bold());

    Ok(())
}

async fn list(search: Option<String>, year: Option<u32>, pool: &SqlitePool) -> Result<()> {
    let results = projects::list(pool, search.as_deref(), year).await?;

    if results.is_empty() {
        println!("No projects found");
        return Ok(());
    }

    for project in &results {
        println!(
            "{}  {}  {}  {}  {}",
            project.code.cyan(),
            project.program,
            project.location.dimmed(),
            project.start_year,
            format_thousands(project.estimated_cost),
        );
    }
    println!("{} project(s)", results.len());

    Ok(())
}

async fn show(code: &str, pool: &SqlitePool) -> Result<()> {
    let Some(project) = projects::get_by_code(pool, code).await? else {
        bail!("No project with code {}", code);
    };

    let opt = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());

    println!("{}", project.to_string().bold());
    println!("  location:             {} / {}", project.location, project.district);
    println!("  works:                {}", project.projects);
    println!("  components:           {}", project.components);
    println!("  target group:         {}", project.target_group);
    println!("  property status:      {}", project.property_status);
    println!("  property drawing:     {}", opt(&project.property_drawing));
    println!("  planning code:        {}", opt(&project.planning_code));
    println!("  development goals:    {}", opt(&project.development_goals));
    println!("  project goals:        {}", opt(&project.project_goals));
    println!("  area:                 {:.2} m²", project.area);
    println!(
        "  property prep cost:   {}",
        format_thousands(project.property_prep_cost)
    );
    println!(
        "  estimated cost:       {}",
        format_thousands(project.estimated_cost)
    );
    println!(
        "  total estimated cost: {}",
        format_thousands(project.total_estimated_cost()).bold()
    );
    println!(
        "  schedule:             {} + {} months",
        project.start_year, project.estimated_duration
    );
    println!(
        "  implementation years: {}",
        project.implementation_years.join(", ")
    );
    println!("  budget years:         {}", project.budget_years.join(", "));
    println!("  studies:              {}", opt(&project.studies));
    println!("  achievements:         {}", opt(&project.achievements));
    println!("  indicators:           {} | {} | {}",
        opt(&project.indicator_1),
        opt(&project.indicator_2),
        opt(&project.indicator_3),
    );
    println!("  partners:             {}", opt(&project.potential_partners));
    println!("  funding sources:      {}", opt(&project.funding_sources));

    if let Some(id) = project.id {
        if let Some(record) = tracking::get(pool, id).await? {
            println!("  tracking status:      {}", record.status_display().yellow());
        }
    }

    Ok(())
}

async fn edit(code: &str, fields: ProjectEditArgs, pool: &SqlitePool) -> Result<()> {
    let Some(mut project) = projects::get_by_code(pool, code).await? else {
        bail!("No project with code {}", code);
    };

    if let Some(v) = fields.area {
        check_non_negative("area", v)?;
        project.area = v;
    }
    if let Some(v) = fields.property_prep_cost {
        check_non_negative("property-prep-cost", v)?;
        project.property_prep_cost = v;
    }
    if let Some(v) = fields.estimated_cost {
        check_non_negative("estimated-cost", v)?;
        project.estimated_cost = v;
    }
    if let Some(v) = fields.estimated_duration {
        if v == 0 {
            bail!("estimated-duration must be at least 1 month");
        }
        project.estimated_duration = v;
    }
    if let Some(v) = fields.start_year {
        project.start_year = v;
    }
    if let Some(v) = fields.implementation_years {
        project.implementation_years = parse_year_list(&v)?;
    }
    if let Some(v) = fields.budget_years {
        project.budget_years = parse_year_list(&v)?;
    }

    if let Some(v) = fields.program {
        project.program = v;
    }
    if let Some(v) = fields.projects {
        project.projects = v;
    }
    if let Some(v) = fields.location {
        project.location = v;
    }
    if let Some(v) = fields.district {
        project.district = v;
    }
    if let Some(v) = fields.components {
        project.components = v;
    }
    if let Some(v) = fields.target_group {
        project.target_group = v;
    }
    if let Some(v) = fields.property_status {
        project.property_status = v;
    }
    if let Some(v) = fields.planning_code {
        project.planning_code = Some(v);
    }
    if let Some(v) = fields.development_goals {
        project.development_goals = Some(v);
    }
    if let Some(v) = fields.project_goals {
        project.project_goals = Some(v);
    }
    if let Some(v) = fields.property_drawing {
        project.property_drawing = Some(v);
    }
    if let Some(v) = fields.studies {
        project.studies = Some(v);
    }
    if let Some(v) = fields.achievements {
        project.achievements = Some(v);
    }
    if let Some(v) = fields.indicator_1 {
        project.indicator_1 = Some(v);
    }
    if let Some(v) = fields.indicator_2 {
        project.indicator_2 = Some(v);
    }
    if let Some(v) = fields.indicator_3 {
        project.indicator_3 = Some(v);
    }
    if let Some(v) = fields.potential_partners {
        project.potential_partners = Some(v);
    }
    if let Some(v) = fields.funding_sources {
        project.funding_sources = Some(v);
    }

    projects::update(pool, &project).await?;
    println!("Updated project {}", project.code.bright_green().bold());

    Ok(())
}

async fn delete(code: &str, yes: bool, pool: &SqlitePool) -> Result<()> {
    if projects::get_by_code(pool, code).await?.is_none() {
        bail!("No project with code {}", code);
    }

    if !yes {
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(format!(
                "Delete project {} and all of its tracking/snapshots?",
                code
            ))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("Aborted");
            return Ok(());
        }
    }

    projects::delete_by_code(pool, code).await?;
    println!("Deleted project {}", code.red());

    Ok(())
}
