mod cli;
mod excel;
mod metrics;
mod models;
mod store;

use anyhow::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    // The header tables are static data; refuse to run against an
    // inconsistent build
    excel::headers::validate()?;

    let cli = cli::Cli::parse();

    let db_path = match &cli.db {
        Some(path) => path.clone(),
        None => store::default_db_path()?,
    };
    log::debug!("using database {}", db_path.display());

    let pool = store::open(&db_path).await?;

    cli::dispatch(cli.command, &pool).await
}
