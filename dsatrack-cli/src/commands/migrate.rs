//! Schema migration command

use anyhow::{Context, Result};
use clap::Parser;

use dsatrack_server::db::{create_pool, migrations};
use dsatrack_server::Settings;

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    /// Database URL (overrides config)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,
}

/// Apply the schema to the configured database
pub async fn run_migrate(args: MigrateArgs, settings: Settings) -> Result<()> {
    let database_url = args
        .database_url
        .or(settings.database.url)
        .context("DATABASE_URL not set. Set via --database-url, DATABASE_URL env, .env or config file")?;

    let pool = create_pool(&database_url, 1)
        .await
        .context("Failed to create database pool")?;

    migrations::run(&pool)
        .await
        .context("Failed to run migrations")?;

    Ok(())
}
