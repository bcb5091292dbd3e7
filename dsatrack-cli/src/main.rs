use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use dsatrack_server::Settings;

mod commands;
mod tracing_setup;

use tracing_setup::TracingConfig;

#[derive(Parser, Debug)]
#[command(
    name = "dsatrack",
    author,
    version,
    about = "Study tracker API for coding-practice questions",
    long_about = "Track solved coding questions, revise them in queue order, and \
                  review weekly attempt and topic statistics over a JSON HTTP API."
)]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(long, global = true)]
    debug: bool,

    /// Config file (default: ~/.dsatrack/config.toml if present)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve(commands::serve::ServeArgs),
    /// Create or update the database schema
    Migrate(commands::migrate::MigrateArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // Before parsing so env-backed flags see .env values
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    tracing_setup::init(&TracingConfig { debug: cli.debug }).ok();

    let settings = Settings::load_or_default(cli.config.as_deref())
        .context("failed to load config")?;

    match cli.command {
        Commands::Serve(args) => commands::run_serve(args, settings).await?,
        Commands::Migrate(args) => commands::run_migrate(args, settings).await?,
    }
    Ok(())
}
