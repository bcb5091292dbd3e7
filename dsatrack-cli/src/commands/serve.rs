//! HTTP server command
//!
//! Settings come from the config file; flags and environment variables
//! override individual values before validation.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use dsatrack_server::auth::Auth;
use dsatrack_server::config::AuthSettings;
use dsatrack_server::db::{create_pool, migrations};
use dsatrack_server::{run_server, AppState, MemoryStore, PgStore, Settings, Store};

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to (default: 127.0.0.1:8080)
    #[arg(long, short = 'b')]
    pub bind: Option<SocketAddr>,

    /// Mirror any CORS origin with credentials - development only
    #[arg(long)]
    pub cors_permissive: bool,

    /// Database URL (overrides config)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Token signing secret, at least 32 bytes (overrides config)
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,

    /// Comma-separated deployment profiles, e.g. "prod" or "neon"
    #[arg(long, env = "APP_PROFILES")]
    pub profiles: Option<String>,

    /// Keep all data in memory instead of Postgres (lost on exit)
    #[arg(long)]
    pub in_memory: bool,

    /// Skip schema migrations at startup
    #[arg(long)]
    pub skip_migrations: bool,
}

impl ServeArgs {
    /// Apply flag/env overrides on top of loaded settings
    fn apply(&self, settings: &mut Settings) {
        if let Some(bind) = self.bind {
            settings.http.bind = bind;
        }
        if self.cors_permissive {
            settings.http.cors_permissive = true;
        }
        if let Some(url) = &self.database_url {
            settings.database.url = Some(url.clone());
        }
        if let Some(secret) = &self.jwt_secret {
            settings.auth.jwt_secret = secret.clone();
        }
        if let Some(profiles) = &self.profiles {
            settings.auth.profiles = AuthSettings::parse_profiles(profiles);
        }
    }
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs, mut settings: Settings) -> Result<()> {
    args.apply(&mut settings);
    settings.validate().context("invalid configuration")?;

    let store: Arc<dyn Store> = if args.in_memory {
        tracing::warn!("Using in-memory store - data is lost on shutdown");
        Arc::new(MemoryStore::new())
    } else {
        let database_url = settings.database.url.as_deref().context(
            "DATABASE_URL not set. Set via --database-url, DATABASE_URL env, .env or config file",
        )?;

        let pool = create_pool(database_url, settings.database.max_connections)
            .await
            .context("Failed to create database pool")?;

        if !args.skip_migrations {
            migrations::run(&pool)
                .await
                .context("Failed to run migrations")?;
        }
        Arc::new(PgStore::new(pool))
    };

    let auth = Auth::from_settings(&settings.auth);
    tracing::info!(
        secure_cookies = auth.cookies.secure,
        profiles = ?settings.auth.profiles,
        "Starting dsatrack server on {}",
        settings.http.bind
    );

    let state = Arc::new(AppState::new(store, auth));
    run_server(state, &settings.http)
        .await
        .context("Server error")?;

    Ok(())
}
