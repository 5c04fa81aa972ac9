//! CLI administration tool for hash-shortener.
//!
//! Creates and inspects short URLs directly in the database, without going
//! through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Shorten a URL (prompts for it when omitted)
//! cargo run --bin admin -- shorten https://example.com
//!
//! # Store under an explicit key
//! cargo run --bin admin -- shorten https://example.com --key promo1
//!
//! # Look up a key
//! cargo run --bin admin -- get promo1
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` or `DB_*` (required): PostgreSQL connection
//! - `BASE_URL`, `SHORTENER_RETRY_COUNT`, `SHORTENER_TIMEOUT_SECONDS`: as for the server

use hash_shortener::application::services::{GenerationService, LookupService};
use hash_shortener::config::{self, Config};
use hash_shortener::domain::errors::ShortenerError;
use hash_shortener::infrastructure::persistence::PgUrlStore;
use hash_shortener::utils::hash::Sha256HashProvider;
use hash_shortener::utils::salt::RngSaltProvider;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Input;
use sqlx::PgPool;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// CLI tool for managing hash-shortener.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Create a short URL
    Shorten {
        /// Target URL (prompted for if omitted)
        url: Option<String>,

        /// Explicit 6-character key instead of a generated one
        #[arg(short, long)]
        key: Option<String>,
    },

    /// Show the URL stored under a key
    Get {
        key: String,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = config::load_from_env()?;
    let database_url = config
        .database_url
        .clone()
        .context("DATABASE_URL must be set")?;

    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::Shorten { url, key } => shorten(&config, pool, url, key).await?,
        Commands::Get { key } => get(pool, &key).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

/// Creates a short URL, generating the key unless one is given.
async fn shorten(
    config: &Config,
    pool: PgPool,
    url: Option<String>,
    key: Option<String>,
) -> Result<()> {
    println!("{}", "🔗 Shorten URL".bright_blue().bold());
    println!();

    let url = match url {
        Some(u) => u,
        None => Input::new()
            .with_prompt("Target URL")
            .with_initial_text("https://")
            .interact_text()?,
    };

    let store = Arc::new(PgUrlStore::new(Arc::new(pool)));
    let service = GenerationService::new(
        store,
        Arc::new(Sha256HashProvider),
        Arc::new(RngSaltProvider::new()),
        config.generation_options()?,
    );
    let cancel = CancellationToken::new();

    let result = match key {
        Some(ref key) => service.generate_with_key(key, &url, &cancel).await,
        None => service.generate(&url, &cancel).await,
    };

    match result {
        Ok(created) => {
            let short_url = format!(
                "{}/{}",
                config.base_url.trim_end_matches('/'),
                created.key
            );

            println!("{}", "✅ Short URL created".green().bold());
            println!();
            println!("  Key:       {}", created.key.bright_yellow().bold());
            println!("  Target:    {}", created.target_url.cyan());
            println!("  Short URL: {}", short_url.bright_white());
            println!();
        }
        Err(e) if e.is_conflict() => {
            println!("{}", "❌ Key is already taken".red().bold());
            return Err(e.into());
        }
        Err(e) => {
            println!("{}", "❌ Failed to create short URL".red().bold());
            return Err(e.into());
        }
    }

    Ok(())
}

/// Prints the target URL stored under `key`.
async fn get(pool: PgPool, key: &str) -> Result<()> {
    let service = LookupService::new(Arc::new(PgUrlStore::new(Arc::new(pool))));

    match service.get(key, &CancellationToken::new()).await {
        Ok(found) => {
            println!("  {} → {}", found.key.bright_yellow(), found.target_url.cyan());
        }
        Err(ShortenerError::NotFound(_)) => {
            println!("{}", format!("No short URL with key '{}'", key).yellow());
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}

/// Dispatches database commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            let stored: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM shortened_urls")
                .fetch_one(pool)
                .await?;

            println!("  PostgreSQL:   {}", version.bright_white());
            println!("  Short URLs:   {}", stored.to_string().bright_white());
            println!();
        }
    }

    Ok(())
}
