use anyhow::Context;
use clap::{Parser, Subcommand};
use configuration::ServerOverrides;
use database::SessionProvider;
use std::path::PathBuf;

/// The main entry point for the adverts service.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let cli = Cli::parse();

    // `load_config` also reads a `.env` file, if there is one.
    let mut settings = configuration::load_config(cli.config.as_deref())
        .context("failed to load configuration")?;
    let _log_guard = configuration::init_tracing(&settings.log)?;

    // Execute the appropriate command
    match cli.command {
        Commands::Serve(overrides) => {
            settings.apply_overrides(&overrides);
            web_server::run_server(settings).await
        }
        Commands::Migrate => handle_migrate(&settings).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// A small JSON-over-HTTP service for managing adverts.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file (defaults to an optional `config.toml`).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API. The schema is created first if it is missing.
    Serve(ServerOverrides),
    /// Create the schema if it is missing, then exit.
    Migrate,
}

/// Applies the schema and releases the pool.
async fn handle_migrate(settings: &configuration::Settings) -> anyhow::Result<()> {
    let sessions = SessionProvider::init(&settings.database)
        .await
        .context("failed to prepare the database")?;
    sessions.close().await;
    tracing::info!("Database schema is up to date.");
    Ok(())
}
