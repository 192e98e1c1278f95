use anyhow::{Context, Result};
use clap::Parser;
use std::io;
use std::path::PathBuf;

use reelog_collection::{CollectionService, ServiceOptions};
use reelog_core::schema::Database;
use reelog_enrich::config::LoggingConfig;
use reelog_enrich::{Config, OmdbClient};

mod commands;
mod shell;

#[derive(Debug, Parser)]
#[command(name = "reelog", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to the database (default: ~/.local/share/reelog/reelog.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Start with this profile, creating it if it does not exist yet
    #[arg(long)]
    profile: Option<String>,
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Inspect or create the configuration file
    ///
    /// Settings are read from ~/.config/reelog/config.toml, then overridden
    /// by REELOG_* environment variables (OMDB_API_KEY is also honoured for
    /// the API key), then by command-line flags.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, clap::Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Print the config file location
    Path,
    /// Create a default config file if none exists
    Init,
    /// Print an example config file
    Example,
}

fn setup_logging(logging: &LoggingConfig) -> Result<()> {
    let level = match logging.level.to_lowercase().as_str() {
        "trace" => twyg::LogLevel::Trace,
        "debug" => twyg::LogLevel::Debug,
        "warn" | "warning" => twyg::LogLevel::Warn,
        "error" => twyg::LogLevel::Error,
        _ => twyg::LogLevel::Info,
    };
    let opts = twyg::OptsBuilder::new()
        .coloured(logging.coloured)
        .level(level)
        .report_caller(logging.report_caller)
        .build()
        .map_err(|e| anyhow::anyhow!("invalid logging options: {e:?}"))?;
    twyg::setup(opts).map_err(|e| anyhow::anyhow!("could not set up logging: {e:?}"))?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(Commands::Config { action }) = cli.command {
        return match action {
            ConfigAction::Show => commands::config::show_config(),
            ConfigAction::Path => commands::config::show_path(),
            ConfigAction::Init => commands::config::init_config(),
            ConfigAction::Example => commands::config::show_example(),
        };
    }

    let config = match cli.db {
        Some(path) => Config::load_with_db_path(path)?,
        None => Config::load()?,
    };
    setup_logging(&config.logging)?;

    // Ensure database directory exists
    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let db = Database::open(&config.database_path).with_context(|| {
        format!("Failed to open database {}", config.database_path.display())
    })?;
    log::debug!("Using database {}", config.database_path.display());

    let lookup = OmdbClient::from_config(&config)?;
    if !lookup.has_api_key() {
        log::warn!("No OMDb API key configured; new movies will be stored without metadata");
    }

    let service = CollectionService::new(db, lookup, ServiceOptions::from_config(&config));
    let stdin = io::stdin();
    let mut shell = shell::Shell::new(service, stdin.lock(), io::stdout());

    if let Some(name) = cli.profile {
        shell.preselect(&name)?;
    }

    shell.run().await
}
