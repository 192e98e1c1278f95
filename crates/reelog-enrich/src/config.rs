use anyhow::{Context, Result};
use confyg::{env, Confygery};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use reelog_core::policy::{DuplicatePolicy, LookupFailurePolicy};

use crate::omdb::{DEFAULT_OMDB_BASE_URL, DEFAULT_TIMEOUT_SECS};

/// Fallback environment variable for the OMDb credential.
pub const OMDB_API_KEY_ENV: &str = "OMDB_API_KEY";

/// Configuration for reelog.
///
/// Configuration is loaded from multiple sources with the following priority:
/// 1. CLI arguments (highest priority)
/// 2. Environment variables (REELOG_* prefix)
/// 3. Config file (~/.config/reelog/config.toml)
/// 4. Built-in defaults (lowest priority)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// OMDb API key (required for metadata lookups).
    ///
    /// Can be set via:
    /// - ENV: REELOG_OMDB_API_KEY or OMDB_API_KEY
    /// - Config: omdb_api_key = "..."
    pub omdb_api_key: Option<String>,

    /// OMDb endpoint.
    pub omdb_base_url: String,

    /// Upper bound, in seconds, on a single lookup.
    pub request_timeout_secs: u64,

    /// Path to the SQLite database.
    ///
    /// Can be set via:
    /// - CLI: --db /path/to/db
    /// - ENV: REELOG_DATABASE_PATH
    /// - Config: database_path = "/path/to/db"
    /// - Default: ~/.local/share/reelog/reelog.db
    pub database_path: PathBuf,

    /// Directory the generated HTML page is written to.
    pub site_dir: PathBuf,

    /// Optional HTML template; the built-in one is used when unset.
    pub template_path: Option<PathBuf>,

    /// `stub` stores a title-only record when the lookup fails,
    /// `reject` aborts the add.
    pub on_lookup_failure: LookupFailurePolicy,

    /// `reject` refuses a title already in the collection,
    /// `update` refreshes its metadata.
    pub on_duplicate: DuplicatePolicy,

    pub logging: LoggingConfig,
}

/// Logger settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// One of trace, debug, info, warn, error.
    pub level: String,
    pub coloured: bool,
    pub report_caller: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            coloured: true,
            report_caller: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            omdb_api_key: None,
            omdb_base_url: DEFAULT_OMDB_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            database_path: default_db_path(),
            site_dir: PathBuf::from("."),
            template_path: None,
            on_lookup_failure: LookupFailurePolicy::default(),
            on_duplicate: DuplicatePolicy::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Searches for config file at: ~/.config/reelog/config.toml
    /// Reads environment variables with REELOG_ prefix, then falls back
    /// to `OMDB_API_KEY` for the credential.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self> {
        let config_path = config_file_path();

        let mut builder = Confygery::new().context("Failed to create config builder")?;

        if config_path.exists() {
            let path_str = config_path
                .to_str()
                .ok_or_else(|| anyhow::anyhow!("Config path contains invalid UTF-8"))?;
            builder
                .add_file(path_str)
                .context("Failed to load config file")?;
        }

        let env_opts = env::Options::with_top_level("reelog");
        builder
            .add_env(env_opts)
            .context("Failed to load environment variables")?;

        let mut config: Self = builder.build().context("Failed to build configuration")?;

        if config.omdb_api_key.is_none() {
            config.omdb_api_key = std::env::var(OMDB_API_KEY_ENV)
                .ok()
                .filter(|key| !key.trim().is_empty());
        }

        Ok(config)
    }

    /// Load configuration with custom database path.
    ///
    /// This is used when the --db CLI flag is provided.
    pub fn load_with_db_path(db_path: PathBuf) -> Result<Self> {
        let mut config = Self::load()?;
        config.database_path = db_path;
        Ok(config)
    }
}

/// Get the default database path.
///
/// Returns: ~/.local/share/reelog/reelog.db (or platform equivalent)
fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("reelog")
        .join("reelog.db")
}

/// Get the config file path.
///
/// Returns:
/// - Linux: ~/.config/reelog/config.toml
/// - macOS: ~/Library/Application Support/reelog/config.toml
/// - Windows: %APPDATA%\reelog\config.toml
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("reelog")
        .join("config.toml")
}

/// Get the example config file content.
pub fn example_config() -> &'static str {
    r#"# Reelog Configuration File
#
# Configuration is loaded from multiple sources with the following priority:
# 1. CLI arguments (highest priority)
# 2. Environment variables (REELOG_* prefix)
# 3. This config file
# 4. Built-in defaults (lowest priority)

# OMDb API key for movie metadata lookups
#
# Request a free key at: https://www.omdbapi.com/apikey.aspx
#
# Can also be set via:
# - Environment: REELOG_OMDB_API_KEY=your-key-here (or OMDB_API_KEY)
omdb_api_key = "your-omdb-api-key-here"

# Seconds to wait for a lookup before giving up
#request_timeout_secs = 10

# Path to the SQLite database
#
# Can also be set via:
# - CLI: reelog --db /custom/path.db
# - Environment: REELOG_DATABASE_PATH=/custom/path.db
#
# Default: Platform-specific data directory
#database_path = "/path/to/custom/reelog.db"

# Where the generated <profile>.html page is written
#site_dir = "."

# Optional HTML template. It must contain the placeholders
# __TEMPLATE_TITLE__ and __TEMPLATE_MOVIE_GRID__.
#template_path = "/path/to/index_template.html"

# When the lookup fails or finds nothing:
#   "stub"   - store the title alone, marked unverified
#   "reject" - do not add the movie
#on_lookup_failure = "stub"

# When the title is already in the collection:
#   "reject" - refuse the add
#   "update" - refresh the stored metadata
#on_duplicate = "reject"

[logging]
level = "info"
coloured = true
report_caller = false
"#
}

/// Create default config file if it doesn't exist.
///
/// Returns true if a new file was created, false if it already existed.
pub fn ensure_config_file() -> Result<bool> {
    let config_path = config_file_path();

    if config_path.exists() {
        return Ok(false);
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    std::fs::write(&config_path, example_config()).context("Failed to write config file")?;

    Ok(true)
}
