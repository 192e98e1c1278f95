use anyhow::Result;
use reelog_enrich::{config, Config};

/// Show the current effective configuration.
pub fn show_config() -> Result<()> {
    let config = Config::load()?;

    println!("Current Configuration");
    println!("=====================\n");

    println!("Config file: {}", config::config_file_path().display());

    let exists = config::config_file_path().exists();
    println!("File exists: {}\n", if exists { "yes" } else { "no (using defaults)" });

    println!("Settings:");
    println!(
        "  omdb_api_key: {}",
        if config.omdb_api_key.is_some() { "<set>" } else { "<not set>" }
    );
    println!("  omdb_base_url: {}", config.omdb_base_url);
    println!("  request_timeout_secs: {}", config.request_timeout_secs);
    println!("  database_path: {}", config.database_path.display());
    println!("  site_dir: {}", config.site_dir.display());
    println!(
        "  template_path: {}",
        config
            .template_path
            .as_ref()
            .map_or_else(|| "<built-in>".to_string(), |p| p.display().to_string())
    );
    println!("  on_lookup_failure: {:?}", config.on_lookup_failure);
    println!("  on_duplicate: {:?}", config.on_duplicate);
    println!("  logging.level: {}", config.logging.level);
    println!("  logging.coloured: {}", config.logging.coloured);
    println!("  logging.report_caller: {}", config.logging.report_caller);

    println!(
        "\nPriority: CLI args > ENV vars (REELOG_*, {}) > Config file > Defaults",
        config::OMDB_API_KEY_ENV
    );

    Ok(())
}

/// Show the config file path.
pub fn show_path() -> Result<()> {
    println!("{}", config::config_file_path().display());
    Ok(())
}

/// Show example configuration.
pub fn show_example() -> Result<()> {
    print!("{}", config::example_config());
    Ok(())
}

/// Initialize config file with defaults.
pub fn init_config() -> Result<()> {
    let created = config::ensure_config_file()?;
    let config_path = config::config_file_path();

    if created {
        println!("✓ Created config file: {}", config_path.display());
        println!("\nEdit this file to configure reelog.");
    } else {
        println!("Config file already exists: {}", config_path.display());
    }

    Ok(())
}
