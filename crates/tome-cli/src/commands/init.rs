//! Init command implementation.

use anyhow::Result;
use colored::Colorize;
use tome_config::{AppPaths, Config};
use tome_store::{write_manifest, SqliteStore};

/// Initialize config, store, and manifest.
pub fn run() -> Result<()> {
    let paths =
        AppPaths::new().ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;

    if paths.is_initialized() {
        println!("{}", "Tome is already initialized.".yellow());
        println!("Config: {}", paths.config_file.display());
        println!("Store:  {}", paths.store_file.display());
        return Ok(());
    }

    paths.ensure_dirs()?;

    if !paths.config_file.exists() {
        Config::create_default_file(&paths.config_file)?;
        println!("{} {}", "Created config:".green(), paths.config_file.display());
    }

    // Opening the store creates the schema; failure here is fatal.
    let store = SqliteStore::open(&paths.store_file)?;
    println!("{} {}", "Created store:".green(), paths.store_file.display());

    write_manifest(&store, &paths.manifest_file)?;
    println!(
        "{} {}",
        "Created manifest:".green(),
        paths.manifest_file.display()
    );

    println!();
    println!("Next steps:");
    println!("  1. Add watch directories: tome config add-watch <path>");
    println!("  2. Start watching:        tome watch start");

    Ok(())
}
