//! Watch command implementation.

use anyhow::Result;
use colored::Colorize;
use tome_config::Config;
use tome_ingest::WatchSupervisor;

/// Start the directory watcher in the foreground.
pub fn run() -> Result<()> {
    let (config, paths, store) = super::open_context()?;

    if config.watch.directories.is_empty() {
        println!("{}", "No watch directories configured.".yellow());
        println!("Add directories with: tome config add-watch <path>");
        return Ok(());
    }

    // Check external OCR tools
    let tools = tome_extract::check_dependencies();
    let missing: Vec<_> = tools.iter().filter(|(_, available)| !available).collect();
    if !missing.is_empty() {
        println!("{}", "Warning: Some OCR tools are not available:".yellow());
        for (tool, _) in &missing {
            println!("  - {}", tool);
        }
        println!("OCR fallback will be skipped.\n");
    }

    println!("{}", "Starting directory watcher...".cyan());
    println!("Watching directories:");
    for dir in &config.watch.directories {
        let expanded = shellexpand::tilde(dir);
        let path = std::path::Path::new(expanded.as_ref());
        if path.exists() {
            println!("  {} {}", "+".green(), dir);
        } else {
            println!("  {} {} (not found)", "-".red(), dir);
        }
    }
    println!("\nPress Ctrl+C to stop.\n");

    let pipeline = super::build_pipeline(&config, store)?;
    let mut supervisor = WatchSupervisor::start(&config, pipeline, paths.manifest_file.clone())?;

    // Block until Ctrl+C, then request a cooperative stop; any in-flight
    // batch finishes before the worker exits.
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(tokio::signal::ctrl_c())?;

    println!("\n{}", "Stopping watcher...".cyan());
    supervisor.stop();
    println!("{}", "Watcher stopped.".green());

    Ok(())
}

/// Show watch configuration and status.
pub fn status() -> Result<()> {
    let config = Config::load().unwrap_or_default();

    println!("{}", "Watch Configuration".cyan().bold());
    println!();

    if config.watch.directories.is_empty() {
        println!("{}", "No directories configured.".yellow());
    } else {
        println!("Directories:");
        for dir in &config.watch.directories {
            let expanded = shellexpand::tilde(dir);
            let path = std::path::Path::new(expanded.as_ref());
            if path.exists() {
                println!("  {} {} (exists)", "+".green(), dir);
            } else {
                println!("  {} {} (not found)", "-".red(), dir);
            }
        }
    }

    println!();
    println!("Ignore patterns:");
    for pattern in &config.watch.ignore_patterns {
        println!("  - {}", pattern);
    }

    println!();
    println!("Batch interval: {}s", config.watch.batch_interval_seconds);

    println!();
    println!("OCR tools:");
    for (tool, available) in tome_extract::check_dependencies() {
        if available {
            println!("  {} {} (installed)", "+".green(), tool);
        } else {
            println!("  {} {} (not found)", "-".red(), tool);
        }
    }

    Ok(())
}
