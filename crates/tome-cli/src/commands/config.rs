//! Config command implementation.

use anyhow::Result;
use colored::Colorize;
use tome_config::Config;

/// Show current configuration.
pub fn show() -> Result<()> {
    let config = Config::load().unwrap_or_default();

    println!("{}", "Tome Configuration".cyan().bold());
    println!();

    println!("Watch directories:");
    if config.watch.directories.is_empty() {
        println!("  {}", "(none configured)".yellow());
    } else {
        for dir in &config.watch.directories {
            println!("  - {}", dir);
        }
    }
    println!("Ignore patterns:");
    for pattern in &config.watch.ignore_patterns {
        println!("  - {}", pattern);
    }
    println!("Batch interval: {}s", config.watch.batch_interval_seconds);

    println!();
    println!("Extraction:");
    println!("  min chars per page: {}", config.extraction.min_chars_per_page);
    println!("  ocr enabled:        {}", config.extraction.ocr_enabled);
    println!("  ocr language:       {}", config.extraction.ocr_language);

    println!();
    println!("Chunking:");
    println!("  target chunk chars: {}", config.chunking.target_chunk_chars);
    println!("  coverage tolerance: {}", config.chunking.coverage_tolerance);
    println!("  max attempts:       {}", config.chunking.max_attempts);

    println!();
    println!("LLM:");
    println!("  host:    {}", config.llm.host);
    println!("  model:   {}", config.llm.model);
    println!("  timeout: {}s", config.llm.timeout_seconds);

    Ok(())
}

/// Add a directory to the watch list.
pub fn add_watch(path: &str) -> Result<()> {
    let mut config = Config::load().unwrap_or_default();

    let expanded = shellexpand::tilde(path);
    let dir = std::path::Path::new(expanded.as_ref());
    if !dir.exists() {
        println!("{} {} does not exist", "Warning:".yellow(), path);
    }

    config.add_watch_directory(path.to_string());
    config.save()?;

    println!("{} {}", "Added watch directory:".green(), path);
    Ok(())
}
