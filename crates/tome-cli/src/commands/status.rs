//! Status command implementation.

use anyhow::Result;
use colored::Colorize;

/// Show store statistics.
pub fn run() -> Result<()> {
    let (config, paths, store) = super::open_context()?;

    let stats = store.stats()?;

    println!("{}", "Tome Status".cyan().bold());
    println!();
    println!("Store:     {}", paths.store_file.display());
    println!("Manifest:  {}", paths.manifest_file.display());
    println!();
    println!("Documents: {}", stats.total_documents);
    println!("Versions:  {}", stats.total_versions);
    println!("Chunks:    {}", stats.total_chunks);
    println!();
    println!(
        "LLM:       {} ({})",
        config.llm.host, config.llm.model
    );

    Ok(())
}
