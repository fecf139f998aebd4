//! List command implementation.

use anyhow::Result;
use colored::Colorize;
use tome_store::write_manifest;

/// List stored documents, refreshing the manifest.
pub fn run() -> Result<()> {
    let (_, paths, store) = super::open_context()?;

    // The store is the source of truth; the manifest is refreshed as a
    // side effect.
    let entries = write_manifest(store.as_ref(), &paths.manifest_file)?;

    if entries.is_empty() {
        println!("{}", "No documents stored.".yellow());
        return Ok(());
    }

    println!("{}", "Stored Documents".cyan().bold());
    println!();
    for entry in &entries {
        println!("  {}  {}", (&entry.doc_id[..8]).dimmed(), entry.filename);
    }
    println!();
    println!("{} document(s)", entries.len());

    Ok(())
}
