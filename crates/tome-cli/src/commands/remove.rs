//! Remove command implementation.

use anyhow::Result;
use colored::Colorize;
use tome_core::doc_id_for_path;
use tome_store::write_manifest;

/// Remove a document and every version sharing its doc id.
///
/// The target may be a stored doc id (or unique prefix) or a source path.
pub fn run(target: &str) -> Result<()> {
    let (_, paths, store) = super::open_context()?;

    let documents = store.documents()?;

    let doc_id = documents
        .iter()
        .find(|entry| entry.doc_id == target || entry.doc_id.starts_with(target))
        .map(|entry| entry.doc_id.clone())
        .unwrap_or_else(|| {
            let expanded = shellexpand::tilde(target);
            doc_id_for_path(expanded.as_ref())
        });

    let removed = store.delete_document(&doc_id)?;
    if removed == 0 {
        println!("{}", "No stored document matches that target.".yellow());
        return Ok(());
    }

    write_manifest(store.as_ref(), &paths.manifest_file)?;
    println!(
        "{} {} chunk(s) across all versions",
        "Removed".green(),
        removed
    );

    Ok(())
}
