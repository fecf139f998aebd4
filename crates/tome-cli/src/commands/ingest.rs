//! Ingest command implementation.

use anyhow::Result;
use colored::Colorize;
use glob::Pattern;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tome_ingest::{scan_directory, IngestOutcome};
use tome_store::write_manifest;
use tracing::warn;

/// Ingest a file or directory.
pub fn run(path: &str, dry_run: bool) -> Result<()> {
    let expanded = shellexpand::tilde(path);
    let target = PathBuf::from(expanded.as_ref());

    if !target.exists() {
        anyhow::bail!("Path does not exist: {}", target.display());
    }

    let (config, paths, store) = super::open_context()?;

    let files: Vec<PathBuf> = if target.is_dir() {
        let patterns: Vec<Pattern> = config
            .watch
            .ignore_patterns
            .iter()
            .filter_map(|p| Pattern::new(p).ok())
            .collect();
        scan_directory(&target, &patterns)?
    } else {
        vec![target]
    };

    if files.is_empty() {
        println!("{}", "No files to ingest.".yellow());
        return Ok(());
    }

    if dry_run {
        println!("{}", "Would ingest:".cyan());
        for file in &files {
            println!("  {}", file.display());
        }
        return Ok(());
    }

    let pipeline = super::build_pipeline(&config, std::sync::Arc::clone(&store))?;

    let bar = ProgressBar::new(files.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let mut stored = 0usize;
    let mut duplicates = 0usize;
    let mut failures = 0usize;

    for file in &files {
        bar.set_message(display_name(file));

        match pipeline.ingest_file(file) {
            Ok(IngestOutcome::Stored { .. }) => stored += 1,
            Ok(IngestOutcome::Duplicate) => duplicates += 1,
            Ok(IngestOutcome::SkippedEmpty) => {
                warn!("No usable text extracted from {:?}", file);
                failures += 1;
            }
            Err(e) => {
                warn!("Failed to ingest {:?}: {}", file, e);
                failures += 1;
            }
        }
        bar.inc(1);
    }
    bar.finish_and_clear();

    if stored > 0 {
        write_manifest(store.as_ref(), &paths.manifest_file)?;
    }

    println!(
        "{} {} stored, {} unchanged, {} failed",
        "Done:".green(),
        stored,
        duplicates,
        failures
    );

    Ok(())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("?")
        .to_string()
}
