//! Search command implementation.

use anyhow::Result;
use colored::Colorize;

/// Full-text search over latest-version chunks.
pub fn run(query: &str, limit: usize) -> Result<()> {
    let (_, _, store) = super::open_context()?;

    let hits = store.query(query, limit)?;

    if hits.is_empty() {
        println!("{}", "No matching chunks found.".yellow());
        return Ok(());
    }

    println!(
        "{} {} result(s) for \"{}\"",
        "Found".cyan(),
        hits.len(),
        query
    );
    println!();

    for (i, hit) in hits.iter().enumerate() {
        println!(
            "{} {} {} {}",
            format!("[{}]", i + 1).cyan(),
            hit.metadata.file_name.bold(),
            format!("p.{}", hit.metadata.source_pages).dimmed(),
            format!("v{} ({})", hit.metadata.version, hit.metadata.chunk_role).dimmed(),
        );
        println!("    {}", snippet(&hit.content, 200));
        println!();
    }

    Ok(())
}

fn snippet(content: &str, max_len: usize) -> String {
    let flattened = content.split_whitespace().collect::<Vec<_>>().join(" ");
    if flattened.chars().count() <= max_len {
        flattened
    } else {
        let truncated: String = flattened.chars().take(max_len).collect();
        format!("{}...", truncated)
    }
}
