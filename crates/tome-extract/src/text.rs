//! Plain text and Markdown extraction.

use crate::error::ExtractResult;
use pulldown_cmark::{Event, Parser, Tag};
use std::path::Path;

/// Read a plain-text file (txt, csv) as a single block.
pub fn extract_plain(path: &Path) -> ExtractResult<String> {
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).trim().to_string())
}

/// Read a Markdown file and render it to plain text.
pub fn extract_markdown(path: &Path) -> ExtractResult<String> {
    let content = std::fs::read_to_string(path)?;
    Ok(render_markdown(&content))
}

/// Render Markdown to plain text, keeping headings, list items, and code.
fn render_markdown(markdown: &str) -> String {
    let parser = Parser::new(markdown);
    let mut text = String::new();

    for event in parser {
        match event {
            Event::End(Tag::Heading(_, _, _)) | Event::End(Tag::Paragraph) => {
                text.push_str("\n\n");
            }
            Event::Start(Tag::Item) => {
                text.push_str("- ");
            }
            Event::End(Tag::Item) | Event::End(Tag::List(_)) => {
                text.push('\n');
            }
            Event::Text(t) => {
                text.push_str(&t);
            }
            Event::Code(code) => {
                text.push('`');
                text.push_str(&code);
                text.push('`');
            }
            Event::SoftBreak | Event::HardBreak => {
                text.push('\n');
            }
            _ => {}
        }
    }

    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_markdown() {
        let text = render_markdown(
            "# Title\n\nA paragraph with `code`.\n\n- one\n- two\n",
        );
        assert!(text.starts_with("Title"));
        assert!(text.contains("A paragraph with `code`."));
        assert!(text.contains("- one"));
        assert!(!text.contains('#'));
    }

    #[test]
    fn test_extract_plain() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "  line one\nline two  \n").unwrap();

        let text = extract_plain(&path).unwrap();
        assert_eq!(text, "line one\nline two");
    }
}
