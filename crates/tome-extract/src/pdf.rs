//! PDF text extraction.

use crate::error::{ExtractError, ExtractResult};
use std::path::Path;
use tracing::debug;

/// Extract per-page text from a PDF.
///
/// `pdf-extract` separates pages with form feeds; each page is cleaned
/// individually so page indices stay aligned with the source document.
pub fn extract_pages(path: &Path) -> ExtractResult<Vec<String>> {
    debug!("Extracting PDF: {:?}", path);

    let content = pdf_extract::extract_text(path).map_err(|e| ExtractError::ParseError {
        path: path.to_path_buf(),
        message: format!("Failed to extract text from PDF: {}", e),
    })?;

    let pages: Vec<String> = content.split('\x0C').map(clean_page_text).collect();

    debug!("Extracted {} pages from PDF", pages.len());
    Ok(pages)
}

/// Normalize whitespace in extracted page text.
fn clean_page_text(text: &str) -> String {
    text.lines()
        .map(|line| line.trim())
        .fold(Vec::new(), |mut acc, line| {
            let last_was_empty = acc.last().map(|s: &&str| s.is_empty()).unwrap_or(false);
            if !(line.is_empty() && last_was_empty) {
                acc.push(line);
            }
            acc
        })
        .join("\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_page_text() {
        let messy = "  Hello  \n\n\n\nWorld  \n\nTest";
        let cleaned = clean_page_text(messy);
        assert!(!cleaned.contains("\n\n\n"));
        assert!(cleaned.starts_with("Hello"));
    }

    #[test]
    fn test_invalid_pdf_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, "not a pdf").unwrap();

        let err = extract_pages(&path).unwrap_err();
        assert!(matches!(err, ExtractError::ParseError { .. }));
    }
}
