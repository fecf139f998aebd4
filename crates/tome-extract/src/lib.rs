//! Tome Extract - Content extraction for the ingestion pipeline.
//!
//! This crate provides:
//! - Per-file-type extraction strategies (PDF, OOXML office, Markdown, text)
//! - Per-page OCR fallback for low-yield pages (via tesseract and pdftoppm)
//! - The page-number sanitizer applied to every extracted page
//!
//! OCR relies on external tools being installed on the system.

mod error;
mod extractor;
mod ocr;
mod office;
mod pdf;
mod sanitizer;
mod text;

pub use error::{ExtractError, ExtractResult};
pub use extractor::{ContentExtractor, ExtractedPage};
pub use sanitizer::PageSanitizer;

/// Check if the external OCR tools are available.
pub fn check_dependencies() -> Vec<(&'static str, bool)> {
    vec![
        ("tesseract", which::which("tesseract").is_ok()),
        ("pdftoppm", which::which("pdftoppm").is_ok()),
    ]
}
