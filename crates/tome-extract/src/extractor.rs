//! Per-file-type content extraction with OCR fallback.

use crate::error::{ExtractError, ExtractResult};
use crate::ocr;
use crate::office;
use crate::pdf;
use crate::sanitizer::PageSanitizer;
use crate::text;
use std::path::Path;
use tome_config::ExtractionConfig;
use tome_core::SourceKind;
use tracing::{debug, warn};

/// One page of extracted, sanitized document text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedPage {
    /// 1-based page number in the source document.
    pub page: u32,
    pub text: String,
}

/// Extracts ordered page text from a source file.
///
/// Strategy selection is by file extension. Pages whose extraction yield
/// falls below the configured minimum are retried through OCR, page by page;
/// OCR output wins only when it is strictly longer than the original
/// extraction. Every page is passed through the page-number sanitizer before
/// it is returned.
pub struct ContentExtractor {
    config: ExtractionConfig,
    sanitizer: PageSanitizer,
}

impl ContentExtractor {
    pub fn new(config: ExtractionConfig) -> Self {
        Self {
            config,
            sanitizer: PageSanitizer::new(),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(ExtractionConfig::default())
    }

    /// Extract the ordered page texts of a document.
    pub fn extract(&self, path: &Path) -> ExtractResult<Vec<ExtractedPage>> {
        if !path.exists() {
            return Err(ExtractError::FileNotFound(path.to_path_buf()));
        }

        let kind = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(SourceKind::from_extension)
            .ok_or_else(|| {
                ExtractError::UnsupportedFileType(
                    path.extension()
                        .and_then(|e| e.to_str())
                        .unwrap_or("unknown")
                        .to_string(),
                )
            })?;

        debug!("Extracting {:?} as {}", path, kind);

        let mut pages = match kind {
            SourceKind::Pdf => {
                let mut pages = pdf::extract_pages(path)?;
                if self.config.ocr_enabled {
                    let language = self.config.ocr_language.clone();
                    self.apply_ocr_fallback(&mut pages, |page| {
                        ocr::recognize_pdf_page(path, page, &language)
                    });
                }
                pages
            }
            SourceKind::Office => vec![office::extract_text(path)?],
            SourceKind::Markdown => vec![text::extract_markdown(path)?],
            SourceKind::Text => vec![text::extract_plain(path)?],
            SourceKind::Image => {
                if !self.config.ocr_enabled {
                    return Err(ExtractError::UnsupportedFileType(
                        "image (OCR disabled)".to_string(),
                    ));
                }
                // Images have no extraction strategy besides OCR; an engine
                // failure degrades to an empty page.
                match ocr::recognize_image(path, &self.config.ocr_language) {
                    Ok(recognized) => vec![recognized],
                    Err(e) => {
                        warn!("OCR failed for {:?}: {}", path, e);
                        vec![String::new()]
                    }
                }
            }
        };

        for page in &mut pages {
            *page = self.sanitizer.sanitize(page);
        }

        Ok(pages
            .into_iter()
            .enumerate()
            .map(|(i, text)| ExtractedPage {
                page: (i + 1) as u32,
                text,
            })
            .collect())
    }

    /// Retry low-yield pages through OCR.
    ///
    /// `ocr` receives the 1-based page number. OCR failures keep the original
    /// page text; OCR output replaces it only when strictly longer.
    fn apply_ocr_fallback<F>(&self, pages: &mut [String], mut ocr: F)
    where
        F: FnMut(u32) -> ExtractResult<String>,
    {
        for (i, page) in pages.iter_mut().enumerate() {
            if page.chars().count() >= self.config.min_chars_per_page {
                continue;
            }

            let page_no = (i + 1) as u32;
            debug!(
                "Page {} yield below {} chars, trying OCR",
                page_no, self.config.min_chars_per_page
            );

            match ocr(page_no) {
                Ok(recognized) => {
                    if recognized.chars().count() > page.chars().count() {
                        *page = recognized;
                    } else {
                        debug!("OCR output for page {} not longer, keeping original", page_no);
                    }
                }
                Err(e) => {
                    warn!("OCR fallback failed for page {}: {}", page_no, e);
                }
            }
        }
    }
}
