//! OCR fallback using Tesseract, with PDF page rasterization via pdftoppm.

use crate::error::{ExtractError, ExtractResult};
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Run OCR over an image file.
pub fn recognize_image(image_path: &Path, language: &str) -> ExtractResult<String> {
    if !image_path.exists() {
        return Err(ExtractError::FileNotFound(image_path.to_path_buf()));
    }

    if which::which("tesseract").is_err() {
        return Err(ExtractError::ToolNotFound {
            tool: "tesseract".to_string(),
        });
    }

    debug!("Running OCR on {:?}", image_path);

    let output = Command::new("tesseract")
        .arg(image_path)
        .arg("stdout") // Output to stdout instead of file
        .args(["-l", language])
        .args(["--oem", "3"]) // LSTM + legacy engine
        .args(["--psm", "1"]) // Automatic page segmentation with OSD
        .output()?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        // Tesseract sometimes outputs warnings to stderr but still works
        if !output.stdout.is_empty() {
            debug!("Tesseract warning: {}", stderr);
        } else {
            return Err(ExtractError::OcrError(stderr.to_string()));
        }
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Run OCR over a single page of a PDF.
///
/// The page (1-based) is rendered to a temporary PNG with pdftoppm, then
/// recognized with tesseract.
pub fn recognize_pdf_page(pdf_path: &Path, page: u32, language: &str) -> ExtractResult<String> {
    if !pdf_path.exists() {
        return Err(ExtractError::FileNotFound(pdf_path.to_path_buf()));
    }

    if which::which("pdftoppm").is_err() {
        return Err(ExtractError::ToolNotFound {
            tool: "pdftoppm".to_string(),
        });
    }

    let dir = tempfile::tempdir()?;
    let prefix = dir.path().join("page");

    debug!("Rendering page {} of {:?} for OCR", page, pdf_path);

    let page_arg = page.to_string();
    let output = Command::new("pdftoppm")
        .args(["-f", &page_arg, "-l", &page_arg])
        .args(["-png", "-r", "300"])
        .arg(pdf_path)
        .arg(&prefix)
        .output()?;

    if !output.status.success() {
        return Err(ExtractError::OcrError(
            String::from_utf8_lossy(&output.stderr).to_string(),
        ));
    }

    // pdftoppm suffixes the prefix with the page number; accept any produced
    // file rather than guessing the zero-padding width.
    let rendered = std::fs::read_dir(dir.path())?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .find(|p| p.extension().map(|e| e == "png").unwrap_or(false))
        .ok_or_else(|| ExtractError::OcrError("pdftoppm produced no image".to_string()))?;

    recognize_image(&rendered, language)
}
