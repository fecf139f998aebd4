//! OOXML office format extraction (docx, pptx, xlsx).
//!
//! Text is pulled straight from the XML parts inside the ZIP container:
//! `w:t` runs for Word documents, `a:t` runs per slide for presentations,
//! and shared strings for spreadsheets.

use crate::error::{ExtractError, ExtractResult};
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Maximum decompressed bytes to read from a single ZIP entry.
const MAX_XML_ENTRY_BYTES: u64 = 50 * 1024 * 1024;

/// Extract the text of an OOXML office document as a single block.
pub fn extract_text(path: &Path) -> ExtractResult<String> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    debug!("Extracting office document: {:?}", path);
    let bytes = std::fs::read(path)?;

    match ext.as_str() {
        "docx" => extract_docx(path, &bytes),
        "pptx" => extract_pptx(path, &bytes),
        "xlsx" => extract_xlsx(path, &bytes),
        other => Err(ExtractError::UnsupportedFileType(other.to_string())),
    }
}

fn open_archive<'a>(
    path: &Path,
    bytes: &'a [u8],
) -> ExtractResult<zip::ZipArchive<std::io::Cursor<&'a [u8]>>> {
    zip::ZipArchive::new(std::io::Cursor::new(bytes)).map_err(|e| ExtractError::ParseError {
        path: path.to_path_buf(),
        message: format!("Failed to open OOXML container: {}", e),
    })
}

fn read_zip_entry(
    path: &Path,
    archive: &mut zip::ZipArchive<std::io::Cursor<&[u8]>>,
    name: &str,
) -> ExtractResult<Vec<u8>> {
    let entry = archive.by_name(name).map_err(|e| ExtractError::ParseError {
        path: path.to_path_buf(),
        message: format!("Missing {}: {}", name, e),
    })?;

    let mut out = Vec::new();
    entry
        .take(MAX_XML_ENTRY_BYTES)
        .read_to_end(&mut out)
        .map_err(|e| ExtractError::ParseError {
            path: path.to_path_buf(),
            message: format!("Failed to read {}: {}", name, e),
        })?;

    if out.len() as u64 >= MAX_XML_ENTRY_BYTES {
        return Err(ExtractError::ParseError {
            path: path.to_path_buf(),
            message: format!("ZIP entry {} exceeds size limit", name),
        });
    }
    Ok(out)
}

fn extract_docx(path: &Path, bytes: &[u8]) -> ExtractResult<String> {
    let mut archive = open_archive(path, bytes)?;
    let xml = read_zip_entry(path, &mut archive, "word/document.xml")?;
    extract_t_elements(path, &xml)
}

fn extract_pptx(path: &Path, bytes: &[u8]) -> ExtractResult<String> {
    let mut archive = open_archive(path, bytes)?;

    let mut slide_names: Vec<String> = archive
        .file_names()
        .filter(|n| n.starts_with("ppt/slides/slide") && n.ends_with(".xml"))
        .map(|s| s.to_string())
        .collect();
    slide_names.sort_by_key(|name| {
        name.trim_start_matches("ppt/slides/slide")
            .trim_end_matches(".xml")
            .parse::<u32>()
            .unwrap_or(u32::MAX)
    });

    let mut out = String::new();
    for name in slide_names {
        let xml = read_zip_entry(path, &mut archive, &name)?;
        let text = extract_t_elements(path, &xml)?;
        if !out.is_empty() && !text.is_empty() {
            out.push('\n');
        }
        out.push_str(&text);
    }
    Ok(out)
}

fn extract_xlsx(path: &Path, bytes: &[u8]) -> ExtractResult<String> {
    let mut archive = open_archive(path, bytes)?;
    let shared_strings = read_shared_strings(path, &mut archive)?;

    let mut sheet_names: Vec<String> = archive
        .file_names()
        .filter(|n| n.starts_with("xl/worksheets/sheet") && n.ends_with(".xml"))
        .map(|s| s.to_string())
        .collect();
    sheet_names.sort_by_key(|name| {
        name.trim_start_matches("xl/worksheets/sheet")
            .trim_end_matches(".xml")
            .parse::<u32>()
            .unwrap_or(u32::MAX)
    });

    let mut out = String::new();
    for name in sheet_names {
        let xml = read_zip_entry(path, &mut archive, &name)?;
        let cells = extract_sheet_cells(path, &xml, &shared_strings)?;
        if !out.is_empty() && !cells.is_empty() {
            out.push('\n');
        }
        out.push_str(&cells);
    }
    Ok(out)
}

/// Collect the text of every `t` element (covers `w:t` and `a:t` runs).
fn extract_t_elements(path: &Path, xml: &[u8]) -> ExtractResult<String> {
    let mut out = String::new();
    let mut reader = quick_xml::Reader::from_reader(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Start(e)) => {
                if e.local_name().as_ref() == b"t" {
                    if let Ok(quick_xml::events::Event::Text(te)) = reader.read_event_into(&mut buf)
                    {
                        if !out.is_empty() {
                            out.push(' ');
                        }
                        out.push_str(te.unescape().unwrap_or_default().as_ref());
                    }
                }
            }
            Ok(quick_xml::events::Event::Eof) => break,
            Err(e) => {
                return Err(ExtractError::ParseError {
                    path: path.to_path_buf(),
                    message: format!("XML error: {}", e),
                })
            }
            _ => {}
        }
        buf.clear();
    }
    Ok(out)
}

fn read_shared_strings(
    path: &Path,
    archive: &mut zip::ZipArchive<std::io::Cursor<&[u8]>>,
) -> ExtractResult<Vec<String>> {
    if !archive.file_names().any(|n| n == "xl/sharedStrings.xml") {
        return Ok(Vec::new());
    }
    let xml = read_zip_entry(path, archive, "xl/sharedStrings.xml")?;

    let mut strings = Vec::new();
    let mut reader = quick_xml::Reader::from_reader(xml.as_slice());
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut in_si = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Start(e)) => {
                if e.local_name().as_ref() == b"si" {
                    in_si = true;
                } else if in_si && e.local_name().as_ref() == b"t" {
                    if let Ok(quick_xml::events::Event::Text(te)) = reader.read_event_into(&mut buf)
                    {
                        strings.push(te.unescape().unwrap_or_default().into_owned());
                    }
                }
            }
            Ok(quick_xml::events::Event::End(e)) => {
                if e.local_name().as_ref() == b"si" {
                    in_si = false;
                }
            }
            Ok(quick_xml::events::Event::Eof) => break,
            Err(e) => {
                return Err(ExtractError::ParseError {
                    path: path.to_path_buf(),
                    message: format!("XML error in shared strings: {}", e),
                })
            }
            _ => {}
        }
        buf.clear();
    }
    Ok(strings)
}

fn extract_sheet_cells(
    path: &Path,
    xml: &[u8],
    shared_strings: &[String],
) -> ExtractResult<String> {
    let mut cells: Vec<String> = Vec::new();
    let mut reader = quick_xml::Reader::from_reader(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut in_v = false;
    let mut cell_is_shared_str = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Start(e)) => {
                if e.local_name().as_ref() == b"c" {
                    cell_is_shared_str = e.attributes().any(|a| {
                        a.as_ref()
                            .map(|a| a.key.as_ref() == b"t" && a.value.as_ref() == b"s")
                            .unwrap_or(false)
                    });
                } else if e.local_name().as_ref() == b"v" {
                    in_v = true;
                }
            }
            Ok(quick_xml::events::Event::Text(te)) if in_v => {
                let v = te.unescape().unwrap_or_default();
                let s = v.trim();
                if !s.is_empty() && cell_is_shared_str {
                    if let Ok(i) = s.parse::<usize>() {
                        if i < shared_strings.len() {
                            cells.push(shared_strings[i].clone());
                        }
                    }
                }
                in_v = false;
            }
            Ok(quick_xml::events::Event::End(e)) => {
                if e.local_name().as_ref() == b"v" {
                    in_v = false;
                } else if e.local_name().as_ref() == b"c" {
                    cell_is_shared_str = false;
                }
            }
            Ok(quick_xml::events::Event::Eof) => break,
            Err(e) => {
                return Err(ExtractError::ParseError {
                    path: path.to_path_buf(),
                    message: format!("XML error in worksheet: {}", e),
                })
            }
            _ => {}
        }
        buf.clear();
    }
    Ok(cells.join(" "))
}
