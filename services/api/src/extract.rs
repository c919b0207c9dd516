//! Document text extraction
//!
//! Pulls plain text out of uploaded resumes and pitch decks. Extraction is
//! strictly best-effort: any failure, from a corrupt file to an unreadable
//! page, degrades to whatever text was recovered so far or to an empty
//! string, and the session proceeds without background context. Nothing
//! here returns an error to callers.

use quick_xml::Reader;
use quick_xml::events::Event;
use std::io::Read;
use tracing::warn;

/// Characters of extracted text echoed back in the upload response.
pub const PREVIEW_CHAR_LIMIT: usize = 500;

/// Accepted upload types, derived from the filename extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    Ppt,
    Pptx,
}

impl FileKind {
    /// Matches the final extension, case-insensitively. Anything outside
    /// the accepted set is `None` and the upload is rejected.
    pub fn from_name(name: &str) -> Option<Self> {
        let (_, extension) = name.rsplit_once('.')?;
        match extension.to_lowercase().as_str() {
            "pdf" => Some(FileKind::Pdf),
            "ppt" => Some(FileKind::Ppt),
            "pptx" => Some(FileKind::Pptx),
            _ => None,
        }
    }
}

/// Extracts text from an uploaded document. Returns an empty string when
/// the file cannot be read at all.
pub fn extract_text(bytes: &[u8], kind: FileKind) -> String {
    let result = match kind {
        FileKind::Pdf => extract_pdf(bytes),
        // Legacy binary .ppt is not a zip archive, so it falls through
        // the failure path and yields an empty string.
        FileKind::Ppt | FileKind::Pptx => extract_slides(bytes),
    };

    match result {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, ?kind, "text extraction failed");
            String::new()
        }
    }
}

/// Truncates extracted text for the upload response.
pub fn preview(text: &str) -> String {
    text.chars().take(PREVIEW_CHAR_LIMIT).collect()
}

fn extract_pdf(bytes: &[u8]) -> anyhow::Result<String> {
    let document = lopdf::Document::load_mem(bytes)?;

    let mut text = String::new();
    for page_number in document.get_pages().keys() {
        match document.extract_text(&[*page_number]) {
            Ok(page_text) => {
                text.push_str(&page_text);
                text.push('\n');
            }
            Err(e) => {
                // Keep whatever was recovered from earlier pages.
                warn!(error = %e, page = *page_number, "PDF page extraction failed");
                break;
            }
        }
    }

    Ok(text)
}

fn extract_slides(bytes: &[u8]) -> anyhow::Result<String> {
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes))?;

    let mut slide_names: Vec<String> = archive
        .file_names()
        .filter(|name| name.starts_with("ppt/slides/slide") && name.ends_with(".xml"))
        .map(str::to_string)
        .collect();
    // Numeric sort so slide10 comes after slide9, not after slide1.
    slide_names.sort_by_key(|name| slide_index(name));

    let mut text = String::new();
    for name in &slide_names {
        let mut xml = String::new();
        archive.by_name(name)?.read_to_string(&mut xml)?;
        for run in text_runs(&xml)? {
            text.push_str(&run);
            text.push('\n');
        }
    }

    Ok(text)
}

fn slide_index(name: &str) -> u32 {
    name.strip_prefix("ppt/slides/slide")
        .and_then(|rest| rest.strip_suffix(".xml"))
        .and_then(|digits| digits.parse().ok())
        .unwrap_or(u32::MAX)
}

/// Collects the contents of every `<a:t>` text run in a slide document.
fn text_runs(xml: &str) -> anyhow::Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    let mut runs = Vec::new();
    let mut current = String::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == b"a:t" => {
                in_text_run = true;
                current.clear();
            }
            Event::End(e) if e.name().as_ref() == b"a:t" => {
                if in_text_run {
                    runs.push(std::mem::take(&mut current));
                }
                in_text_run = false;
            }
            Event::Text(t) if in_text_run => current.push_str(&t.decode()?),
            Event::GeneralRef(r) if in_text_run => {
                if let Some(resolved) = resolve_entity(&r) {
                    current.push_str(&resolved);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(runs)
}

/// Resolves the predefined XML entities plus numeric character references.
/// Slide markup uses nothing beyond these.
fn resolve_entity(name: &[u8]) -> Option<String> {
    match name {
        b"amp" => Some("&".to_string()),
        b"lt" => Some("<".to_string()),
        b"gt" => Some(">".to_string()),
        b"quot" => Some("\"".to_string()),
        b"apos" => Some("'".to_string()),
        _ => {
            let name = std::str::from_utf8(name).ok()?;
            let digits = name.strip_prefix('#')?;
            let code = match digits.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => digits.parse().ok()?,
            };
            char::from_u32(code).map(String::from)
        }
    }
}
