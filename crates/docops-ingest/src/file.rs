//! Document text extraction for uploaded and pasted content.

use std::io::{Cursor, Read};
use std::path::PathBuf;

use docops_core::{Error, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const PDF_NO_TEXT_PLACEHOLDER: &str = "PDF uploaded but no text extracted. May require OCR.";
pub const PDF_UNPARSEABLE_PLACEHOLDER: &str =
    "PDF uploaded but could not be parsed. May be corrupted or require OCR.";

const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Kind of input the text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupportedFileType {
    Pdf,
    Docx,
    Txt,
    Paste,
}

impl SupportedFileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Txt => "txt",
            Self::Paste => "paste",
        }
    }
}

impl std::fmt::Display for SupportedFileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Detect file type from the file name's extension.
pub fn detect_file_type(file_name: &str) -> Option<SupportedFileType> {
    let ext = file_name.rsplit('.').next()?.to_lowercase();
    match ext.as_str() {
        "pdf" => Some(SupportedFileType::Pdf),
        "docx" | "doc" => Some(SupportedFileType::Docx),
        "txt" => Some(SupportedFileType::Txt),
        _ => None,
    }
}

/// Extension first, MIME type as a fallback.
pub fn validate_file_type(file_name: &str, mime_type: Option<&str>) -> Option<SupportedFileType> {
    if let Some(t) = detect_file_type(file_name) {
        return Some(t);
    }
    match mime_type?.trim().to_lowercase().as_str() {
        "application/pdf" => Some(SupportedFileType::Pdf),
        DOCX_MIME => Some(SupportedFileType::Docx),
        "text/plain" => Some(SupportedFileType::Txt),
        _ => None,
    }
}

pub fn validate_file_size(len: u64, max_mb: u64) -> bool {
    len <= max_mb * 1024 * 1024
}

/// Where the document's content lives. Resolved once, at the boundary.
#[derive(Debug, Clone)]
pub enum DocumentSource {
    RawBytes(Vec<u8>),
    FileHandle(PathBuf),
    PlainString(String),
}

impl DocumentSource {
    fn into_bytes(self) -> Result<Vec<u8>> {
        match self {
            DocumentSource::RawBytes(bytes) => Ok(bytes),
            DocumentSource::FileHandle(path) => Ok(std::fs::read(path)?),
            DocumentSource::PlainString(s) => Ok(s.into_bytes()),
        }
    }

    fn into_text(self) -> Result<String> {
        match self {
            DocumentSource::PlainString(s) => Ok(s),
            other => Ok(String::from_utf8_lossy(&other.into_bytes()?).into_owned()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_count: Option<usize>,
}

/// Plain text extracted from a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedDocument {
    pub text: String,
    pub file_type: SupportedFileType,
    pub metadata: DocumentMetadata,
}

/// Extract trimmed plain text from `source`.
///
/// PDF problems never fail: an unreadable or image-only PDF yields a
/// placeholder sentence instead. A broken DOCX is an [`Error::Ingest`].
pub fn parse_document(source: DocumentSource, file_type: SupportedFileType) -> Result<ParsedDocument> {
    let (text, metadata) = match file_type {
        SupportedFileType::Pdf => parse_pdf(&source.into_bytes()?),
        SupportedFileType::Docx => (parse_docx(&source.into_bytes()?)?, DocumentMetadata::default()),
        SupportedFileType::Txt | SupportedFileType::Paste => {
            (source.into_text()?, DocumentMetadata::default())
        }
    };

    debug!(%file_type, chars = text.len(), "Parsed document");
    Ok(ParsedDocument {
        text: text.trim().to_string(),
        file_type,
        metadata,
    })
}

fn parse_pdf(bytes: &[u8]) -> (String, DocumentMetadata) {
    let unparseable = || {
        (
            PDF_UNPARSEABLE_PLACEHOLDER.to_string(),
            DocumentMetadata { page_count: Some(0) },
        )
    };

    // Some malformed fonts make pdf-extract panic rather than return an error.
    let extracted = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes));
    let text = match extracted {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => {
            warn!("PDF parsing failed: {}", e);
            return unparseable();
        }
        Err(_) => {
            warn!("PDF parser panicked");
            return unparseable();
        }
    };

    let trimmed = text.trim();
    if trimmed.is_empty() {
        return (
            PDF_NO_TEXT_PLACEHOLDER.to_string(),
            DocumentMetadata { page_count: Some(0) },
        );
    }

    let page_count = match pdf_extract::Document::load_mem(bytes) {
        Ok(doc) => doc.get_pages().len(),
        // pdf-extract separates pages with form feeds.
        Err(_) => trimmed.split('\x0c').filter(|p| !p.trim().is_empty()).count(),
    };
    (
        trimmed.to_string(),
        DocumentMetadata {
            page_count: Some(page_count.max(1)),
        },
    )
}

fn parse_docx(bytes: &[u8]) -> Result<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| Error::Ingest(format!("Failed to parse DOCX document: {e}")))?;
    let mut entry = archive
        .by_name("word/document.xml")
        .map_err(|e| Error::Ingest(format!("DOCX is missing word/document.xml: {e}")))?;

    let mut xml = String::new();
    entry
        .read_to_string(&mut xml)
        .map_err(|e| Error::Ingest(format!("Failed to read DOCX body: {e}")))?;

    docx_xml_to_text(&xml)
}

/// Text runs joined, paragraphs and breaks as newlines, tabs kept.
///
/// Only `w:t` content is emitted; entity and character references are
/// resolved.
pub fn docx_xml_to_text(xml: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::new();
    let mut in_run_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"w:t" => in_run_text = true,
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:t" => in_run_text = false,
                b"w:p" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"w:tab" => out.push('\t'),
                b"w:br" | b"w:cr" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Text(t)) if in_run_text => {
                let text = t
                    .unescape()
                    .map_err(|e| Error::Ingest(format!("Invalid text in DOCX body: {e}")))?;
                out.push_str(&text);
            }
            Ok(Event::CData(t)) if in_run_text => {
                out.push_str(&String::from_utf8_lossy(&t.into_inner()));
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(Error::Ingest(format!(
                    "Malformed DOCX body at position {}: {e}",
                    reader.buffer_position()
                )))
            }
        }
    }
    Ok(out)
}
