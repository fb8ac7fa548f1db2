//! DocOps Ingest — file-type detection, PDF/DOCX/TXT text extraction, document hashing.

pub mod file;
pub mod hash;

pub use file::{
    detect_file_type, parse_document, validate_file_size, validate_file_type, DocumentMetadata,
    DocumentSource, ParsedDocument, SupportedFileType,
};
pub use hash::content_hash;
