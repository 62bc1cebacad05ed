//! Text Extraction Adapter
//!
//! Dispatches an uploaded file on its *declared* media type to one of four
//! strategies and normalizes every failure into [`ExtractionError`].
//! No network access happens here.

pub mod html;
pub mod pdf;
pub mod plain;
pub mod word;

use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    PlainText,
    Markdown,
    Pdf,
    Word,
    Html,
}

pub const PLAIN_TEXT: &str = "text/plain";
pub const MARKDOWN: &str = "text/markdown";
pub const PDF: &str = "application/pdf";
pub const MSWORD: &str = "application/msword";
pub const DOCX: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const HTML: &str = "text/html";

impl MediaType {
    /// Parses a declared type such as `text/html; charset=utf-8`.
    pub fn from_declared(declared: &str) -> Option<Self> {
        let essence = declared
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match essence.as_str() {
            PLAIN_TEXT => Some(MediaType::PlainText),
            MARKDOWN => Some(MediaType::Markdown),
            PDF => Some(MediaType::Pdf),
            // "word" is what some browsers report for legacy uploads
            MSWORD | DOCX | "word" => Some(MediaType::Word),
            HTML => Some(MediaType::Html),
            _ => None,
        }
    }

    /// Best-effort media type for a file name. Only the console driver uses this;
    /// the adapter itself trusts the declared type.
    pub fn guess_from_name(name: &str) -> Option<&'static str> {
        let ext = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "txt" => Some(PLAIN_TEXT),
            "md" | "markdown" => Some(MARKDOWN),
            "pdf" => Some(PDF),
            "doc" => Some(MSWORD),
            "docx" => Some(DOCX),
            "html" | "htm" => Some(HTML),
            _ => None,
        }
    }
}

/// Which strategy produced an error, for user-facing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Word,
    Html,
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            DocumentKind::Pdf => "PDF",
            DocumentKind::Word => "Word document",
            DocumentKind::Html => "HTML file",
        })
    }
}

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("unsupported file type: {media_type}")]
    Unsupported { media_type: String },
    #[error("no text content found in {kind}")]
    Empty { kind: DocumentKind },
    #[error("failed to extract text from PDF, the file might be corrupted or password-protected ({detail})")]
    CorruptOrProtected { detail: String },
    #[error("failed to extract text from {kind}, the file might be corrupted ({detail})")]
    Corrupt { kind: DocumentKind, detail: String },
}

impl ExtractionError {
    /// Stable short reason code.
    pub fn reason(&self) -> &'static str {
        match self {
            ExtractionError::Unsupported { .. } => "unsupported",
            ExtractionError::Empty { .. } => "empty",
            ExtractionError::CorruptOrProtected { .. } => "corrupt-or-protected",
            ExtractionError::Corrupt { .. } => "corrupt",
        }
    }
}

/// An uploaded file: display name, browser-style declared type and raw bytes.
#[derive(Debug, Clone)]
pub struct FileDescriptor {
    pub name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl FileDescriptor {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }

    /// Reads a file from disk, declaring its type from the extension.
    /// Unknown extensions are declared as `application/octet-stream`.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let media_type = MediaType::guess_from_name(&name).unwrap_or("application/octet-stream");
        Ok(Self::new(name, media_type, bytes))
    }
}

pub fn extract_text(file: &FileDescriptor) -> Result<String, ExtractionError> {
    let Some(media_type) = MediaType::from_declared(&file.media_type) else {
        warn!("Rejected upload with unsupported type '{}'", file.media_type);
        return Err(ExtractionError::Unsupported {
            media_type: file.media_type.clone(),
        });
    };

    let result = match media_type {
        MediaType::PlainText | MediaType::Markdown => Ok(plain::extract(&file.bytes)),
        MediaType::Pdf => pdf::extract(&file.bytes),
        MediaType::Word => word::extract(&file.bytes),
        MediaType::Html => html::extract(&file.bytes),
    };

    match &result {
        Ok(text) => debug!("Extracted {} chars from {:?} upload", text.len(), media_type),
        Err(e) => warn!("Extraction failed for {:?} upload: {}", media_type, e.reason()),
    }
    result
}

/// Course name suggested by an uploaded file: its name minus the last extension.
pub fn course_name_from_file(name: &str) -> String {
    match name.rfind('.') {
        Some(idx) if idx > 0 => name[..idx].to_string(),
        _ => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_type_ignores_parameters_and_case() {
        assert_eq!(MediaType::from_declared("Text/HTML; charset=UTF-8"), Some(MediaType::Html));
        assert_eq!(MediaType::from_declared("word"), Some(MediaType::Word));
        assert_eq!(MediaType::from_declared("image/png"), None);
    }

    #[test]
    fn course_name_drops_last_extension_only() {
        assert_eq!(course_name_from_file("Intro.to.Networks.pdf"), "Intro.to.Networks");
        assert_eq!(course_name_from_file("syllabus"), "syllabus");
        assert_eq!(course_name_from_file(".env"), ".env");
    }

    #[test]
    fn guessing_from_name() {
        assert_eq!(MediaType::guess_from_name("notes.MD"), Some(MARKDOWN));
        assert_eq!(MediaType::guess_from_name("slides.pptx"), None);
    }
}
