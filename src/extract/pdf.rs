use lopdf::Document;

use super::{DocumentKind, ExtractionError};

/// Page texts in ascending page order, each followed by a newline.
pub fn extract(bytes: &[u8]) -> Result<String, ExtractionError> {
    let doc = Document::load_mem(bytes).map_err(corrupt)?;
    if doc.is_encrypted() {
        return Err(ExtractionError::CorruptOrProtected {
            detail: "document is encrypted".to_string(),
        });
    }

    let mut full_text = String::new();
    // get_pages is a BTreeMap keyed by page number
    for page_number in doc.get_pages().keys() {
        let page_text = doc.extract_text(&[*page_number]).map_err(corrupt)?;
        full_text.push_str(&page_text);
        full_text.push('\n');
    }

    if full_text.trim().is_empty() {
        return Err(ExtractionError::Empty {
            kind: DocumentKind::Pdf,
        });
    }
    Ok(full_text)
}

fn corrupt(e: lopdf::Error) -> ExtractionError {
    ExtractionError::CorruptOrProtected {
        detail: e.to_string(),
    }
}
