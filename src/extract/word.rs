use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Cursor, Read};

use super::{DocumentKind, ExtractionError};

const BODY_PART: &str = "word/document.xml";

/// Raw text of a WordprocessingML body. Legacy binary `.doc` files are not
/// zip archives and come back as `Corrupt`.
pub fn extract(bytes: &[u8]) -> Result<String, ExtractionError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).map_err(corrupt)?;
    let mut xml = String::new();
    archive
        .by_name(BODY_PART)
        .map_err(corrupt)?
        .read_to_string(&mut xml)
        .map_err(corrupt)?;

    let text = body_text(&xml)?;
    if text.trim().is_empty() {
        return Err(ExtractionError::Empty {
            kind: DocumentKind::Word,
        });
    }
    Ok(text)
}

fn body_text(xml: &str) -> Result<String, ExtractionError> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::new();
    let mut in_run_text = false;
    // <w:tabs> holds tab stop definitions, not tab characters
    let mut in_tab_stops = false;

    loop {
        match reader.read_event().map_err(corrupt)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"t" => in_run_text = true,
                b"tabs" => in_tab_stops = true,
                _ => {}
            },
            Event::End(e) => match e.local_name().as_ref() {
                b"t" => in_run_text = false,
                b"tabs" => in_tab_stops = false,
                b"p" => out.push('\n'),
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"tab" if !in_tab_stops => out.push('\t'),
                b"br" | b"cr" => out.push('\n'),
                b"p" => out.push('\n'),
                _ => {}
            },
            Event::Text(t) if in_run_text => {
                out.push_str(&t.unescape().map_err(corrupt)?);
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(out)
}

fn corrupt(e: impl std::fmt::Display) -> ExtractionError {
    ExtractionError::Corrupt {
        kind: DocumentKind::Word,
        detail: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tab_stops_are_not_text() {
        let xml = r#"<w:document xmlns:w="w"><w:body>
            <w:p><w:pPr><w:tabs><w:tab w:val="left" w:pos="720"/></w:tabs></w:pPr>
            <w:r><w:t>A</w:t></w:r><w:r><w:tab/><w:t>B &amp; C</w:t></w:r></w:p>
            <w:p/>
        </w:body></w:document>"#;
        assert_eq!(body_text(xml).unwrap(), "A\tB & C\n\n");
    }
}
