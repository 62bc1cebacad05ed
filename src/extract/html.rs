use scraper::{ElementRef, Html, Node, Selector};

use super::{DocumentKind, ExtractionError};

const SKIPPED: [&str; 4] = ["script", "style", "noscript", "template"];

/// Text content of `<body>`, markup removed, script and style bodies dropped.
pub fn extract(bytes: &[u8]) -> Result<String, ExtractionError> {
    let source = String::from_utf8_lossy(bytes);
    let document = Html::parse_document(&source);
    let body_selector = Selector::parse("body").map_err(|e| ExtractionError::Corrupt {
        kind: DocumentKind::Html,
        detail: e.to_string(),
    })?;

    let mut content = String::new();
    if let Some(body) = document.select(&body_selector).next() {
        collect_text(body, &mut content);
    }

    if content.trim().is_empty() {
        return Err(ExtractionError::Empty {
            kind: DocumentKind::Html,
        });
    }
    Ok(content)
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) if SKIPPED.contains(&el.name()) => {}
            Node::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    collect_text(child_element, out);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn head_and_scripts_are_dropped() {
        let html = b"<html><head><title>T</title></head><body><h1>Unit 1</h1>\
            <script>var x = 1;</script><p>Ohm's <b>law</b></p><style>p{}</style></body></html>";
        let text = extract(html).unwrap();
        assert_eq!(text, "Unit 1Ohm's law");
    }

    #[test]
    fn markup_only_body_is_empty() {
        let html = b"<html><body><div> </div><script>x()</script></body></html>";
        let err = extract(html).unwrap_err();
        assert_eq!(err.reason(), "empty");
    }
}
