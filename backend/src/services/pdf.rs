use crate::errors::ExtractionError;

/// Extracts text page by page and joins the pages with newlines.
///
/// Image-only or corrupted documents yield [`ExtractionError::NoText`].
pub fn extract_text(pdf_bytes: &[u8]) -> Result<String, ExtractionError> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(pdf_bytes)
        .map_err(|e| ExtractionError::Pdf(e.to_string()))?;

    tracing::debug!("PDF parsed: {} pages", pages.len());
    join_pages(&pages)
}

fn join_pages(pages: &[String]) -> Result<String, ExtractionError> {
    let mut text = String::new();
    for page in pages {
        text.push_str(page);
        text.push('\n');
    }

    let text = text.trim();
    if text.is_empty() {
        return Err(ExtractionError::NoText);
    }
    Ok(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_pages() {
        let pages = vec!["Page one text".to_string(), "Page two text".to_string()];
        assert_eq!(join_pages(&pages).unwrap(), "Page one text\nPage two text");
    }

    #[test]
    fn test_blank_pages_have_no_text() {
        let pages = vec!["  \n".to_string(), String::new()];
        assert!(matches!(join_pages(&pages), Err(ExtractionError::NoText)));
        assert!(matches!(join_pages(&[]), Err(ExtractionError::NoText)));
    }

    const TWO_PAGES: &[u8] = include_bytes!(concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/two_pages.pdf"));

    #[test]
    fn test_extracts_text_from_every_page() {
        let text = extract_text(TWO_PAGES).unwrap();
        let words = text.split_whitespace().collect::<Vec<_>>().join(" ");

        let first = words.find("Cells are the basic unit of life.").unwrap();
        let second = words.find("Mitochondria produce ATP.").unwrap();
        assert!(first < second);
        assert_eq!(text, text.trim());
    }

    #[test]
    fn test_garbage_bytes_fail() {
        assert!(extract_text(b"definitely not a pdf").is_err());
    }
}
