use serde::Serialize;

use crate::errors::ExtractionError;
use crate::services::pdf;

const PDF_TIMEOUT_SECS: u64 = 120;
const WORDS_PER_MINUTE: f64 = 200.0;
const HEADING_MAX_CHARS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    PlainText,
    Pdf,
}

impl DocumentKind {
    /// Maps a MIME type (parameters such as `charset` are ignored) to a kind.
    pub fn from_mime(content_type: &str) -> Option<Self> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match essence.as_str() {
            "text/plain" => Some(DocumentKind::PlainText),
            "application/pdf" => Some(DocumentKind::Pdf),
            _ => None,
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            DocumentKind::PlainText => "text/plain",
            DocumentKind::Pdf => "application/pdf",
        }
    }
}

/// Extract raw text from an uploaded document.
///
/// PDF parsing is CPU-bound and runs on the blocking pool with a timeout so a
/// pathological file can't stall the runtime.
pub async fn extract_text(bytes: &[u8], kind: DocumentKind) -> Result<String, ExtractionError> {
    match kind {
        DocumentKind::PlainText => extract_plaintext(bytes),
        DocumentKind::Pdf => {
            let bytes = bytes.to_vec();
            tracing::info!("extract_text: starting PDF extraction ({} bytes)", bytes.len());

            let handle = tokio::task::spawn_blocking(move || pdf::extract_text(&bytes));

            let text = match tokio::time::timeout(
                std::time::Duration::from_secs(PDF_TIMEOUT_SECS),
                handle,
            )
            .await
            {
                Ok(Ok(result)) => result?,
                Ok(Err(join_err)) => {
                    return Err(ExtractionError::Pdf(format!("parser aborted: {join_err}")));
                }
                Err(_) => return Err(ExtractionError::TimedOut(PDF_TIMEOUT_SECS)),
            };

            tracing::info!("extract_text: PDF extraction succeeded, {} chars", text.len());
            Ok(text)
        }
    }
}

fn extract_plaintext(bytes: &[u8]) -> Result<String, ExtractionError> {
    String::from_utf8(bytes.to_vec()).map_err(|_| ExtractionError::InvalidUtf8)
}

/// Normalise extracted text: collapse whitespace inside lines, drop blank lines,
/// and rebuild paragraphs.
///
/// A line boundary becomes a paragraph break when the previous line ends a
/// sentence or looks like a heading (shorter than 50 characters) and the next
/// line starts with an uppercase letter. Every other boundary becomes a space.
pub fn clean_text_content(text: &str) -> String {
    let lines: Vec<String> = text
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect();

    let mut cleaned = String::with_capacity(text.len());
    for (i, line) in lines.iter().enumerate() {
        cleaned.push_str(line);

        let Some(next) = lines.get(i + 1) else {
            break;
        };

        let ends_sentence = line.ends_with(['.', '!', '?']);
        let is_short = line.chars().count() < HEADING_MAX_CHARS;
        let next_is_upper = next.chars().next().is_some_and(char::is_uppercase);

        if (ends_sentence || is_short) && next_is_upper {
            cleaned.push_str("\n\n");
        } else {
            cleaned.push(' ');
        }
    }

    cleaned
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentStats {
    pub character_count: usize,
    pub word_count: usize,
    pub paragraph_count: usize,
    /// Minutes, at 200 words per minute.
    pub estimated_reading_time: usize,
}

pub fn estimate_reading_time(text: &str) -> usize {
    if text.is_empty() {
        return 0;
    }
    // Halves round to even: 500 words is 2 minutes, 700 words is 4.
    let words = text.split_whitespace().count();
    ((words as f64 / WORDS_PER_MINUTE).round_ties_even() as usize).max(1)
}

pub fn content_stats(text: &str) -> ContentStats {
    ContentStats {
        character_count: text.chars().count(),
        word_count: text.split_whitespace().count(),
        paragraph_count: text.split("\n\n").filter(|p| !p.trim().is_empty()).count(),
        estimated_reading_time: estimate_reading_time(text),
    }
}
