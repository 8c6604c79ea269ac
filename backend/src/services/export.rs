use anyhow::{Context, Result};
use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};

use crate::db::models::flashcard::CardFace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
    /// Tab-separated `question<TAB>answer` lines for flashcard-app import.
    Anki,
    /// CSV with `term`/`definition` columns.
    Quizlet,
}

impl ExportFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv | ExportFormat::Quizlet => "text/csv",
            ExportFormat::Json => "application/json",
            ExportFormat::Anki => "text/plain",
        }
    }

    /// `flashcards.csv`, or `{prefix}_flashcards.csv` for a named set.
    pub fn file_name(&self, prefix: Option<&str>) -> String {
        let base = match self {
            ExportFormat::Csv => "flashcards.csv",
            ExportFormat::Json => "flashcards.json",
            ExportFormat::Anki => "flashcards_anki.txt",
            ExportFormat::Quizlet => "flashcards_quizlet.csv",
        };
        match prefix.map(sanitize_file_stem).filter(|p| !p.is_empty()) {
            Some(p) => format!("{p}_{base}"),
            None => base.to_string(),
        }
    }
}

impl TryFrom<&str> for ExportFormat {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            "anki" | "txt" => Ok(ExportFormat::Anki),
            "quizlet" => Ok(ExportFormat::Quizlet),
            other => Err(anyhow::anyhow!("Unsupported export format: {other}")),
        }
    }
}

fn sanitize_file_stem(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

/// One row per card; the header comes from the record's field names in declaration order.
pub fn export_csv<T: Serialize>(cards: &[T]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for card in cards {
        writer.serialize(card).context("Failed to write CSV row")?;
    }
    let bytes = writer.into_inner().context("Failed to flush CSV")?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}

#[derive(Serialize)]
struct JsonExport<'a, T> {
    flashcards: &'a [T],
    total_count: usize,
    exported_at: String,
}

pub fn export_json<T: Serialize>(cards: &[T]) -> Result<String> {
    export_json_at(cards, Local::now())
}

pub fn export_json_at<T: Serialize, Tz: TimeZone>(
    cards: &[T],
    exported_at: DateTime<Tz>,
) -> Result<String>
where
    Tz::Offset: std::fmt::Display,
{
    let doc = JsonExport {
        flashcards: cards,
        total_count: cards.len(),
        exported_at: exported_at.to_rfc3339(),
    };
    serde_json::to_string_pretty(&doc).context("Failed to serialize flashcards")
}

/// `question<TAB>answer` per line. Tabs and newlines inside a card are written
/// as-is, which breaks the line structure; pass `html_line_breaks` to turn
/// newlines into `<br>` for importers that render HTML.
pub fn export_anki<T: CardFace>(cards: &[T], html_line_breaks: bool) -> String {
    let face = |s: &str| {
        if html_line_breaks {
            s.replace('\n', "<br>")
        } else {
            s.to_string()
        }
    };

    cards
        .iter()
        .map(|c| format!("{}\t{}", face(c.question()), face(c.answer())))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct QuizletCard {
    pub term: String,
    pub definition: String,
}

pub fn export_quizlet<T: CardFace>(cards: &[T]) -> Result<String> {
    let rows: Vec<QuizletCard> = cards
        .iter()
        .map(|c| QuizletCard {
            term: c.question().to_string(),
            definition: c.answer().to_string(),
        })
        .collect();
    export_csv(&rows)
}

pub fn render<T: Serialize + CardFace>(cards: &[T], format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Csv => export_csv(cards),
        ExportFormat::Json => export_json(cards),
        ExportFormat::Anki => Ok(export_anki(cards, false)),
        ExportFormat::Quizlet => export_quizlet(cards),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::flashcard::CardDraft;
    use chrono::Utc;

    fn cards() -> Vec<CardDraft> {
        vec![
            CardDraft {
                question: "What is \"ATP\", exactly?".into(),
                answer: "Adenosine triphosphate,\nthe cell's energy currency.".into(),
                difficulty: Some("Medium".into()),
                topic: Some("Cell Biology".into()),
            },
            CardDraft {
                question: "What is DNA?".into(),
                answer: "Deoxyribonucleic acid.".into(),
                difficulty: None,
                topic: None,
            },
        ]
    }

    #[test]
    fn test_csv_round_trip() {
        let original = cards();
        let csv_text = export_csv(&original).unwrap();
        assert!(csv_text.starts_with("question,answer,difficulty,topic\n"));

        let mut reader = csv::Reader::from_reader(csv_text.as_bytes());
        let parsed: Vec<CardDraft> = reader.deserialize().collect::<Result<_, _>>().unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_json_shape() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let text = export_json_at(&cards(), at).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value["total_count"], 2);
        assert_eq!(value["flashcards"].as_array().unwrap().len(), 2);
        assert_eq!(value["exported_at"], "2024-05-01T12:00:00+00:00");
        assert!(text.contains("\n  \"flashcards\": ["));
    }

    #[test]
    fn test_json_empty() {
        let text = export_json::<CardDraft>(&[]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["total_count"], 0);
    }

    #[test]
    fn test_anki_lines_are_not_escaped() {
        let text = export_anki(&cards(), false);
        assert_eq!(
            text,
            "What is \"ATP\", exactly?\tAdenosine triphosphate,\nthe cell's energy currency.\nWhat is DNA?\tDeoxyribonucleic acid."
        );

        let html = export_anki(&cards(), true);
        assert_eq!(html.lines().count(), 2);
        assert!(html.contains("triphosphate,<br>the cell's"));
    }

    #[test]
    fn test_quizlet_columns() {
        let text = export_quizlet(&cards()).unwrap();
        assert!(text.starts_with("term,definition\n"));
    }

    #[test]
    fn test_format_names() {
        assert_eq!(ExportFormat::try_from("CSV").unwrap(), ExportFormat::Csv);
        assert!(ExportFormat::try_from("xml").is_err());
        assert_eq!(ExportFormat::Anki.file_name(None), "flashcards_anki.txt");
        assert_eq!(
            ExportFormat::Json.file_name(Some("Cell Biology/1")),
            "Cell_Biology_1_flashcards.json"
        );
    }
}
