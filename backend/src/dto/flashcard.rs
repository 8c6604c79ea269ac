use serde::{Deserialize, Serialize};

use crate::db::models::flashcard::{CardDraft, Difficulty};
use crate::db::models::flashcard_set::Statistics;
use crate::services::text_extract::ContentStats;

fn default_subject() -> String {
    "General".to_string()
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub content: String,
    #[serde(default = "default_subject")]
    pub subject: String,
    pub count: Option<usize>,
    #[serde(default)]
    pub difficulty: Difficulty,
    /// Skip the remote service and use the offline templates.
    #[serde(default)]
    pub demo: bool,
}

#[derive(Debug, Deserialize)]
pub struct SaveSetRequest {
    pub title: String,
    #[serde(default = "default_subject")]
    pub subject: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub flashcards: Vec<CardDraft>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCardRequest {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Deserialize)]
pub struct EnhanceRequest {
    pub question: String,
    pub answer: String,
    #[serde(default = "default_subject")]
    pub subject: String,
}

#[derive(Debug, Serialize)]
pub struct EnhanceResponse {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub flashcards: Vec<CardDraft>,
}

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub filename: Option<String>,
    pub text: String,
    pub stats: ContentStats,
}

#[derive(Debug, Serialize)]
pub struct StatisticsResponse {
    #[serde(flatten)]
    pub stats: Statistics,
    pub average_cards_per_set: f64,
}

impl From<Statistics> for StatisticsResponse {
    fn from(stats: Statistics) -> Self {
        let average_cards_per_set = stats.total_cards as f64 / stats.total_sets.max(1) as f64;
        Self {
            stats,
            average_cards_per_set,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_request_defaults() {
        let req: GenerateRequest = serde_json::from_str(r#"{"content": "Some text"}"#).unwrap();
        assert_eq!(req.subject, "General");
        assert_eq!(req.difficulty, Difficulty::Mixed);
        assert_eq!(req.count, None);
        assert!(!req.demo);
    }

    #[test]
    fn test_average_with_no_sets() {
        let resp = StatisticsResponse::from(Statistics {
            total_sets: 0,
            total_cards: 0,
            distinct_subjects: vec![],
        });
        assert_eq!(resp.average_cards_per_set, 0.0);
    }
}
