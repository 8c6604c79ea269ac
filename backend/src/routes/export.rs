use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::db::models::flashcard::CardFace;
use crate::dto::flashcard::ExportRequest;
use crate::errors::AppError;
use crate::services::export::{self, ExportFormat};
use crate::state::AppState;

fn parse_format(raw: &str) -> Result<ExportFormat, AppError> {
    ExportFormat::try_from(raw).map_err(|e| AppError::Validation(e.to_string()))
}

fn attachment<T: Serialize + CardFace>(
    cards: &[T],
    format: ExportFormat,
    title: Option<&str>,
) -> Result<Response, AppError> {
    let body = export::render(cards, format)?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        format.file_name(title)
    );

    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

pub async fn export_set(
    State(state): State<AppState>,
    Path((id, format)): Path<(String, String)>,
) -> Result<Response, AppError> {
    let format = parse_format(&format)?;
    let set = state
        .sets
        .get_set_with_cards(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Flashcard set not found".to_string()))?;

    attachment(&set.flashcards, format, Some(&set.set.title))
}

pub async fn export_drafts(
    Path(format): Path<String>,
    Json(payload): Json<ExportRequest>,
) -> Result<Response, AppError> {
    let format = parse_format(&format)?;
    attachment(&payload.flashcards, format, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use axum::http::StatusCode;

    use crate::db::models::flashcard::CardDraft;

    fn drafts() -> Vec<CardDraft> {
        vec![CardDraft {
            question: "What is osmosis?".to_string(),
            answer: "Diffusion of water across a membrane.".to_string(),
            difficulty: Some("Easy".to_string()),
            topic: Some("Cells".to_string()),
        }]
    }

    #[tokio::test]
    async fn test_export_drafts_sets_attachment_headers() {
        let response = export_drafts(
            Path("TXT".to_string()),
            Json(ExportRequest { flashcards: drafts() }),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"flashcards_anki.txt\""
        );

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(
            &body[..],
            b"What is osmosis?\tDiffusion of water across a membrane."
        );
    }

    #[tokio::test]
    async fn test_export_drafts_unknown_format() {
        let result = export_drafts(
            Path("pptx".to_string()),
            Json(ExportRequest { flashcards: drafts() }),
        )
        .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
