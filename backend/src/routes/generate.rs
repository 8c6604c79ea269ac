use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;

use crate::dto::flashcard::{EnhanceRequest, EnhanceResponse, ExtractResponse, GenerateRequest};
use crate::errors::AppError;
use crate::services::generator::{ConnectionStatus, GenerationOutcome};
use crate::services::text_extract::{self, DocumentKind};
use crate::services::validation::validate_content;
use crate::state::AppState;

pub const MAX_FILE_SIZE: usize = 50 * 1024 * 1024; // 50 MB

fn kind_from_filename(filename: &str) -> Option<DocumentKind> {
    let ext = filename.rsplit_once('.')?.1.to_lowercase();
    match ext.as_str() {
        "txt" => Some(DocumentKind::PlainText),
        "pdf" => Some(DocumentKind::Pdf),
        _ => None,
    }
}

pub async fn extract(mut multipart: Multipart) -> Result<Json<ExtractResponse>, AppError> {
    let field = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart data: {e}")))?
        .ok_or_else(|| AppError::Validation("No file provided".to_string()))?;

    let filename = field.file_name().map(str::to_string);

    let kind = field
        .content_type()
        .and_then(DocumentKind::from_mime)
        .or_else(|| filename.as_deref().and_then(kind_from_filename))
        .ok_or_else(|| {
            AppError::Validation("Please upload a valid .txt or .pdf file".to_string())
        })?;

    let data = field
        .bytes()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read file: {e}")))?;

    if data.len() > MAX_FILE_SIZE {
        return Err(AppError::Validation(format!(
            "File too large. Maximum size is {} MB",
            MAX_FILE_SIZE / 1024 / 1024
        )));
    }

    let raw = text_extract::extract_text(&data, kind).await?;
    let text = text_extract::clean_text_content(&raw);
    let stats = text_extract::content_stats(&text);

    tracing::info!(
        "Extracted {} characters from {} upload",
        stats.character_count,
        kind.mime()
    );

    Ok(Json(ExtractResponse {
        filename,
        text,
        stats,
    }))
}

#[derive(Serialize)]
pub struct GeneratorStatusResponse {
    #[serde(flatten)]
    pub status: ConnectionStatus,
    pub demo_mode: bool,
}

pub async fn generator_status(State(state): State<AppState>) -> Json<GeneratorStatusResponse> {
    if state.config.generation.demo_mode {
        return Json(GeneratorStatusResponse {
            status: ConnectionStatus {
                ok: false,
                message: "demo mode enabled".to_string(),
            },
            demo_mode: true,
        });
    }

    let status = state.generator.test_connection().await;
    let demo_mode = !status.ok;
    Json(GeneratorStatusResponse { status, demo_mode })
}

pub async fn generate(
    State(state): State<AppState>,
    Json(payload): Json<GenerateRequest>,
) -> Result<Json<GenerationOutcome>, AppError> {
    let settings = &state.config.generation;

    validate_content(&payload.content, settings.min_content_chars).map_err(AppError::Validation)?;

    let count = payload.count.unwrap_or(settings.default_count);
    if !(settings.min_count..=settings.max_count).contains(&count) {
        return Err(AppError::Validation(format!(
            "Number of flashcards must be between {} and {}",
            settings.min_count, settings.max_count
        )));
    }

    let outcome = state
        .generator
        .generate_with_fallback(
            &payload.content,
            &payload.subject,
            count,
            payload.difficulty,
            payload.demo || settings.demo_mode,
        )
        .await?;

    if outcome.flashcards.is_empty() {
        return Err(AppError::Validation(
            "Failed to generate flashcards. Please try again.".to_string(),
        ));
    }

    Ok(Json(outcome))
}

pub async fn enhance(
    State(state): State<AppState>,
    Json(payload): Json<EnhanceRequest>,
) -> Result<Json<EnhanceResponse>, AppError> {
    if state.config.generation.demo_mode {
        return Ok(Json(EnhanceResponse {
            question: payload.question,
            answer: payload.answer,
        }));
    }

    let (question, answer) = state
        .generator
        .enhance(&payload.question, &payload.answer, &payload.subject)
        .await;

    Ok(Json(EnhanceResponse { question, answer }))
}
