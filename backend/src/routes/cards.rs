use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::db::models::flashcard::Flashcard;
use crate::dto::flashcard::UpdateCardRequest;
use crate::errors::AppError;
use crate::services::validation::validate_card;
use crate::state::AppState;

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateCardRequest>,
) -> Result<Json<Flashcard>, AppError> {
    validate_card(&payload.question, &payload.answer)?;

    let question = payload.question.trim();
    let answer = payload.answer.trim();
    if !state.sets.update_card(&id, question, answer).await? {
        return Err(AppError::NotFound("Flashcard not found".to_string()));
    }

    let card = state
        .sets
        .get_card(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Flashcard not found".to_string()))?;
    Ok(Json(card))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if !state.sets.delete_card(&id).await? {
        return Err(AppError::NotFound("Flashcard not found".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}
