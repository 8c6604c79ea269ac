use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::db::models::flashcard_set::{SetSummary, SetWithCards};
use crate::dto::flashcard::{SaveSetRequest, SearchQuery, StatisticsResponse};
use crate::errors::AppError;
use crate::services::validation::validate_card;
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<SetSummary>>, AppError> {
    let sets = match query.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        Some(q) => state.sets.search_sets(q).await?,
        None => state.sets.list_sets().await?,
    };
    Ok(Json(sets))
}

pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<SaveSetRequest>,
) -> Result<(StatusCode, Json<SetWithCards>), AppError> {
    for (i, card) in payload.flashcards.iter().enumerate() {
        validate_card(&card.question, &card.answer)
            .map_err(|reason| AppError::Validation(format!("Card {}: {reason}", i + 1)))?;
    }

    let saved = state
        .sets
        .save_set(
            &payload.title,
            &payload.subject,
            payload.difficulty,
            &payload.flashcards,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(saved)))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SetWithCards>, AppError> {
    let set = state
        .sets
        .get_set_with_cards(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Flashcard set not found".to_string()))?;
    Ok(Json(set))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if !state.sets.delete_set(&id).await? {
        return Err(AppError::NotFound("Flashcard set not found".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn statistics(State(state): State<AppState>) -> Result<Json<StatisticsResponse>, AppError> {
    let stats = state.sets.statistics().await?;
    Ok(Json(stats.into()))
}
