pub mod cards;
pub mod export;
pub mod generate;
pub mod health;
pub mod sets;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use axum::Router;

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/generator/status", get(generate::generator_status))
        .route(
            "/api/extract",
            post(generate::extract).layer(DefaultBodyLimit::max(generate::MAX_FILE_SIZE + 1024 * 1024)),
        )
        .route("/api/generate", post(generate::generate))
        .route("/api/cards/enhance", post(generate::enhance))
        .route("/api/sets", get(sets::list).post(sets::create))
        .route("/api/sets/{id}", get(sets::get).delete(sets::delete))
        .route("/api/sets/{id}/export/{format}", get(export::export_set))
        .route("/api/cards/{id}", put(cards::update).delete(cards::delete))
        .route("/api/export/{format}", post(export::export_drafts))
        .route("/api/statistics", get(sets::statistics))
        .with_state(state)
}
