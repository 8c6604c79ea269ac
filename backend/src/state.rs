use crate::config::AppConfig;
use crate::db::models::flashcard_set::FlashcardSetRepository;
use crate::services::generator::CardGenerator;
use crate::services::llm_provider::RigBackend;
use sqlx::SqlitePool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub sets: FlashcardSetRepository,
    pub generator: Arc<CardGenerator<RigBackend>>,
}

impl AppState {
    pub fn new(config: AppConfig, db: SqlitePool) -> Self {
        let generator = CardGenerator::new(RigBackend::from_config(&config.llm));
        Self {
            config: Arc::new(config),
            sets: FlashcardSetRepository::new(db),
            generator: Arc::new(generator),
        }
    }
}
