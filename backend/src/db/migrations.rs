use anyhow::{Context, Result};
use sqlx::SqlitePool;

pub async fn run_all(pool: &SqlitePool) -> Result<()> {
    create_flashcard_sets_table(pool).await?;
    create_flashcards_table(pool).await?;
    tracing::info!("Database migrations completed");
    Ok(())
}

async fn create_flashcard_sets_table(pool: &SqlitePool) -> Result<()> {
    sqlx::raw_sql(
        "CREATE TABLE IF NOT EXISTS flashcard_sets (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL CHECK(length(trim(title)) > 0),
            subject TEXT NOT NULL,
            difficulty TEXT NOT NULL CHECK(difficulty IN ('Easy', 'Medium', 'Hard', 'Mixed')),
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_flashcard_sets_created ON flashcard_sets(created_at);",
    )
    .execute(pool)
    .await
    .context("Failed to create flashcard_sets table")?;
    Ok(())
}

async fn create_flashcards_table(pool: &SqlitePool) -> Result<()> {
    sqlx::raw_sql(
        "CREATE TABLE IF NOT EXISTS flashcards (
            id TEXT PRIMARY KEY,
            set_id TEXT NOT NULL,
            question TEXT NOT NULL,
            answer TEXT NOT NULL,
            difficulty TEXT,
            topic TEXT,
            created_at TEXT NOT NULL,
            FOREIGN KEY(set_id) REFERENCES flashcard_sets(id) ON DELETE CASCADE
        );
        CREATE INDEX IF NOT EXISTS idx_flashcards_set ON flashcards(set_id);",
    )
    .execute(pool)
    .await
    .context("Failed to create flashcards table")?;
    Ok(())
}
