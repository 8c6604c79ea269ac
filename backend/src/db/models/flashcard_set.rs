use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

use super::flashcard::{CardDraft, Difficulty, Flashcard};
use crate::errors::{StoreError, StoreResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlashcardSet {
    pub id: String,
    pub title: String,
    pub subject: String,
    pub difficulty: Difficulty,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SetSummary {
    #[serde(flatten)]
    pub set: FlashcardSet,
    pub card_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SetWithCards {
    #[serde(flatten)]
    pub set: FlashcardSet,
    pub flashcards: Vec<Flashcard>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    pub total_sets: i64,
    pub total_cards: i64,
    pub distinct_subjects: Vec<String>,
}

const SET_COLUMNS: &str = "s.id, s.title, s.subject, s.difficulty, s.created_at, s.updated_at";
const CARD_COLUMNS: &str = "id, set_id, question, answer, difficulty, topic, created_at";

fn now() -> String {
    // Fixed-width timestamps so text ordering matches time ordering.
    chrono::Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Durable record of flashcard sets and the cards they own.
///
/// Every mutation runs inside a single transaction. A set's cards are removed
/// explicitly together with the set instead of relying on the foreign-key cascade.
#[derive(Clone)]
pub struct FlashcardSetRepository {
    pool: SqlitePool,
}

impl FlashcardSetRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create_set(
        &self,
        title: &str,
        subject: &str,
        difficulty: Difficulty,
    ) -> StoreResult<FlashcardSet> {
        let mut tx = self.pool.begin().await?;
        let set = Self::insert_set(&mut tx, title, subject, difficulty).await?;
        tx.commit().await?;

        tracing::info!("Created flashcard set {} ('{}')", set.id, set.title);
        Ok(set)
    }

    /// Creates a set and inserts its cards as one unit.
    pub async fn save_set(
        &self,
        title: &str,
        subject: &str,
        difficulty: Difficulty,
        cards: &[CardDraft],
    ) -> StoreResult<SetWithCards> {
        let mut tx = self.pool.begin().await?;
        let set = Self::insert_set(&mut tx, title, subject, difficulty).await?;
        let flashcards = Self::insert_cards(&mut tx, &set.id, cards).await?;
        tx.commit().await?;

        tracing::info!(
            "Saved flashcard set {} with {} cards",
            set.id,
            flashcards.len()
        );
        Ok(SetWithCards { set, flashcards })
    }

    pub async fn add_cards(&self, set_id: &str, cards: &[CardDraft]) -> StoreResult<Vec<Flashcard>> {
        let mut tx = self.pool.begin().await?;

        let exists: Option<(String,)> = sqlx::query_as("SELECT id FROM flashcard_sets WHERE id = ?1")
            .bind(set_id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(StoreError::NotFound(format!(
                "Flashcard set not found: {set_id}"
            )));
        }

        let inserted = Self::insert_cards(&mut tx, set_id, cards).await?;
        Self::touch(&mut tx, set_id).await?;
        tx.commit().await?;

        Ok(inserted)
    }

    pub async fn list_sets(&self) -> StoreResult<Vec<SetSummary>> {
        let rows = sqlx::query(&format!(
            "SELECT {SET_COLUMNS},
                    (SELECT COUNT(*) FROM flashcards f WHERE f.set_id = s.id) AS card_count
             FROM flashcard_sets s
             ORDER BY s.created_at DESC, s.rowid DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|r| -> StoreResult<SetSummary> {
                Ok(SetSummary {
                    set: Self::map_set_row(r)?,
                    card_count: r.try_get("card_count")?,
                })
            })
            .collect()
    }

    /// Sets whose title or subject contains `query`, ignoring case. The query is
    /// matched literally; an empty query matches everything.
    pub async fn search_sets(&self, query: &str) -> StoreResult<Vec<SetSummary>> {
        let needle = query.trim().to_lowercase();
        let sets = self.list_sets().await?;

        Ok(sets
            .into_iter()
            .filter(|s| {
                s.set.title.to_lowercase().contains(&needle)
                    || s.set.subject.to_lowercase().contains(&needle)
            })
            .collect())
    }

    pub async fn get_set_with_cards(&self, id: &str) -> StoreResult<Option<SetWithCards>> {
        let row = sqlx::query(&format!(
            "SELECT {SET_COLUMNS} FROM flashcard_sets s WHERE s.id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let set = Self::map_set_row(&row)?;

        let rows = sqlx::query(&format!(
            "SELECT {CARD_COLUMNS} FROM flashcards WHERE set_id = ?1 ORDER BY rowid ASC"
        ))
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let flashcards = rows
            .iter()
            .map(Self::map_card_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(SetWithCards { set, flashcards }))
    }

    pub async fn get_card(&self, id: &str) -> StoreResult<Option<Flashcard>> {
        let row = sqlx::query(&format!("SELECT {CARD_COLUMNS} FROM flashcards WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(Self::map_card_row).transpose()?)
    }

    pub async fn update_card(&self, id: &str, question: &str, answer: &str) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;

        let set_id: Option<(String,)> = sqlx::query_as("SELECT set_id FROM flashcards WHERE id = ?1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some((set_id,)) = set_id else {
            return Ok(false);
        };

        sqlx::query("UPDATE flashcards SET question = ?1, answer = ?2 WHERE id = ?3")
            .bind(question)
            .bind(answer)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        Self::touch(&mut tx, &set_id).await?;
        tx.commit().await?;

        Ok(true)
    }

    pub async fn delete_set(&self, id: &str) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;

        let cards = sqlx::query("DELETE FROM flashcards WHERE set_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let sets = sqlx::query("DELETE FROM flashcard_sets WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if sets.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }
        tx.commit().await?;

        tracing::info!(
            "Deleted flashcard set {id} and {} cards",
            cards.rows_affected()
        );
        Ok(true)
    }

    pub async fn delete_card(&self, id: &str) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;

        let set_id: Option<(String,)> = sqlx::query_as("SELECT set_id FROM flashcards WHERE id = ?1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some((set_id,)) = set_id else {
            return Ok(false);
        };

        sqlx::query("DELETE FROM flashcards WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        Self::touch(&mut tx, &set_id).await?;
        tx.commit().await?;

        Ok(true)
    }

    pub async fn statistics(&self) -> StoreResult<Statistics> {
        let (total_sets,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM flashcard_sets")
            .fetch_one(&self.pool)
            .await?;
        let (total_cards,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM flashcards")
            .fetch_one(&self.pool)
            .await?;
        let subjects: Vec<(String,)> =
            sqlx::query_as("SELECT DISTINCT subject FROM flashcard_sets ORDER BY subject")
                .fetch_all(&self.pool)
                .await?;

        Ok(Statistics {
            total_sets,
            total_cards,
            distinct_subjects: subjects.into_iter().map(|(s,)| s).collect(),
        })
    }

    pub async fn ping(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }

    async fn insert_set(
        tx: &mut Transaction<'_, Sqlite>,
        title: &str,
        subject: &str,
        difficulty: Difficulty,
    ) -> StoreResult<FlashcardSet> {
        let title = title.trim();
        if title.is_empty() {
            return Err(StoreError::Validation("Set title cannot be empty".into()));
        }

        let id = Uuid::new_v4().to_string();
        let now = now();

        sqlx::query(
            "INSERT INTO flashcard_sets (id, title, subject, difficulty, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&id)
        .bind(title)
        .bind(subject)
        .bind(difficulty.as_str())
        .bind(&now)
        .bind(&now)
        .execute(&mut **tx)
        .await?;

        Ok(FlashcardSet {
            id,
            title: title.to_string(),
            subject: subject.to_string(),
            difficulty,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    async fn insert_cards(
        tx: &mut Transaction<'_, Sqlite>,
        set_id: &str,
        cards: &[CardDraft],
    ) -> StoreResult<Vec<Flashcard>> {
        let mut inserted = Vec::with_capacity(cards.len());

        for card in cards {
            let id = Uuid::new_v4().to_string();
            let now = now();

            sqlx::query(
                "INSERT INTO flashcards (id, set_id, question, answer, difficulty, topic, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )
            .bind(&id)
            .bind(set_id)
            .bind(&card.question)
            .bind(&card.answer)
            .bind(&card.difficulty)
            .bind(&card.topic)
            .bind(&now)
            .execute(&mut **tx)
            .await?;

            inserted.push(Flashcard {
                id,
                set_id: set_id.to_string(),
                question: card.question.clone(),
                answer: card.answer.clone(),
                difficulty: card.difficulty.clone(),
                topic: card.topic.clone(),
                created_at: now,
            });
        }

        Ok(inserted)
    }

    async fn touch(tx: &mut Transaction<'_, Sqlite>, set_id: &str) -> StoreResult<()> {
        sqlx::query("UPDATE flashcard_sets SET updated_at = ?1 WHERE id = ?2")
            .bind(now())
            .bind(set_id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    fn map_set_row(row: &SqliteRow) -> Result<FlashcardSet, sqlx::Error> {
        let difficulty: String = row.try_get("difficulty")?;
        let difficulty = Difficulty::try_from(difficulty.as_str())
            .map_err(|e| sqlx::Error::Decode(e.into()))?;

        Ok(FlashcardSet {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            subject: row.try_get("subject")?,
            difficulty,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn map_card_row(row: &SqliteRow) -> Result<Flashcard, sqlx::Error> {
        Ok(Flashcard {
            id: row.try_get("id")?,
            set_id: row.try_get("set_id")?,
            question: row.try_get("question")?,
            answer: row.try_get("answer")?,
            difficulty: row.try_get("difficulty")?,
            topic: row.try_get("topic")?,
            created_at: row.try_get("created_at")?,
        })
    }
}
