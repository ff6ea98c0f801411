use quiz_core::model::{Flashcard, SetId};

use super::SqliteRepository;
use super::mapping::{conn, map_flashcard_row, u64_to_i64};
use crate::repository::{FlashcardRepository, StorageError};

#[async_trait::async_trait]
impl FlashcardRepository for SqliteRepository {
    async fn upsert_flashcard(&self, card: &Flashcard) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO flashcards (id, set_id, category_id, prompt, solution)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(id) DO UPDATE SET
                set_id = excluded.set_id,
                category_id = excluded.category_id,
                prompt = excluded.prompt,
                solution = excluded.solution
            ",
        )
        .bind(u64_to_i64("card_id", card.id().value())?)
        .bind(u64_to_i64("set_id", card.set_id().value())?)
        .bind(u64_to_i64("category_id", card.category_id().value())?)
        .bind(card.prompt())
        .bind(card.solution())
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => StorageError::NotFound,
            other => conn(other),
        })?;

        Ok(())
    }

    async fn cards_for_set(&self, set_id: SetId) -> Result<Vec<Flashcard>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, set_id, category_id, prompt, solution
            FROM flashcards
            WHERE set_id = ?1
            ORDER BY id ASC
            ",
        )
        .bind(u64_to_i64("set_id", set_id.value())?)
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_flashcard_row).collect()
    }
}
