use quiz_core::model::{Category, CategoryId, CategoryPoints};

use super::SqliteRepository;
use super::mapping::{conn, map_category_row, u64_to_i64};
use crate::repository::{CategoryRepository, StorageError};

#[async_trait::async_trait]
impl CategoryRepository for SqliteRepository {
    async fn upsert_category(&self, category: &Category) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO categories (id, name, points)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                points = excluded.points
            ",
        )
        .bind(u64_to_i64("category_id", category.id().value())?)
        .bind(category.name())
        .bind(u64_to_i64("points", category.points().points())?)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn find_category(&self, id: CategoryId) -> Result<Option<Category>, StorageError> {
        let row = sqlx::query("SELECT id, name, points FROM categories WHERE id = ?1")
            .bind(u64_to_i64("category_id", id.value())?)
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        row.as_ref().map(map_category_row).transpose()
    }

    async fn update_points(&self, points: CategoryPoints) -> Result<(), StorageError> {
        let res = sqlx::query("UPDATE categories SET points = ?1 WHERE id = ?2")
            .bind(u64_to_i64("points", points.points())?)
            .bind(u64_to_i64("category_id", points.category_id().value())?)
            .execute(&self.pool)
            .await
            .map_err(conn)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
