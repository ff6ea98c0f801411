use chrono::{DateTime, FixedOffset, Utc};
use quiz_core::model::{
    CardId, Category, CategoryId, Flashcard, ScoreReport, SetId,
};
use sqlx::Row;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

pub(crate) fn u64_to_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

pub(crate) fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

fn i64_to_u32(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn parse_login(raw: &str) -> Result<DateTime<FixedOffset>, StorageError> {
    DateTime::parse_from_rfc3339(raw).map_err(ser)
}

pub(crate) fn map_category_row(row: &sqlx::sqlite::SqliteRow) -> Result<Category, StorageError> {
    let id = CategoryId::new(i64_to_u64("category_id", row.try_get("id").map_err(ser)?)?);
    let name: String = row.try_get("name").map_err(ser)?;
    let points = i64_to_u64("points", row.try_get("points").map_err(ser)?)?;
    Ok(Category::new(id, name, points))
}

pub(crate) fn map_flashcard_row(row: &sqlx::sqlite::SqliteRow) -> Result<Flashcard, StorageError> {
    Flashcard::new(
        CardId::new(i64_to_u64("card_id", row.try_get("id").map_err(ser)?)?),
        row.try_get::<String, _>("prompt").map_err(ser)?,
        row.try_get::<String, _>("solution").map_err(ser)?,
        CategoryId::new(i64_to_u64("category_id", row.try_get("category_id").map_err(ser)?)?),
        SetId::new(i64_to_u64("set_id", row.try_get("set_id").map_err(ser)?)?),
    )
    .map_err(ser)
}

pub(crate) fn map_report_row(row: &sqlx::sqlite::SqliteRow) -> Result<ScoreReport, StorageError> {
    let completed_at: DateTime<Utc> = row.try_get("completed_at").map_err(ser)?;
    ScoreReport::from_persisted(
        SetId::new(i64_to_u64("set_id", row.try_get("set_id").map_err(ser)?)?),
        CategoryId::new(i64_to_u64("category_id", row.try_get("category_id").map_err(ser)?)?),
        i64_to_u32("raw_score", row.try_get("raw_score").map_err(ser)?)?,
        i64_to_u32("total_questions", row.try_get("total_questions").map_err(ser)?)?,
        completed_at,
    )
    .map_err(ser)
}
