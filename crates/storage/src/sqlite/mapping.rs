use quiz_core::model::{ScoreId, ScoreRecord, User, UserId};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

/// Classify a write failure: constraint violations become domain errors.
pub(crate) fn write_error(e: sqlx::Error) -> StorageError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            return StorageError::Conflict;
        }
        if db.is_foreign_key_violation() {
            return StorageError::NotFound;
        }
    }
    StorageError::Connection(e.to_string())
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn user_id_to_i64(id: UserId) -> Result<i64, StorageError> {
    i64::try_from(id.value()).map_err(|_| StorageError::Serialization("user_id overflow".into()))
}

pub(crate) fn user_from_row(row: &SqliteRow) -> Result<User, StorageError> {
    let id = UserId::new(i64_to_u64("id", row.try_get::<i64, _>("id").map_err(ser)?)?);
    Ok(User::from_persisted(
        id,
        row.try_get("username").map_err(ser)?,
        row.try_get("email").map_err(ser)?,
        row.try_get("password_hash").map_err(ser)?,
        row.try_get("created_at").map_err(ser)?,
    ))
}

pub(crate) fn score_from_row(row: &SqliteRow) -> Result<ScoreRecord, StorageError> {
    Ok(ScoreRecord {
        id: ScoreId::new(i64_to_u64("id", row.try_get::<i64, _>("id").map_err(ser)?)?),
        user_id: UserId::new(i64_to_u64(
            "user_id",
            row.try_get::<i64, _>("user_id").map_err(ser)?,
        )?),
        topic: row.try_get("topic").map_err(ser)?,
        score: u32_from_i64("score", row.try_get::<i64, _>("score").map_err(ser)?)?,
        total_questions: u32_from_i64(
            "total_questions",
            row.try_get::<i64, _>("total_questions").map_err(ser)?,
        )?,
        created_at: row.try_get("created_at").map_err(ser)?,
    })
}
