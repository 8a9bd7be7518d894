use progress_core::model::{ProgressKey, TopicProgressRecord};
use serde_json::Value;
use sqlx::Row;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

/// Serializes the opaque payload; `null` is stored as SQL NULL.
pub(crate) fn extra_to_text(extra: &Value) -> Result<Option<String>, StorageError> {
    if extra.is_null() {
        return Ok(None);
    }
    serde_json::to_string(extra).map(Some).map_err(ser)
}

/// Unreadable payloads degrade to `null` instead of failing the whole load.
pub(crate) fn extra_from_text(key: &str, raw: Option<String>) -> Value {
    let Some(raw) = raw else {
        return Value::Null;
    };
    serde_json::from_str(&raw).unwrap_or_else(|err| {
        log::warn!("discarding unreadable progress payload for {key}: {err}");
        Value::Null
    })
}

pub(crate) fn map_progress_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<TopicProgressRecord, StorageError> {
    let topic_key: String = row.try_get("topic_key").map_err(ser)?;
    let completed: i64 = row.try_get("completed").map_err(ser)?;
    let score: i64 = row.try_get("score").map_err(ser)?;
    let points_earned: i64 = row.try_get("points_earned").map_err(ser)?;
    let extra = extra_from_text(&topic_key, row.try_get("extra").map_err(ser)?);
    let updated_at = row.try_get("updated_at").map_err(ser)?;

    Ok(TopicProgressRecord::from_persisted(
        ProgressKey::new(topic_key),
        completed != 0,
        score,
        points_earned,
        extra,
        updated_at,
    ))
}
