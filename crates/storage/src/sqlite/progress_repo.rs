use async_trait::async_trait;
use chrono::{DateTime, Utc};
use progress_core::model::{ProgressKey, ProgressUpdate, SaveOutcome, TopicProgressRecord, UserId};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{extra_to_text, map_progress_row, ser};
use crate::repository::{ProgressRepository, StorageError, awards_points};

fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait]
impl ProgressRepository for SqliteRepository {
    async fn load_progress(
        &self,
        user: UserId,
        key: &ProgressKey,
    ) -> Result<Option<TopicProgressRecord>, StorageError> {
        let row = sqlx::query(
            r"
                SELECT topic_key, completed, score, points_earned, extra, updated_at
                FROM topic_progress
                WHERE user_id = ?1 AND topic_key = ?2
            ",
        )
        .bind(user.to_string())
        .bind(key.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.as_ref().map(map_progress_row).transpose()
    }

    async fn save_progress(
        &self,
        user: UserId,
        update: &ProgressUpdate,
        at: DateTime<Utc>,
    ) -> Result<SaveOutcome, StorageError> {
        let user_id = user.to_string();
        let extra = extra_to_text(&update.extra)?;
        let mut tx = self.pool.begin().await.map_err(conn)?;

        let previous = sqlx::query(
            r"
                SELECT completed FROM topic_progress
                WHERE user_id = ?1 AND topic_key = ?2
            ",
        )
        .bind(&user_id)
        .bind(update.key.as_str())
        .fetch_optional(&mut *tx)
        .await
        .map_err(conn)?;
        let was_completed = match previous {
            Some(row) => row.try_get::<i64, _>("completed").map_err(ser)? != 0,
            None => false,
        };

        sqlx::query(
            r"
                INSERT INTO topic_progress (
                    user_id, topic_key, completed, score, points_earned, extra, updated_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                ON CONFLICT(user_id, topic_key) DO UPDATE SET
                    completed = excluded.completed,
                    score = excluded.score,
                    points_earned = excluded.points_earned,
                    extra = excluded.extra,
                    updated_at = excluded.updated_at
            ",
        )
        .bind(&user_id)
        .bind(update.key.as_str())
        .bind(i64::from(update.completed))
        .bind(i64::from(update.stored_score()))
        .bind(i64::from(update.points_earned))
        .bind(extra)
        .bind(at)
        .execute(&mut *tx)
        .await
        .map_err(conn)?;

        tx.commit().await.map_err(conn)?;

        Ok(SaveOutcome {
            points_awarded: awards_points(was_completed, update),
        })
    }

    async fn delete_progress(
        &self,
        user: UserId,
        key: &ProgressKey,
    ) -> Result<bool, StorageError> {
        let res = sqlx::query("DELETE FROM topic_progress WHERE user_id = ?1 AND topic_key = ?2")
            .bind(user.to_string())
            .bind(key.as_str())
            .execute(&self.pool)
            .await
            .map_err(conn)?;
        Ok(res.rows_affected() > 0)
    }

    async fn list_progress(&self, user: UserId) -> Result<Vec<TopicProgressRecord>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT topic_key, completed, score, points_earned, extra, updated_at
                FROM topic_progress
                WHERE user_id = ?1
                ORDER BY topic_key ASC
            ",
        )
        .bind(user.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_progress_row(&row)?);
        }
        Ok(out)
    }
}
