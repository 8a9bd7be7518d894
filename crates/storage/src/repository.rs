use async_trait::async_trait;
use chrono::{DateTime, Utc};
use progress_core::model::{
    ProgressKey, ProgressUpdate, SaveOutcome, TopicProgressRecord, UserId,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Keyed progress store: one record per (user, key).
///
/// Saves overwrite. Points are only awarded on the save that first marks a
/// key completed, so replaying a completion never pays out twice.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Fetch the record stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be reached or the row is unreadable.
    async fn load_progress(
        &self,
        user: UserId,
        key: &ProgressKey,
    ) -> Result<Option<TopicProgressRecord>, StorageError>;

    /// Create or overwrite the record under `update.key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn save_progress(
        &self,
        user: UserId,
        update: &ProgressUpdate,
        at: DateTime<Utc>,
    ) -> Result<SaveOutcome, StorageError>;

    /// Remove the record under `key`. Returns `true` if one existed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the delete fails.
    async fn delete_progress(&self, user: UserId, key: &ProgressKey)
    -> Result<bool, StorageError>;

    /// All records of one user.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be reached.
    async fn list_progress(&self, user: UserId) -> Result<Vec<TopicProgressRecord>, StorageError>;
}

/// Whether a save earns its points, given whether the key was already completed.
pub(crate) fn awards_points(was_completed: bool, update: &ProgressUpdate) -> bool {
    update.completed && update.points_earned > 0 && !was_completed
}

pub(crate) fn record_from_update(update: &ProgressUpdate, at: DateTime<Utc>) -> TopicProgressRecord {
    TopicProgressRecord {
        topic_key: update.key.clone(),
        completed: update.completed,
        score: update.stored_score(),
        points_earned: update.points_earned,
        extra: update.extra.clone(),
        updated_at: at,
    }
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    records: Arc<Mutex<HashMap<(UserId, ProgressKey), TopicProgressRecord>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a record exactly as given, bypassing save semantics.
    ///
    /// Useful for planting legacy-shaped or corrupt data.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn insert_raw(&self, user: UserId, record: TopicProgressRecord) -> Result<(), StorageError> {
        let mut guard = self
            .records
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert((user, record.topic_key.clone()), record);
        Ok(())
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn load_progress(
        &self,
        user: UserId,
        key: &ProgressKey,
    ) -> Result<Option<TopicProgressRecord>, StorageError> {
        let guard = self
            .records
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&(user, key.clone())).cloned())
    }

    async fn save_progress(
        &self,
        user: UserId,
        update: &ProgressUpdate,
        at: DateTime<Utc>,
    ) -> Result<SaveOutcome, StorageError> {
        let mut guard = self
            .records
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let slot = (user, update.key.clone());
        let was_completed = guard.get(&slot).is_some_and(|r| r.completed);
        guard.insert(slot, record_from_update(update, at));
        Ok(SaveOutcome {
            points_awarded: awards_points(was_completed, update),
        })
    }

    async fn delete_progress(
        &self,
        user: UserId,
        key: &ProgressKey,
    ) -> Result<bool, StorageError> {
        let mut guard = self
            .records
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.remove(&(user, key.clone())).is_some())
    }

    async fn list_progress(&self, user: UserId) -> Result<Vec<TopicProgressRecord>, StorageError> {
        let guard = self
            .records
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut out: Vec<_> = guard
            .iter()
            .filter(|((owner, _), _)| *owner == user)
            .map(|(_, record)| record.clone())
            .collect();
        out.sort_by(|a, b| a.topic_key.cmp(&b.topic_key));
        Ok(out)
    }
}

/// Progress backend behind a trait object for easy swapping.
#[derive(Clone)]
pub struct Storage {
    pub progress: Arc<dyn ProgressRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            progress: Arc::new(InMemoryRepository::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use progress_core::time::fixed_now;

    fn key(s: &str) -> ProgressKey {
        ProgressKey::new(s)
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let repo = InMemoryRepository::new();
        let user = UserId::random();
        let update = ProgressUpdate::in_progress(key("lifetimes"), 40);

        repo.save_progress(user, &update, fixed_now()).await.unwrap();

        let loaded = repo.load_progress(user, &key("lifetimes")).await.unwrap().unwrap();
        assert!(!loaded.completed);
        assert_eq!(loaded.score, 40);
        assert_eq!(loaded.updated_at, fixed_now());
    }

    #[tokio::test]
    async fn points_awarded_only_on_first_completion() {
        let repo = InMemoryRepository::new();
        let user = UserId::random();

        let partial = ProgressUpdate::in_progress(key("quiz-traits"), 20);
        let outcome = repo.save_progress(user, &partial, fixed_now()).await.unwrap();
        assert!(!outcome.points_awarded);

        let done = ProgressUpdate::completed(key("quiz-traits"), 80, 80);
        let first = repo.save_progress(user, &done, fixed_now()).await.unwrap();
        assert!(first.points_awarded);

        let again = repo.save_progress(user, &done, fixed_now()).await.unwrap();
        assert!(!again.points_awarded);
    }

    #[tokio::test]
    async fn records_are_scoped_per_user() {
        let repo = InMemoryRepository::new();
        let alice = UserId::random();
        let bob = UserId::random();
        let update = ProgressUpdate::completed(key("intro"), 100, 0);
        repo.save_progress(alice, &update, fixed_now()).await.unwrap();

        assert!(repo.load_progress(bob, &key("intro")).await.unwrap().is_none());
        assert_eq!(repo.list_progress(alice).await.unwrap().len(), 1);
        assert!(repo.list_progress(bob).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_reports_whether_record_existed() {
        let repo = InMemoryRepository::new();
        let user = UserId::random();
        let update = ProgressUpdate::completed(key("intro"), 100, 0);
        repo.save_progress(user, &update, fixed_now()).await.unwrap();

        assert!(repo.delete_progress(user, &key("intro")).await.unwrap());
        assert!(!repo.delete_progress(user, &key("intro")).await.unwrap());
        assert!(repo.load_progress(user, &key("intro")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn out_of_range_score_is_stored_clamped() {
        let repo = InMemoryRepository::new();
        let user = UserId::random();
        let mut update = ProgressUpdate::in_progress(key("generics"), 10);
        update.score = 150;

        repo.save_progress(user, &update, fixed_now()).await.unwrap();

        let loaded = repo.load_progress(user, &key("generics")).await.unwrap().unwrap();
        assert_eq!(loaded.score, 100);
    }
}
