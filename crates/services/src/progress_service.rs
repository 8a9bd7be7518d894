use std::sync::Arc;

use progress_core::Clock;
use progress_core::aggregate::{TopicCompletion, aggregate};
use progress_core::keys::{ResolvedRecord, canonical_key, legacy_key, resolve_for_load, storage_key};
use progress_core::model::{
    GroupedTopic, ProgressIndex, ProgressKey, ProgressUpdate, SaveOutcome, TopicKey, TopicKind,
    TopicProgressRecord, UserId, Viewer,
};
use progress_core::scoring::POINTS_PER_CORRECT_ANSWER;
use storage::repository::ProgressRepository;

use crate::error::ProgressServiceError;

/// Tunables for progress writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSettings {
    /// Points granted when a theory page is marked completed.
    pub theory_completion_points: u32,
}

impl Default for ProgressSettings {
    fn default() -> Self {
        Self {
            theory_completion_points: POINTS_PER_CORRECT_ANSWER,
        }
    }
}

/// Gateway between the pure progress rules and the progress store.
///
/// Anonymous viewers never reach the store: loads return nothing and writes
/// are skipped.
#[derive(Clone)]
pub struct ProgressService {
    clock: Clock,
    progress: Arc<dyn ProgressRepository>,
    settings: ProgressSettings,
}

impl ProgressService {
    #[must_use]
    pub fn new(clock: Clock, progress: Arc<dyn ProgressRepository>) -> Self {
        Self {
            clock,
            progress,
            settings: ProgressSettings::default(),
        }
    }

    #[must_use]
    pub fn with_settings(mut self, settings: ProgressSettings) -> Self {
        self.settings = settings;
        self
    }

    #[must_use]
    pub fn settings(&self) -> ProgressSettings {
        self.settings
    }

    /// Loads the record representing `topic`.
    ///
    /// Quizzes try the canonical key first, then the legacy one; a legacy hit
    /// is re-saved under the canonical key before it is returned. Store
    /// failures are logged and read as "no record".
    pub async fn load_topic(
        &self,
        viewer: Viewer,
        kind: TopicKind,
        topic: &TopicKey,
    ) -> Option<TopicProgressRecord> {
        let user = viewer.user_id()?;
        match kind {
            TopicKind::Theory => self.load_or_none(user, &storage_key(kind, topic)).await,
            TopicKind::Quiz => self.load_quiz(user, topic).await,
        }
    }

    async fn load_quiz(&self, user: UserId, topic: &TopicKey) -> Option<TopicProgressRecord> {
        let canonical = self.load_or_none(user, &canonical_key(topic)).await;
        let legacy = if canonical.is_none() {
            self.load_or_none(user, &legacy_key(topic)).await
        } else {
            None
        };

        match resolve_for_load(topic, canonical, legacy) {
            ResolvedRecord::Canonical(record) => Some(record),
            ResolvedRecord::Legacy(record) => Some(self.migrate_legacy(user, topic, record).await),
            ResolvedRecord::Missing => None,
        }
    }

    async fn migrate_legacy(
        &self,
        user: UserId,
        topic: &TopicKey,
        record: TopicProgressRecord,
    ) -> TopicProgressRecord {
        let key = canonical_key(topic);
        let update = ProgressUpdate::from_record(key.clone(), &record);
        match self.progress.save_progress(user, &update, self.clock.now()).await {
            Ok(_) => log::info!("migrated legacy progress {} -> {key}", record.topic_key),
            Err(err) => log::warn!("failed to migrate legacy progress for {topic}: {err}"),
        }
        record.rekeyed(key)
    }

    async fn load_or_none(&self, user: UserId, key: &ProgressKey) -> Option<TopicProgressRecord> {
        match self.progress.load_progress(user, key).await {
            Ok(record) => record,
            Err(err) => {
                log::warn!("failed to load progress {key}: {err}");
                None
            }
        }
    }

    /// Writes `update` for an authenticated viewer. Scores above the maximum
    /// are stored as the maximum.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if the store rejects the write.
    pub async fn save(
        &self,
        viewer: Viewer,
        update: &ProgressUpdate,
    ) -> Result<SaveOutcome, ProgressServiceError> {
        let Some(user) = viewer.user_id() else {
            return Ok(SaveOutcome::default());
        };
        let update = update.clone().clamped();
        let outcome = self
            .progress
            .save_progress(user, &update, self.clock.now())
            .await?;
        Ok(outcome)
    }

    /// Deletes the stored progress of a topic.
    ///
    /// Quiz resets also remove the legacy record, otherwise the next load
    /// would migrate it right back.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if a delete fails.
    pub async fn reset_topic(
        &self,
        viewer: Viewer,
        kind: TopicKind,
        topic: &TopicKey,
    ) -> Result<(), ProgressServiceError> {
        let Some(user) = viewer.user_id() else {
            return Ok(());
        };
        let mut removed = self
            .progress
            .delete_progress(user, &storage_key(kind, topic))
            .await?;
        if kind == TopicKind::Quiz {
            removed |= self.progress.delete_progress(user, &legacy_key(topic)).await?;
        }
        log::info!("reset progress for {topic} (record removed: {removed})");
        Ok(())
    }

    /// Every record of the viewer, keyed by storage key.
    pub async fn progress_index(&self, viewer: Viewer) -> ProgressIndex {
        let Some(user) = viewer.user_id() else {
            return ProgressIndex::new();
        };
        match self.progress.list_progress(user).await {
            Ok(records) => records.into_iter().collect(),
            Err(err) => {
                log::warn!("failed to list progress: {err}");
                ProgressIndex::new()
            }
        }
    }

    pub async fn topic_completion(&self, viewer: Viewer, topic: &GroupedTopic) -> TopicCompletion {
        let index = self.progress_index(viewer).await;
        aggregate(topic, &index)
    }

    /// Completion of several topics from a single listing.
    pub async fn topic_completions(
        &self,
        viewer: Viewer,
        topics: &[GroupedTopic],
    ) -> Vec<TopicCompletion> {
        let index = self.progress_index(viewer).await;
        topics.iter().map(|topic| aggregate(topic, &index)).collect()
    }
}
