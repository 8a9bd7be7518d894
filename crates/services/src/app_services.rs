use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::error::AppServicesError;
use crate::progress_service::{ProgressService, ProgressSettings};
use crate::sessions::{QuizLoopService, TheoryLoopService};

/// Assembles app-facing services over one progress store.
#[derive(Clone)]
pub struct AppServices {
    progress: ProgressService,
    theory: Arc<TheoryLoopService>,
    quiz: Arc<QuizLoopService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        settings: ProgressSettings,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage, clock, settings))
    }

    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::from_storage(&Storage::in_memory(), clock, ProgressSettings::default())
    }

    #[must_use]
    pub fn from_storage(storage: &Storage, clock: Clock, settings: ProgressSettings) -> Self {
        let progress =
            ProgressService::new(clock, Arc::clone(&storage.progress)).with_settings(settings);
        Self {
            theory: Arc::new(TheoryLoopService::new(progress.clone())),
            quiz: Arc::new(QuizLoopService::new(progress.clone())),
            progress,
        }
    }

    #[must_use]
    pub fn progress(&self) -> &ProgressService {
        &self.progress
    }

    #[must_use]
    pub fn theory(&self) -> Arc<TheoryLoopService> {
        Arc::clone(&self.theory)
    }

    #[must_use]
    pub fn quiz(&self) -> Arc<QuizLoopService> {
        Arc::clone(&self.quiz)
    }
}
