use progress_core::completion::CompletionDecision;
use progress_core::model::{ProgressUpdate, Question, TopicKey, TopicKind, Viewer};

use super::quiz::{QuizResult, QuizSession};
use super::theory::TheoryPageSession;
use crate::error::ProgressServiceError;
use crate::progress_service::ProgressService;

/// Drives theory page sessions and their progress writes.
#[derive(Clone)]
pub struct TheoryLoopService {
    progress: ProgressService,
}

impl TheoryLoopService {
    #[must_use]
    pub fn new(progress: ProgressService) -> Self {
        Self { progress }
    }

    /// Start a session for a theory page with the given required sections.
    pub async fn start_session(
        &self,
        viewer: Viewer,
        topic: TopicKey,
        required_sections: &[&str],
    ) -> TheoryPageSession {
        let stored = self
            .progress
            .load_topic(viewer, TopicKind::Theory, &topic)
            .await;
        TheoryPageSession::new(
            viewer,
            topic,
            required_sections.iter().copied(),
            stored.as_ref(),
        )
    }

    /// Record that a section came into view.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError` if the one-time in-progress write fails.
    /// The session keeps the new evidence either way, and the write is tried
    /// again on the next visit or scroll.
    pub async fn record_section_visit(
        &self,
        session: &mut TheoryPageSession,
        section_id: &str,
    ) -> Result<CompletionDecision, ProgressServiceError> {
        let decision = session.visit(section_id);
        self.persist_in_progress_once(session).await?;
        Ok(decision)
    }

    /// Record the current scroll depth, 0 to 100.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError` if the one-time in-progress write fails.
    pub async fn record_scroll(
        &self,
        session: &mut TheoryPageSession,
        percent: f64,
    ) -> Result<CompletionDecision, ProgressServiceError> {
        let decision = session.scroll(percent);
        self.persist_in_progress_once(session).await?;
        Ok(decision)
    }

    async fn persist_in_progress_once(
        &self,
        session: &mut TheoryPageSession,
    ) -> Result<(), ProgressServiceError> {
        if !session.in_progress_write_due() {
            return Ok(());
        }
        let update = ProgressUpdate::in_progress(session.storage_key(), session.decision().score);
        self.progress.save(session.viewer(), &update).await?;
        session.confirm_in_progress_write();
        log::debug!("persisted in-progress state for {}", session.topic());
        Ok(())
    }

    /// Mark the page completed.
    ///
    /// Returns `Ok(false)` without writing anything unless every required
    /// section has been visited.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError` if the completion write fails; the
    /// session then stays uncompleted.
    pub async fn mark_completed(
        &self,
        session: &mut TheoryPageSession,
    ) -> Result<bool, ProgressServiceError> {
        if !session.decision().can_complete {
            return Ok(false);
        }
        let points = self.progress.settings().theory_completion_points;
        let update = ProgressUpdate::completed(session.storage_key(), 100, points);
        let outcome = self.progress.save(session.viewer(), &update).await?;
        if outcome.points_awarded {
            log::info!("awarded {points} points for {}", session.topic());
        }
        session.mark_completed();
        Ok(true)
    }

    /// Delete the page's stored progress.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError` if the delete fails.
    pub async fn reset(&self, viewer: Viewer, topic: &TopicKey) -> Result<(), ProgressServiceError> {
        self.progress
            .reset_topic(viewer, TopicKind::Theory, topic)
            .await
    }
}

/// Drives quiz sessions: ordering, in-flight persistence and submission.
#[derive(Clone)]
pub struct QuizLoopService {
    progress: ProgressService,
}

impl QuizLoopService {
    #[must_use]
    pub fn new(progress: ProgressService) -> Self {
        Self { progress }
    }

    /// Start or resume a quiz. `seed` orders the questions of a fresh attempt.
    pub async fn start_session(
        &self,
        viewer: Viewer,
        topic: TopicKey,
        questions: &[Question],
        seed: u64,
    ) -> QuizSession {
        let stored = self.progress.load_topic(viewer, TopicKind::Quiz, &topic).await;
        QuizSession::new(viewer, topic, questions, seed, stored)
    }

    /// Store the in-flight answers. Anonymous sessions stay in memory only.
    ///
    /// Returns whether a write happened.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError` if the store rejects the write.
    pub async fn persist(&self, session: &QuizSession) -> Result<bool, ProgressServiceError> {
        if !session.viewer().is_authenticated() || session.is_submitted() {
            return Ok(false);
        }
        self.progress
            .save(session.viewer(), &session.snapshot_update())
            .await?;
        Ok(true)
    }

    /// Score the attempt and record it as completed.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError` if the result cannot be stored; the
    /// session is left open so the caller can retry.
    pub async fn submit(&self, session: &mut QuizSession) -> Result<QuizResult, ProgressServiceError> {
        if let Some(result) = session.result() {
            return Ok(result);
        }
        let (mut result, update) = session.grade();
        let outcome = self.progress.save(session.viewer(), &update).await?;
        result.points_awarded = outcome.points_awarded;
        log::info!(
            "quiz {} submitted: {}/{} ({}%)",
            session.topic(),
            result.correct,
            result.total,
            result.percentage
        );
        session.finish(result);
        Ok(result)
    }

    /// Delete the quiz's stored progress under both key generations.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError` if a delete fails.
    pub async fn reset(&self, viewer: Viewer, topic: &TopicKey) -> Result<(), ProgressServiceError> {
        self.progress.reset_topic(viewer, TopicKind::Quiz, topic).await
    }
}
