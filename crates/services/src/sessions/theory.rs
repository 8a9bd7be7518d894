use progress_core::completion::{CompletionDecision, derive_completion_gate_decision};
use progress_core::keys::storage_key;
use progress_core::model::{
    ProgressKey, SectionVisitationSnapshot, TopicKey, TopicKind, TopicProgressRecord, Viewer,
};

/// One continuous visit to a theory page.
///
/// Owns the visitation evidence and the persist-in-progress-once latch. The
/// latch is set once the first started state has been stored and is never
/// cleared for the lifetime of the session.
#[derive(Debug, Clone)]
pub struct TheoryPageSession {
    viewer: Viewer,
    topic: TopicKey,
    snapshot: SectionVisitationSnapshot,
    decision: CompletionDecision,
    stored_completed: bool,
    in_progress_persisted: bool,
    completed: bool,
}

impl TheoryPageSession {
    /// Starts a session; `stored` is the record loaded for this page, if any.
    #[must_use]
    pub fn new<I, S>(
        viewer: Viewer,
        topic: TopicKey,
        required_sections: I,
        stored: Option<&TopicProgressRecord>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let snapshot = SectionVisitationSnapshot::new(required_sections);
        let decision = derive_completion_gate_decision(&snapshot);
        let stored_completed = stored.is_some_and(|r| r.completed);
        Self {
            viewer,
            topic,
            snapshot,
            decision,
            stored_completed,
            in_progress_persisted: false,
            completed: stored_completed,
        }
    }

    #[must_use]
    pub fn viewer(&self) -> Viewer {
        self.viewer
    }

    #[must_use]
    pub fn topic(&self) -> &TopicKey {
        &self.topic
    }

    #[must_use]
    pub fn storage_key(&self) -> ProgressKey {
        storage_key(TopicKind::Theory, &self.topic)
    }

    #[must_use]
    pub fn snapshot(&self) -> &SectionVisitationSnapshot {
        &self.snapshot
    }

    #[must_use]
    pub fn decision(&self) -> CompletionDecision {
        self.decision
    }

    #[must_use]
    pub fn in_progress_persisted(&self) -> bool {
        self.in_progress_persisted
    }

    /// True once the page is completed, either from storage or this session.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub(crate) fn visit(&mut self, section_id: &str) -> CompletionDecision {
        self.snapshot.visit(section_id);
        self.refresh()
    }

    pub(crate) fn scroll(&mut self, percent: f64) -> CompletionDecision {
        self.snapshot.set_scroll_percent(percent);
        self.refresh()
    }

    fn refresh(&mut self) -> CompletionDecision {
        self.decision = derive_completion_gate_decision(&self.snapshot);
        self.decision
    }

    /// Whether the one-time in-progress write is still owed.
    ///
    /// A page that is already completed owes nothing, and the latch is set
    /// straight away so a partial write can never downgrade it.
    pub(crate) fn in_progress_write_due(&mut self) -> bool {
        if self.in_progress_persisted || !self.decision.state.is_started() {
            return false;
        }
        if self.completed {
            self.in_progress_persisted = true;
            return false;
        }
        true
    }

    /// Sets the latch once the in-progress write has landed.
    pub(crate) fn confirm_in_progress_write(&mut self) {
        self.in_progress_persisted = true;
    }

    pub(crate) fn mark_completed(&mut self) {
        self.completed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use progress_core::completion::CompletionState;
    use progress_core::time::fixed_now;
    use serde_json::Value;

    fn topic() -> TopicKey {
        TopicKey::new("smart-pointers").unwrap()
    }

    fn session(stored: Option<&TopicProgressRecord>) -> TheoryPageSession {
        TheoryPageSession::new(Viewer::Anonymous, topic(), ["box", "rc", "refcell"], stored)
    }

    #[test]
    fn latch_trips_once() {
        let mut s = session(None);
        assert!(!s.in_progress_write_due());

        s.visit("box");
        assert!(s.in_progress_write_due());
        s.confirm_in_progress_write();
        s.visit("rc");
        assert!(!s.in_progress_write_due());
        s.scroll(90.0);
        assert!(!s.in_progress_write_due());
        assert!(s.in_progress_persisted());
    }

    #[test]
    fn unconfirmed_write_stays_due() {
        let mut s = session(None);
        s.visit("box");
        assert!(s.in_progress_write_due());
        s.visit("rc");
        assert!(s.in_progress_write_due());
        assert!(!s.in_progress_persisted());
    }

    #[test]
    fn scroll_alone_trips_latch() {
        let mut s = session(None);
        let decision = s.scroll(12.0);
        assert_eq!(decision.state, CompletionState::InProgress);
        assert!(s.in_progress_write_due());
    }

    #[test]
    fn stored_completion_suppresses_partial_write() {
        let stored = TopicProgressRecord::from_persisted(
            ProgressKey::new("smart-pointers"),
            true,
            100,
            20,
            Value::Null,
            fixed_now(),
        );
        let mut s = session(Some(&stored));
        assert!(s.is_completed());
        s.visit("box");
        assert!(!s.in_progress_write_due());
        assert!(s.in_progress_persisted());
    }

    #[test]
    fn storage_key_is_bare_topic() {
        assert_eq!(session(None).storage_key().as_str(), "smart-pointers");
    }
}
