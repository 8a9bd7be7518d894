use serde_json::{Value, json};

use progress_core::keys::canonical_key;
use progress_core::model::{
    ProgressKey, ProgressUpdate, Question, QuizSessionState, TopicKey, TopicProgressRecord, Viewer,
};
use progress_core::scoring::{
    count_correct, percentage, points_from_correct, question_progress_percent,
};
use progress_core::session_codec::{decode, encode};
use progress_core::shuffle::shuffled_indices;

use super::progress::QuizProgress;

/// Outcome of submitting a quiz attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizResult {
    pub correct: usize,
    pub total: usize,
    pub percentage: u8,
    pub points: u32,
    pub points_awarded: bool,
}

/// One continuous visit to a quiz.
///
/// Question order comes from `seed`, which is stored next to the answers so a
/// restored session lines every answer up with its question again.
#[derive(Debug, Clone)]
pub struct QuizSession {
    viewer: Viewer,
    topic: TopicKey,
    seed: u64,
    questions: Vec<Question>,
    state: QuizSessionState,
    stored: Option<TopicProgressRecord>,
    result: Option<QuizResult>,
}

impl QuizSession {
    /// Starts a session, resuming stored in-flight answers when they decode
    /// and were saved against the same number of questions.
    ///
    /// `seed` is only used for a fresh session.
    #[must_use]
    pub fn new(
        viewer: Viewer,
        topic: TopicKey,
        questions: &[Question],
        seed: u64,
        stored: Option<TopicProgressRecord>,
    ) -> Self {
        let (seed, state) = stored
            .as_ref()
            .and_then(|record| restore(&record.extra, questions.len()))
            .unwrap_or_else(|| (seed, QuizSessionState::empty(questions.len())));

        let questions = shuffled_indices(questions.len(), seed)
            .into_iter()
            .map(|i| questions[i].clone())
            .collect();

        Self {
            viewer,
            topic,
            seed,
            questions,
            state,
            stored,
            result: None,
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
        canonical_key(&self.topic)
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Questions in presentation order.
    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn state(&self) -> &QuizSessionState {
        &self.state
    }

    #[must_use]
    pub fn stored(&self) -> Option<&TopicProgressRecord> {
        self.stored.as_ref()
    }

    #[must_use]
    pub fn result(&self) -> Option<QuizResult> {
        self.result
    }

    #[must_use]
    pub fn is_submitted(&self) -> bool {
        self.result.is_some()
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.state.current_question_index)
    }

    /// Answers the current question. Ignored after submission or for an
    /// option the question does not have.
    pub fn select_answer(&mut self, option: usize) -> bool {
        if self.is_submitted() {
            return false;
        }
        let index = self.state.current_question_index;
        let valid = self
            .questions
            .get(index)
            .is_some_and(|q| option < q.options.len());
        if valid {
            self.state.answers[index] = Some(option);
        }
        valid
    }

    /// Moves to `index`, clamped to the last question.
    pub fn go_to(&mut self, index: usize) {
        self.state.current_question_index = index.min(self.questions.len().saturating_sub(1));
    }

    pub fn next(&mut self) -> bool {
        let current = self.state.current_question_index;
        if current + 1 >= self.questions.len() {
            return false;
        }
        self.state.current_question_index = current + 1;
        true
    }

    pub fn previous(&mut self) -> bool {
        let current = self.state.current_question_index;
        if current == 0 {
            return false;
        }
        self.state.current_question_index = current - 1;
        true
    }

    #[must_use]
    pub fn progress(&self) -> QuizProgress {
        let total = self.questions.len();
        let answered = self.state.answered_count();
        QuizProgress {
            total,
            answered,
            remaining: total - answered,
            current_index: self.state.current_question_index,
            percent: question_progress_percent(self.state.current_question_index, total),
        }
    }

    /// Write that stores the in-flight answers, keeping the stored completion.
    pub(crate) fn snapshot_update(&self) -> ProgressUpdate {
        let state = encode(
            self.state.answers.clone(),
            self.state.current_question_index,
        );
        let payload = json!({
            "seed": self.seed,
            "questionCount": self.questions.len(),
            "session": state.to_value(),
        });
        let update = match &self.stored {
            Some(record) => ProgressUpdate::from_record(self.storage_key(), record),
            None => ProgressUpdate::in_progress(self.storage_key(), 0),
        };
        update.with_extra(payload)
    }

    /// Scores the attempt and the completed write that records it.
    pub(crate) fn grade(&self) -> (QuizResult, ProgressUpdate) {
        let total = self.questions.len();
        let correct = count_correct(&self.state.answers, &self.questions);
        let result = QuizResult {
            correct,
            total,
            percentage: percentage(correct, total),
            points: points_from_correct(correct),
            points_awarded: false,
        };
        let update = ProgressUpdate::completed(self.storage_key(), result.percentage, result.points)
            .with_extra(json!({ "correct": correct, "total": total }));
        (result, update)
    }

    pub(crate) fn finish(&mut self, result: QuizResult) {
        self.result = Some(result);
    }
}

/// Stored answers only line up with the questions when the seed and the
/// question count both match what they were saved against.
fn restore(extra: &Value, question_count: usize) -> Option<(u64, QuizSessionState)> {
    let seed = extra.get("seed")?.as_u64()?;
    let saved_count = extra.get("questionCount")?.as_u64()?;
    if usize::try_from(saved_count).ok()? != question_count {
        return None;
    }
    let state = decode(extra.get("session"), question_count)?;
    Some((seed, state))
}
