use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub prompt: String,
    pub options: Vec<String>,
    /// Index into `options` of the right answer.
    pub correct_option: usize,
}

impl Question {
    #[must_use]
    pub fn new(prompt: impl Into<String>, options: Vec<String>, correct_option: usize) -> Self {
        Self {
            prompt: prompt.into(),
            options,
            correct_option,
        }
    }

    #[must_use]
    pub fn is_correct(&self, answer: usize) -> bool {
        answer == self.correct_option
    }
}

/// In-flight answers of a quiz attempt.
///
/// `answers[i]` is the option chosen for the question at position `i`, or
/// `None` while unanswered.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QuizSessionState {
    pub answers: Vec<Option<usize>>,
    #[serde(rename = "currentQuestion")]
    pub current_question_index: usize,
}

impl QuizSessionState {
    /// Fresh state for a quiz with `question_count` questions.
    #[must_use]
    pub fn empty(question_count: usize) -> Self {
        Self {
            answers: vec![None; question_count],
            current_question_index: 0,
        }
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.iter().filter(|a| a.is_some()).count()
    }

    /// On-write JSON shape: `{"answers": [n | null, ...], "currentQuestion": n}`.
    #[must_use]
    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "answers": self.answers,
            "currentQuestion": self.current_question_index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_state_has_one_slot_per_question() {
        let state = QuizSessionState::empty(3);
        assert_eq!(state.answers, vec![None, None, None]);
        assert_eq!(state.answered_count(), 0);
    }

    #[test]
    fn to_value_uses_wire_field_names() {
        let state = QuizSessionState {
            answers: vec![Some(1), None],
            current_question_index: 1,
        };
        let value = state.to_value();
        assert_eq!(value["currentQuestion"], 1);
        assert_eq!(value["answers"], serde_json::json!([1, null]));
    }
}
