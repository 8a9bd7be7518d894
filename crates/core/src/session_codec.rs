//! Persistence shape of in-flight quiz answers.
//!
//! Stored payloads are untrusted: they may be corrupt, written by an older
//! client, or sized for a different version of the quiz. [`decode`] never
//! fails on bad slots; it degrades them to "unanswered".

use serde_json::Value;

use crate::model::QuizSessionState;

/// Canonical on-write shape of a session. No transformation is applied.
#[must_use]
pub fn encode(answers: Vec<Option<usize>>, current_question_index: usize) -> QuizSessionState {
    QuizSessionState {
        answers,
        current_question_index,
    }
}

/// Restores a session for a quiz of `question_count` questions.
///
/// Returns `None` when `raw` is absent, not an object, or has no `answers`
/// array. Otherwise the result always has exactly `question_count` slots.
#[must_use]
pub fn decode(raw: Option<&Value>, question_count: usize) -> Option<QuizSessionState> {
    let object = raw?.as_object()?;
    let stored = object.get("answers")?.as_array()?;

    let answers = (0..question_count)
        .map(|i| stored.get(i).and_then(answer_slot))
        .collect();

    let last = question_count.saturating_sub(1);
    let current_question_index = object
        .get("currentQuestion")
        .and_then(Value::as_f64)
        .filter(|n| n.is_finite())
        .map_or(0, |n| clamp_index(n, last));

    Some(QuizSessionState {
        answers,
        current_question_index,
    })
}

fn answer_slot(value: &Value) -> Option<usize> {
    if let Some(n) = value.as_u64() {
        return usize::try_from(n).ok();
    }
    let n = value.as_f64()?;
    if !n.is_finite() || n < 0.0 || n.fract() != 0.0 {
        return None;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let n = n as u64;
    usize::try_from(n).ok()
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn clamp_index(n: f64, last: usize) -> usize {
    let floored = n.floor();
    if floored <= 0.0 {
        0
    } else if floored >= last as f64 {
        last
    } else {
        floored as usize
    }
}
