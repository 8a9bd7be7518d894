//! Completion gate: turns section-visitation evidence into a completion state.
//!
//! The decision is a pure function of a [`SectionVisitationSnapshot`]. Anything
//! with side effects (the persist-in-progress-once latch, explicit completion
//! writes) belongs to the caller.

use crate::model::{MAX_SCORE, SectionVisitationSnapshot};

/// Where a learning unit stands within one session.
///
/// Moves forward only: `NotStarted -> InProgress -> Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CompletionState {
    NotStarted,
    InProgress,
    Completed,
}

impl CompletionState {
    #[must_use]
    pub fn is_started(self) -> bool {
        self != CompletionState::NotStarted
    }
}

/// Derived view of a snapshot. Recomputed on every evidence change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionDecision {
    pub state: CompletionState,
    pub score: u8,
    pub can_complete: bool,
}

impl CompletionDecision {
    const INERT: Self = Self {
        state: CompletionState::NotStarted,
        score: 0,
        can_complete: false,
    };
}

/// Evaluates the completion gate for one snapshot.
///
/// Scroll depth only ever counts as partial credit: it can push the score to
/// 100 but completion needs every required section visited.
#[must_use]
pub fn derive_completion_gate_decision(snapshot: &SectionVisitationSnapshot) -> CompletionDecision {
    let required = snapshot.required().len();
    if required == 0 {
        return CompletionDecision::INERT;
    }

    let visited = snapshot.visited_required_count();
    #[allow(clippy::cast_precision_loss)]
    let section_coverage = visited as f64 / required as f64 * 100.0;
    let scroll_coverage = scroll_coverage(snapshot.scroll_percent());

    let score = to_score(section_coverage.max(scroll_coverage));
    let can_complete = snapshot.all_required_visited();

    let state = if score >= MAX_SCORE && can_complete {
        CompletionState::Completed
    } else if visited > 0 || scroll_coverage > 0.0 {
        CompletionState::InProgress
    } else {
        CompletionState::NotStarted
    };

    CompletionDecision {
        state,
        score,
        can_complete,
    }
}

fn scroll_coverage(percent: Option<f64>) -> f64 {
    match percent {
        Some(p) if p.is_finite() => p.clamp(0.0, 100.0),
        _ => 0.0,
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_score(coverage: f64) -> u8 {
    coverage.round().clamp(0.0, f64::from(MAX_SCORE)) as u8
}
