use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::model::ids::{ProgressKey, TopicKey, UserId};

/// Highest score a record can carry.
pub const MAX_SCORE: u8 = 100;

/// Who is asking. Only authenticated viewers ever reach the progress store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Viewer {
    #[default]
    Anonymous,
    Authenticated(UserId),
}

impl Viewer {
    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Viewer::Anonymous => None,
            Viewer::Authenticated(id) => Some(*id),
        }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Viewer::Authenticated(_))
    }
}

/// Kind of learning unit, which decides the storage key convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TopicKind {
    /// Theory pages store under the bare topic id.
    Theory,
    /// Quizzes store under the `quiz-` prefixed key.
    Quiz,
}

/// Stored progress for one (user, key) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct TopicProgressRecord {
    /// Key the record was stored under.
    pub topic_key: ProgressKey,
    pub completed: bool,
    pub score: u8,
    pub points_earned: u32,
    /// Opaque payload; quizzes keep in-flight session state here.
    pub extra: Value,
    pub updated_at: DateTime<Utc>,
}

impl TopicProgressRecord {
    /// Rehydrate a record from persisted columns, clamping the score into range.
    #[must_use]
    pub fn from_persisted(
        topic_key: ProgressKey,
        completed: bool,
        score: i64,
        points_earned: i64,
        extra: Value,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            topic_key,
            completed,
            score: clamp_score(score),
            points_earned: u32::try_from(points_earned.max(0)).unwrap_or(u32::MAX),
            extra,
            updated_at,
        }
    }

    /// Same record, stored under a different key.
    #[must_use]
    pub fn rekeyed(mut self, key: ProgressKey) -> Self {
        self.topic_key = key;
        self
    }
}

/// A single save against the progress store.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressUpdate {
    pub key: ProgressKey,
    pub completed: bool,
    pub score: u8,
    pub points_earned: u32,
    pub extra: Value,
}

impl ProgressUpdate {
    /// Partial progress: not completed, no points, no payload.
    #[must_use]
    pub fn in_progress(key: ProgressKey, score: u8) -> Self {
        Self {
            key,
            completed: false,
            score: score.min(MAX_SCORE),
            points_earned: 0,
            extra: Value::Null,
        }
    }

    /// A completed unit.
    #[must_use]
    pub fn completed(key: ProgressKey, score: u8, points_earned: u32) -> Self {
        Self {
            key,
            completed: true,
            score: score.min(MAX_SCORE),
            points_earned,
            extra: Value::Null,
        }
    }

    /// Caps a hand-built score at [`MAX_SCORE`].
    #[must_use]
    pub fn clamped(mut self) -> Self {
        self.score = self.stored_score();
        self
    }

    /// Score as it may be persisted.
    #[must_use]
    pub fn stored_score(&self) -> u8 {
        self.score.min(MAX_SCORE)
    }

    #[must_use]
    pub fn with_extra(mut self, extra: Value) -> Self {
        self.extra = extra;
        self
    }

    /// Re-save an existing record under `key`, unchanged otherwise.
    #[must_use]
    pub fn from_record(key: ProgressKey, record: &TopicProgressRecord) -> Self {
        Self {
            key,
            completed: record.completed,
            score: record.score,
            points_earned: record.points_earned,
            extra: record.extra.clone(),
        }
    }
}

/// Result of a save as reported by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SaveOutcome {
    pub points_awarded: bool,
}

/// Static configuration of a topic and its optional sub-units.
///
/// `kind` applies to the topic and every sub-unit and decides which key
/// their records live under. A topic with sub-units never has a record of
/// its own; its progress is derived from the sub-unit records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupedTopic {
    pub id: TopicKey,
    pub kind: TopicKind,
    pub submodule_ids: Vec<TopicKey>,
}

impl GroupedTopic {
    #[must_use]
    pub fn single(kind: TopicKind, id: TopicKey) -> Self {
        Self {
            id,
            kind,
            submodule_ids: Vec::new(),
        }
    }

    #[must_use]
    pub fn grouped(kind: TopicKind, id: TopicKey, submodule_ids: Vec<TopicKey>) -> Self {
        Self {
            id,
            kind,
            submodule_ids,
        }
    }

    #[must_use]
    pub fn has_submodules(&self) -> bool {
        !self.submodule_ids.is_empty()
    }
}

/// All records of one user, indexed by storage key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressIndex {
    records: HashMap<ProgressKey, TopicProgressRecord>,
}

impl ProgressIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, record: TopicProgressRecord) {
        self.records.insert(record.topic_key.clone(), record);
    }

    #[must_use]
    pub fn get(&self, key: &ProgressKey) -> Option<&TopicProgressRecord> {
        self.records.get(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<TopicProgressRecord> for ProgressIndex {
    fn from_iter<I: IntoIterator<Item = TopicProgressRecord>>(iter: I) -> Self {
        let mut index = Self::new();
        for record in iter {
            index.insert(record);
        }
        index
    }
}

fn clamp_score(score: i64) -> u8 {
    u8::try_from(score.clamp(0, i64::from(MAX_SCORE))).unwrap_or(MAX_SCORE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn persisted_scores_are_clamped() {
        let key = ProgressKey::new("intro");
        let high = TopicProgressRecord::from_persisted(
            key.clone(),
            true,
            250,
            -5,
            Value::Null,
            fixed_now(),
        );
        assert_eq!(high.score, 100);
        assert_eq!(high.points_earned, 0);

        let low = TopicProgressRecord::from_persisted(key, false, -3, 40, Value::Null, fixed_now());
        assert_eq!(low.score, 0);
        assert_eq!(low.points_earned, 40);
    }

    #[test]
    fn update_constructors_cap_score() {
        let update = ProgressUpdate::in_progress(ProgressKey::new("a"), 180);
        assert_eq!(update.score, 100);
        assert!(!update.completed);
    }

    #[test]
    fn hand_built_update_is_clamped() {
        let update = ProgressUpdate {
            key: ProgressKey::new("a"),
            completed: false,
            score: 150,
            points_earned: 0,
            extra: Value::Null,
        };
        assert_eq!(update.stored_score(), 100);
        assert_eq!(update.clamped().score, 100);
    }

    #[test]
    fn anonymous_viewer_has_no_user() {
        assert_eq!(Viewer::Anonymous.user_id(), None);
        let id = UserId::random();
        assert_eq!(Viewer::Authenticated(id).user_id(), Some(id));
    }

    #[test]
    fn index_keeps_latest_record_per_key() {
        let first = TopicProgressRecord::from_persisted(
            ProgressKey::new("a"),
            false,
            10,
            0,
            Value::Null,
            fixed_now(),
        );
        let second = TopicProgressRecord {
            score: 90,
            ..first.clone()
        };
        let index: ProgressIndex = vec![first, second].into_iter().collect();
        assert_eq!(index.len(), 1);
        assert_eq!(index.get(&ProgressKey::new("a")).unwrap().score, 90);
    }
}
