//! Storage key conventions and the legacy -> canonical reconciliation.
//!
//! Quiz progress used to be stored under the bare topic id. It now lives under
//! `quiz-<topic>`. [`resolve_for_load`] is the only place that still knows
//! about the old naming; drop the `Legacy` branch once every record has been
//! re-saved.

use crate::model::{ProgressKey, TopicKey, TopicKind, TopicProgressRecord};

pub const QUIZ_KEY_PREFIX: &str = "quiz-";

/// Current storage key for a quiz topic.
#[must_use]
pub fn canonical_key(topic: &TopicKey) -> ProgressKey {
    ProgressKey::new(format!("{QUIZ_KEY_PREFIX}{topic}"))
}

/// Superseded storage key for a quiz topic.
#[must_use]
pub fn legacy_key(topic: &TopicKey) -> ProgressKey {
    ProgressKey::from(topic)
}

/// Key a topic of the given kind is written under.
#[must_use]
pub fn storage_key(kind: TopicKind, topic: &TopicKey) -> ProgressKey {
    match kind {
        TopicKind::Quiz => canonical_key(topic),
        TopicKind::Theory => ProgressKey::from(topic),
    }
}

/// Outcome of reconciling canonical and legacy records for one topic.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedRecord<R = TopicProgressRecord> {
    Canonical(R),
    /// Found only under the legacy key; the caller should re-save it canonically.
    Legacy(R),
    Missing,
}

impl<R> ResolvedRecord<R> {
    #[must_use]
    pub fn should_migrate_from_legacy(&self) -> bool {
        matches!(self, ResolvedRecord::Legacy(_))
    }

    #[must_use]
    pub fn record(&self) -> Option<&R> {
        match self {
            ResolvedRecord::Canonical(r) | ResolvedRecord::Legacy(r) => Some(r),
            ResolvedRecord::Missing => None,
        }
    }

    #[must_use]
    pub fn into_record(self) -> Option<R> {
        match self {
            ResolvedRecord::Canonical(r) | ResolvedRecord::Legacy(r) => Some(r),
            ResolvedRecord::Missing => None,
        }
    }
}

/// Picks which stored record represents `topic`.
///
/// A canonical record always wins. A legacy record is only accepted when its
/// stored key names `topic` exactly, so a stray record can never leak into
/// another topic.
#[must_use]
pub fn resolve_for_load(
    topic: &TopicKey,
    canonical: Option<TopicProgressRecord>,
    legacy: Option<TopicProgressRecord>,
) -> ResolvedRecord {
    if let Some(record) = canonical {
        return ResolvedRecord::Canonical(record);
    }
    match legacy {
        Some(record) if record.topic_key.matches_topic(topic) => ResolvedRecord::Legacy(record),
        _ => ResolvedRecord::Missing,
    }
}
