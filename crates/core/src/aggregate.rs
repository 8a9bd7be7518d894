use crate::keys::{legacy_key, resolve_for_load, storage_key};
use crate::model::{GroupedTopic, ProgressIndex, TopicKey, TopicKind};

/// Completion and score of a topic as shown on overview cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TopicCompletion {
    pub is_completed: bool,
    pub score: u8,
}

/// Derives topic-level progress from stored records.
///
/// Records are looked up under the storage key of the topic's kind. Quiz
/// units that still sit under their legacy key are picked up the same way a
/// load resolves them.
///
/// Grouped topics are complete only when every sub-unit is; their score is
/// the rounded mean of sub-unit scores (missing records count as 0) and does
/// not wait for completion.
#[must_use]
pub fn aggregate(topic: &GroupedTopic, progress: &ProgressIndex) -> TopicCompletion {
    if !topic.has_submodules() {
        return unit_completion(topic.kind, &topic.id, progress).unwrap_or_default();
    }

    let mut all_completed = true;
    let mut total = 0_u32;
    for sub in &topic.submodule_ids {
        match unit_completion(topic.kind, sub, progress) {
            Some(unit) => {
                all_completed &= unit.is_completed;
                total += u32::from(unit.score);
            }
            None => all_completed = false,
        }
    }

    #[allow(clippy::cast_precision_loss)]
    let mean = f64::from(total) / topic.submodule_ids.len() as f64;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let score = mean.round().clamp(0.0, 100.0) as u8;

    TopicCompletion {
        is_completed: all_completed,
        score,
    }
}

fn unit_completion(
    kind: TopicKind,
    unit: &TopicKey,
    progress: &ProgressIndex,
) -> Option<TopicCompletion> {
    let from_record = |completed, score| TopicCompletion {
        is_completed: completed,
        score,
    };

    if let Some(record) = progress.get(&storage_key(kind, unit)) {
        return Some(from_record(record.completed, record.score));
    }
    if kind == TopicKind::Theory {
        return None;
    }

    let legacy = progress.get(&legacy_key(unit)).cloned();
    resolve_for_load(unit, None, legacy)
        .into_record()
        .map(|r| from_record(r.completed, r.score))
}
