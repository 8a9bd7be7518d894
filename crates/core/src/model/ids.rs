use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Errors raised when building identifiers from raw strings.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum KeyError {
    #[error("topic key must not be blank")]
    Empty,

    #[error("invalid user id: {raw}")]
    InvalidUserId { raw: String },
}

/// Identifier of a topic (theory page or quiz) as it appears in static content.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TopicKey(String);

impl TopicKey {
    /// Creates a new `TopicKey`.
    ///
    /// # Errors
    ///
    /// Returns `KeyError::Empty` if the key is blank.
    pub fn new(key: impl Into<String>) -> Result<Self, KeyError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(KeyError::Empty);
        }
        Ok(Self(key))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Key a progress record is stored under.
///
/// Quiz topics have two naming generations (bare and `quiz-` prefixed);
/// see [`crate::keys`] for how they are built and reconciled.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProgressKey(String);

impl ProgressKey {
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when this key names the given topic verbatim.
    #[must_use]
    pub fn matches_topic(&self, topic: &TopicKey) -> bool {
        self.0 == topic.0
    }
}

impl From<&TopicKey> for ProgressKey {
    fn from(topic: &TopicKey) -> Self {
        Self(topic.0.clone())
    }
}

/// Identifier of an authenticated learner.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(Uuid);

impl UserId {
    #[must_use]
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Generates a fresh random id.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl fmt::Debug for TopicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TopicKey({})", self.0)
    }
}

impl fmt::Debug for ProgressKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProgressKey({})", self.0)
    }
}

impl fmt::Debug for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserId({})", self.0)
    }
}

// ─── Display Implementations ───────────────────────────────────────────────────

impl fmt::Display for TopicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for ProgressKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ─── FromStr Implementations ───────────────────────────────────────────────────

impl FromStr for TopicKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl FromStr for UserId {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(UserId::new)
            .map_err(|_| KeyError::InvalidUserId { raw: s.to_string() })
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_key_rejects_blank() {
        assert_eq!(TopicKey::new("  ").unwrap_err(), KeyError::Empty);
        assert_eq!(TopicKey::new("").unwrap_err(), KeyError::Empty);
    }

    #[test]
    fn topic_key_display() {
        let key: TopicKey = "ownership".parse().unwrap();
        assert_eq!(key.to_string(), "ownership");
    }

    #[test]
    fn progress_key_matches_bare_topic_only() {
        let topic = TopicKey::new("traits").unwrap();
        assert!(ProgressKey::new("traits").matches_topic(&topic));
        assert!(!ProgressKey::new("quiz-traits").matches_topic(&topic));
    }

    #[test]
    fn user_id_roundtrip() {
        let original = UserId::random();
        let parsed: UserId = original.to_string().parse().unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn user_id_from_str_invalid() {
        let result = "not-a-uuid".parse::<UserId>();
        assert!(matches!(result, Err(KeyError::InvalidUserId { .. })));
    }
}
