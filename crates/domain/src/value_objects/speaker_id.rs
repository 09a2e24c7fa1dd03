//! Speaker identifier - sequential id for an acoustically recurring voice

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Identifier for a speaker tracked by the registry
///
/// Speakers are minted sequentially as `speaker_001`, `speaker_002`, ...
/// The numeric index is 1-based: the first voice ever seen is `speaker_001`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpeakerId(String);

impl SpeakerId {
    /// Build the id for the given 1-based index
    #[must_use]
    pub fn from_index(index: usize) -> Self {
        Self(format!("speaker_{index:03}"))
    }

    /// Parse an id string, validating its shape
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        let index = s
            .strip_prefix("speaker_")
            .and_then(|n| n.parse::<usize>().ok());
        match index {
            Some(i) if i >= 1 => Ok(Self::from_index(i)),
            _ => Err(DomainError::InvalidId(s.to_string())),
        }
    }

    /// Get the id as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SpeakerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_index_pads_to_three_digits() {
        assert_eq!(SpeakerId::from_index(1).as_str(), "speaker_001");
        assert_eq!(SpeakerId::from_index(42).as_str(), "speaker_042");
        assert_eq!(SpeakerId::from_index(1234).as_str(), "speaker_1234");
    }

    #[test]
    fn parse_roundtrips() {
        let id = SpeakerId::from_index(7);
        let parsed = SpeakerId::parse(id.as_str()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(SpeakerId::parse("actor_001").is_err());
        assert!(SpeakerId::parse("speaker_").is_err());
        assert!(SpeakerId::parse("speaker_000").is_err());
        assert!(SpeakerId::parse("speaker_abc").is_err());
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = SpeakerId::from_index(3);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"speaker_003\"");
    }

    #[test]
    fn ordering_follows_index() {
        assert!(SpeakerId::from_index(1) < SpeakerId::from_index(2));
    }
}
