//! Actor identifier - sequential id for a human-level identity

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Identifier for an actor profile
///
/// Minted sequentially as `actor_001`, `actor_002`, ... An actor groups
/// several speaker fingerprints and voice clones under one identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(String);

impl ActorId {
    /// Build the id for the given 1-based index
    #[must_use]
    pub fn from_index(index: usize) -> Self {
        Self(format!("actor_{index:03}"))
    }

    /// Parse an id string, validating its shape
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        let index = s
            .strip_prefix("actor_")
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

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_index_formats() {
        assert_eq!(ActorId::from_index(1).as_str(), "actor_001");
        assert_eq!(ActorId::from_index(99).as_str(), "actor_099");
    }

    #[test]
    fn parse_roundtrips() {
        let id = ActorId::from_index(12);
        assert_eq!(ActorId::parse("actor_012").unwrap(), id);
    }

    #[test]
    fn parse_rejects_speaker_ids() {
        assert!(ActorId::parse("speaker_001").is_err());
    }
}
