//! Voice identifier - opaque id assigned by the synthesis provider

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier for a synthesis voice
///
/// Assigned externally by the cloning provider and treated as opaque;
/// the only guarantee is global uniqueness within the voice library.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoiceId(String);

impl VoiceId {
    /// Wrap a provider-assigned id
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the id as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for VoiceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for VoiceId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opaque_roundtrip() {
        let id = VoiceId::new("pNInz6obpgDQ");
        assert_eq!(id.as_str(), "pNInz6obpgDQ");
        assert_eq!(id.to_string(), "pNInz6obpgDQ");
    }

    #[test]
    fn from_str_and_string_agree() {
        assert_eq!(VoiceId::from("v1"), VoiceId::from("v1".to_string()));
    }
}
