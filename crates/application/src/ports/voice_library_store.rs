//! Voice library store port - persistence for the clone library

use std::collections::HashMap;

use async_trait::async_trait;
use domain::entities::VoiceClone;
use domain::value_objects::{SpeakerId, VoiceId};
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};

use crate::error::ApplicationError;

/// Schema version written into the persisted voice library document
pub const VOICE_LIBRARY_SCHEMA_VERSION: u32 = 1;

/// The full persisted state of the voice identity bank
///
/// Saved as one document: every mutation overwrites the whole thing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceLibraryDocument {
    /// Persisted document schema version
    #[serde(default)]
    pub schema_version: u32,
    /// Every clone ever created, keyed by provider voice id
    pub clones: HashMap<VoiceId, VoiceClone>,
    /// Default voice per speaker; the most recent clone wins
    pub speaker_voices: HashMap<SpeakerId, VoiceId>,
}

impl Default for VoiceLibraryDocument {
    fn default() -> Self {
        Self {
            schema_version: VOICE_LIBRARY_SCHEMA_VERSION,
            clones: HashMap::new(),
            speaker_voices: HashMap::new(),
        }
    }
}

/// Port for voice library persistence
#[cfg_attr(test, automock)]
#[async_trait]
pub trait VoiceLibraryStore: Send + Sync {
    /// Load the library document
    async fn load(&self) -> Result<VoiceLibraryDocument, ApplicationError>;

    /// Persist the library document, replacing the previous one
    async fn save(&self, document: VoiceLibraryDocument) -> Result<(), ApplicationError>;
}
