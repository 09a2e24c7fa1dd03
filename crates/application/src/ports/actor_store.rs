//! Actor store port - persistence for the actor directory

use std::collections::HashMap;

use async_trait::async_trait;
use domain::entities::ActorProfile;
use domain::value_objects::{ActorId, ContentId, SpeakerId};
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};

use crate::error::ApplicationError;

/// Schema version written into the persisted actor directory document
pub const ACTOR_DIRECTORY_SCHEMA_VERSION: u32 = 1;

/// The full persisted state of the actor directory
///
/// Saved as one document with three sub-maps; every mutation overwrites
/// the whole thing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorDirectoryDocument {
    /// Persisted document schema version
    #[serde(default)]
    pub schema_version: u32,
    /// Actor profiles keyed by actor id
    pub actors: HashMap<ActorId, ActorProfile>,
    /// Which actor each speaker resolves to; re-association overwrites
    pub speaker_actors: HashMap<SpeakerId, ActorId>,
    /// Actors known to appear in each content item; membership only grows
    pub content_actors: HashMap<ContentId, Vec<ActorId>>,
}

impl Default for ActorDirectoryDocument {
    fn default() -> Self {
        Self {
            schema_version: ACTOR_DIRECTORY_SCHEMA_VERSION,
            actors: HashMap::new(),
            speaker_actors: HashMap::new(),
            content_actors: HashMap::new(),
        }
    }
}

/// Port for actor directory persistence
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ActorStore: Send + Sync {
    /// Load the directory document
    async fn load(&self) -> Result<ActorDirectoryDocument, ApplicationError>;

    /// Persist the directory document, replacing the previous one
    async fn save(&self, document: ActorDirectoryDocument) -> Result<(), ApplicationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_roundtrips_through_json() {
        let mut doc = ActorDirectoryDocument::default();
        let actor = ActorProfile::new(
            ActorId::from_index(1),
            "Alice",
            vec![SpeakerId::from_index(1)],
        );
        doc.speaker_actors
            .insert(SpeakerId::from_index(1), actor.actor_id.clone());
        doc.content_actors
            .insert(ContentId::from("episode_01"), vec![actor.actor_id.clone()]);
        doc.actors.insert(actor.actor_id.clone(), actor);

        let json = serde_json::to_string(&doc).unwrap();
        let restored: ActorDirectoryDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.actors.len(), 1);
        assert_eq!(
            restored.content_actors[&ContentId::from("episode_01")].len(),
            1
        );
    }
}
