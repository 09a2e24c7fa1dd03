//! Actor directory as one JSON document

use std::path::PathBuf;

use application::{ActorDirectoryDocument, ActorStore, ApplicationError};
use async_trait::async_trait;

use super::{read_json_tolerant, write_json_atomic};

/// [`ActorStore`] backed by a single JSON file
#[derive(Debug, Clone)]
pub struct JsonActorStore {
    path: PathBuf,
}

impl JsonActorStore {
    /// Create a store writing to the given file path
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ActorStore for JsonActorStore {
    async fn load(&self) -> Result<ActorDirectoryDocument, ApplicationError> {
        Ok(read_json_tolerant(&self.path).await.unwrap_or_default())
    }

    async fn save(&self, document: ActorDirectoryDocument) -> Result<(), ApplicationError> {
        write_json_atomic(&self.path, &document).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use domain::entities::ActorProfile;
    use domain::value_objects::{ActorId, ContentId, SpeakerId};

    use super::*;

    #[tokio::test]
    async fn missing_file_loads_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonActorStore::new(dir.path().join("actors.json"));
        let document = store.load().await.unwrap();
        assert!(document.actors.is_empty());
    }

    #[tokio::test]
    async fn directory_roundtrips_with_all_three_maps() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonActorStore::new(dir.path().join("actors.json"));

        let mut document = ActorDirectoryDocument::default();
        let mut actor = ActorProfile::new(
            ActorId::from_index(1),
            "Alice",
            vec![SpeakerId::from_index(1)],
        );
        actor.record_appearance(ContentId::from("episode_01"));
        document
            .speaker_actors
            .insert(SpeakerId::from_index(1), actor.actor_id.clone());
        document
            .content_actors
            .insert(ContentId::from("episode_01"), vec![actor.actor_id.clone()]);
        document.actors.insert(actor.actor_id.clone(), actor);
        store.save(document).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.actors.len(), 1);
        assert_eq!(loaded.speaker_actors.len(), 1);
        assert_eq!(
            loaded.content_actors[&ContentId::from("episode_01")],
            vec![ActorId::from_index(1)]
        );
        assert_eq!(
            loaded.actors[&ActorId::from_index(1)].appearances.len(),
            1
        );
    }

    #[tokio::test]
    async fn corrupt_file_loads_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("actors.json");
        tokio::fs::write(&path, b"not json at all").await.unwrap();

        let store = JsonActorStore::new(path);
        assert!(store.load().await.unwrap().actors.is_empty());
    }
}
