//! Speaker profiles as one JSON file per speaker

use std::path::PathBuf;

use application::{ApplicationError, SpeakerStore};
use async_trait::async_trait;
use domain::entities::SpeakerProfile;
use tracing::warn;

use super::{io_error, read_json_tolerant, write_json_atomic};

/// [`SpeakerStore`] backed by a directory of `speaker_NNN.json` files
///
/// One file per profile keeps write-through saves cheap: only the changed
/// speaker is rewritten.
#[derive(Debug, Clone)]
pub struct JsonSpeakerStore {
    dir: PathBuf,
}

impl JsonSpeakerStore {
    /// Create a store rooted at the given directory
    ///
    /// The directory is created on first save.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn profile_path(&self, profile: &SpeakerProfile) -> PathBuf {
        self.dir.join(format!("{}.json", profile.speaker_id))
    }
}

#[async_trait]
impl SpeakerStore for JsonSpeakerStore {
    async fn load_all(&self) -> Result<Vec<SpeakerProfile>, ApplicationError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_error(&self.dir, e).into()),
        };

        let mut profiles = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| io_error(&self.dir, e))?
        {
            let path = entry.path();
            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            // A single unreadable profile should not take down the rest
            match read_json_tolerant::<SpeakerProfile>(&path).await {
                Some(profile) => profiles.push(profile),
                None => warn!(path = %path.display(), "skipping unreadable speaker profile"),
            }
        }
        Ok(profiles)
    }

    async fn save(&self, profile: SpeakerProfile) -> Result<(), ApplicationError> {
        let path = self.profile_path(&profile);
        write_json_atomic(&path, &profile).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use domain::entities::VoiceCharacteristics;
    use domain::value_objects::{SpeakerId, VoiceFingerprint};

    use super::*;

    fn profile(index: usize) -> SpeakerProfile {
        SpeakerProfile::new(
            SpeakerId::from_index(index),
            VoiceFingerprint::zero(),
            VoiceCharacteristics::default(),
        )
    }

    #[tokio::test]
    async fn empty_directory_loads_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSpeakerStore::new(dir.path());
        assert!(store.load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_directory_loads_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSpeakerStore::new(dir.path().join("never_created"));
        assert!(store.load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn saved_profiles_come_back() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSpeakerStore::new(dir.path());

        store.save(profile(1)).await.unwrap();
        store.save(profile(2)).await.unwrap();

        let mut loaded = store.load_all().await.unwrap();
        loaded.sort_by(|a, b| a.speaker_id.cmp(&b.speaker_id));
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].speaker_id.as_str(), "speaker_001");
        assert_eq!(loaded[1].speaker_id.as_str(), "speaker_002");
    }

    #[tokio::test]
    async fn resave_overwrites_the_same_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSpeakerStore::new(dir.path());

        let mut p = profile(1);
        store.save(p.clone()).await.unwrap();
        p.confidence = 0.9;
        store.save(p).await.unwrap();

        let loaded = store.load_all().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert!((loaded[0].confidence - 0.9).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn corrupt_profile_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSpeakerStore::new(dir.path());
        store.save(profile(1)).await.unwrap();
        tokio::fs::write(dir.path().join("speaker_002.json"), b"garbage")
            .await
            .unwrap();

        let loaded = store.load_all().await.unwrap();
        assert_eq!(loaded.len(), 1);
    }
}
