//! Voice library as one JSON document

use std::path::PathBuf;

use application::{ApplicationError, VoiceLibraryDocument, VoiceLibraryStore};
use async_trait::async_trait;

use super::{read_json_tolerant, write_json_atomic};

/// [`VoiceLibraryStore`] backed by a single JSON file
#[derive(Debug, Clone)]
pub struct JsonVoiceLibraryStore {
    path: PathBuf,
}

impl JsonVoiceLibraryStore {
    /// Create a store writing to the given file path
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl VoiceLibraryStore for JsonVoiceLibraryStore {
    async fn load(&self) -> Result<VoiceLibraryDocument, ApplicationError> {
        Ok(read_json_tolerant(&self.path).await.unwrap_or_default())
    }

    async fn save(&self, document: VoiceLibraryDocument) -> Result<(), ApplicationError> {
        write_json_atomic(&self.path, &document).await?;
        Ok(())
    }
}
