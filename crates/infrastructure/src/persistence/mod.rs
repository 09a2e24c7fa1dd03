//! JSON file persistence
//!
//! One adapter per store port. All writes go through a temp-file rename so
//! a crash mid-write never leaves a truncated document behind, and all
//! loads are tolerant: missing or unreadable state degrades to empty.

mod json_actor_store;
mod json_speaker_store;
mod json_voice_library_store;

use std::path::Path;

use application::ApplicationError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::warn;

pub use json_actor_store::JsonActorStore;
pub use json_speaker_store::JsonSpeakerStore;
pub use json_voice_library_store::JsonVoiceLibraryStore;

/// Errors from the JSON file adapters
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Filesystem error
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path being read or written
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Document could not be serialized
    #[error("Serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl From<PersistenceError> for ApplicationError {
    fn from(err: PersistenceError) -> Self {
        Self::Persistence(err.to_string())
    }
}

fn io_error(path: &Path, source: std::io::Error) -> PersistenceError {
    PersistenceError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Write a JSON document to `path` atomically
///
/// Serializes to a sibling temp file first, then renames over the target,
/// which is atomic on the filesystems we care about.
async fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), PersistenceError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| io_error(parent, e))?;
    }

    let bytes = serde_json::to_vec_pretty(value)?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, &bytes)
        .await
        .map_err(|e| io_error(&tmp, e))?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| io_error(path, e))
}

/// Read a JSON document, degrading to `None` when it is missing or broken
///
/// A missing file is normal first-run state; a broken one is logged and
/// treated as absent rather than blocking startup.
async fn read_json_tolerant<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read persisted state; ignoring it");
            return None;
        },
    };
    match serde_json::from_slice(&bytes) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "persisted state is corrupt; ignoring it");
            None
        },
    }
}
