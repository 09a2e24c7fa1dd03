//! Infrastructure layer - adapters for external systems
//!
//! Implements the persistence ports defined in the application layer with
//! JSON files on disk, and provides configuration loading and tracing
//! initialization for binaries embedding the pipeline.

pub mod config;
pub mod persistence;
pub mod telemetry;

pub use config::{AppConfig, StorageConfig};
pub use persistence::{JsonActorStore, JsonSpeakerStore, JsonVoiceLibraryStore, PersistenceError};
pub use telemetry::{TelemetryConfig, init_tracing};
