//! Application services
//!
//! The four services that make up the voice-continuity core: the speaker
//! registry, the voice identity bank, the actor directory, and the
//! pipeline orchestrating them per audio chunk.

mod actor_directory;
mod pipeline;
mod speaker_registry;
mod voice_bank;

pub use actor_directory::{ActorDirectory, DirectoryConfig};
pub use pipeline::{DubbingPipeline, PipelineConfig};
pub use speaker_registry::{RegistryConfig, RegistryExport, SpeakerRegistry};
pub use voice_bank::{
    AudioQualityReport, PRESET_DEFAULT, PRESET_FEMALE, PRESET_MALE, SynthesisOutcome,
    VoiceBankConfig, VoiceIdentityBank, analyze_sample_quality,
};
