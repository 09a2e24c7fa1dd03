//! Domain entities

mod actor_profile;
mod audio_chunk;
mod processing;
mod session_summary;
mod speaker_profile;
mod voice_clone;

pub use actor_profile::{ACTOR_PROFILE_SCHEMA_VERSION, ActorProfile, ContentAppearance};
pub use audio_chunk::AudioChunk;
pub use processing::{ProcessingRequest, ProcessingResponse, ProcessingStatus};
pub use session_summary::SessionSummary;
pub use speaker_profile::{SPEAKER_PROFILE_SCHEMA_VERSION, SpeakerProfile, VoiceCharacteristics};
pub use voice_clone::{
    QualityMetrics, SynthesisSettings, VOICE_CLONE_SCHEMA_VERSION, VoiceClone, estimate_quality,
};
