//! Port definitions for the application layer
//!
//! Ports are interfaces that define how the application interacts with
//! external systems. Adapters in the infrastructure layer implement these
//! ports; tests substitute mocks.

mod actor_store;
mod recognition_port;
mod speaker_store;
mod synthesis_port;
mod translation_port;
mod voice_library_store;

#[cfg(test)]
pub use actor_store::MockActorStore;
pub use actor_store::{ACTOR_DIRECTORY_SCHEMA_VERSION, ActorDirectoryDocument, ActorStore};
#[cfg(test)]
pub use recognition_port::MockRecognitionPort;
pub use recognition_port::{RecognitionPort, RecognitionResult};
#[cfg(test)]
pub use speaker_store::MockSpeakerStore;
pub use speaker_store::SpeakerStore;
#[cfg(test)]
pub use synthesis_port::MockSynthesisPort;
pub use synthesis_port::{SynthesisPort, SynthesizedAudio};
#[cfg(test)]
pub use translation_port::MockTranslationPort;
pub use translation_port::{TranslationPort, TranslationResult};
#[cfg(test)]
pub use voice_library_store::MockVoiceLibraryStore;
pub use voice_library_store::{
    VOICE_LIBRARY_SCHEMA_VERSION, VoiceLibraryDocument, VoiceLibraryStore,
};
