//! Domain layer for the real-time dubbing voice-continuity core
//!
//! Contains the entities and value objects shared by every other crate:
//! speaker profiles, voice clones, actor profiles, audio chunks, and the
//! processing request/response types, plus the strongly-typed identifiers
//! linking them.
//!
//! This crate is intentionally free of async code and I/O. Persistence and
//! model calls live behind ports in the `application` crate.

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use entities::{
    ActorProfile, AudioChunk, ContentAppearance, ProcessingRequest, ProcessingResponse,
    ProcessingStatus, QualityMetrics, SessionSummary, SpeakerProfile, SynthesisSettings,
    VoiceCharacteristics, VoiceClone,
};
pub use errors::DomainError;
pub use value_objects::{
    ActorId, ContentId, EMBEDDING_DIM, SessionId, SpeakerId, VoiceFingerprint, VoiceId,
};
