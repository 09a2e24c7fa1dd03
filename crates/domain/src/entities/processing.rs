//! Processing request and response types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::AudioChunk;
use crate::value_objects::{ActorId, ContentId, SessionId, SpeakerId, VoiceId};

/// Outcome of processing one audio chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStatus {
    /// Chunk processed end to end (possibly with no speech content)
    Completed,
    /// Processing failed; `error_message` carries the reason
    Failed,
}

impl ProcessingStatus {
    /// Whether the chunk failed
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failed)
    }
}

/// Request to process one audio chunk within a session
#[derive(Debug, Clone)]
pub struct ProcessingRequest {
    /// Session this chunk belongs to
    pub session_id: SessionId,
    /// The audio to process
    pub audio: AudioChunk,
    /// Source language hint, if the client knows it
    pub source_language: Option<String>,
    /// Language to dub into
    pub target_language: String,
    /// Whether to resynthesize in the identified speaker's cloned voice
    pub preserve_voice: bool,
    /// Whether to resolve the speaker to a cross-content actor identity
    pub actor_aware: bool,
    /// Content item for actor-aware continuity, if known
    pub content_id: Option<ContentId>,
}

impl ProcessingRequest {
    /// Build a request with default flags (voice preservation on,
    /// actor-aware off)
    #[must_use]
    pub fn new(session_id: SessionId, audio: AudioChunk, target_language: impl Into<String>) -> Self {
        Self {
            session_id,
            audio,
            source_language: None,
            target_language: target_language.into(),
            preserve_voice: true,
            actor_aware: false,
            content_id: None,
        }
    }

    /// Enable actor-aware resolution within the given content item
    #[must_use]
    pub fn with_content(mut self, content_id: ContentId) -> Self {
        self.actor_aware = true;
        self.content_id = Some(content_id);
        self
    }
}

/// Response assembled by the pipeline for one processed chunk
///
/// The pipeline always returns a well-formed response; internal faults are
/// reported through `status` and `error_message`, never propagated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingResponse {
    /// Unique id for this processing attempt
    pub request_id: Uuid,
    /// Outcome
    pub status: ProcessingStatus,
    /// Recognized text in the source language
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_text: Option<String>,
    /// Translated text in the target language
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translated_text: Option<String>,
    /// Synthesized dubbed audio
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dubbed_audio: Option<Vec<u8>>,
    /// Identified speaker
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speaker_id: Option<SpeakerId>,
    /// Resolved actor, when actor-aware resolution found one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor_id: Option<ActorId>,
    /// Voice used for synthesis
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_id: Option<VoiceId>,
    /// Language detected by recognition
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detected_language: Option<String>,
    /// Failure reason when `status` is `Failed`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Wall-clock processing time in milliseconds
    pub processing_time_ms: u64,
}

impl ProcessingResponse {
    /// Response for a chunk that contained no recognizable speech
    ///
    /// This is a completed response, not an error: speaker identity is
    /// still reported so callers can keep their session view current.
    #[must_use]
    pub fn no_content(
        speaker_id: Option<SpeakerId>,
        actor_id: Option<ActorId>,
        processing_time_ms: u64,
    ) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            status: ProcessingStatus::Completed,
            original_text: None,
            translated_text: None,
            dubbed_audio: None,
            speaker_id,
            actor_id,
            voice_id: None,
            detected_language: None,
            error_message: None,
            processing_time_ms,
        }
    }

    /// Response for a failed chunk
    #[must_use]
    pub fn failed(error_message: impl Into<String>, processing_time_ms: u64) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            status: ProcessingStatus::Failed,
            original_text: None,
            translated_text: None,
            dubbed_audio: None,
            speaker_id: None,
            actor_id: None,
            voice_id: None,
            detected_language: None,
            error_message: Some(error_message.into()),
            processing_time_ms,
        }
    }
}
