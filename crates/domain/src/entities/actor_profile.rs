//! Actor profile entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{ActorId, ContentId, SpeakerId, VoiceId};

/// Schema version written into the persisted actor directory document
pub const ACTOR_PROFILE_SCHEMA_VERSION: u32 = 1;

/// One appearance of an actor in a content item
///
/// Appearances are append-only: an actor tracked in a content item stays
/// tracked, and re-tracking the same content is a no-op.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentAppearance {
    /// The content item
    pub content_id: ContentId,
    /// When the actor was first tracked in this content
    pub first_tracked_at: DateTime<Utc>,
}

/// A human-level identity spanning speakers, voices, and content items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorProfile {
    /// Persisted record schema version
    pub schema_version: u32,
    /// Unique sequential actor id
    pub actor_id: ActorId,
    /// Actor's name
    pub name: String,
    /// Synthesis voices owned by this actor, insertion-ordered, no duplicates
    pub voice_ids: Vec<VoiceId>,
    /// Speaker fingerprint identities grouped under this actor, no duplicates
    pub speaker_ids: Vec<SpeakerId>,
    /// Content items this actor has appeared in
    pub appearances: Vec<ContentAppearance>,
    /// When the profile was created
    pub created_at: DateTime<Utc>,
    /// When the profile was last updated
    pub updated_at: DateTime<Utc>,
}

impl ActorProfile {
    /// Create a new actor profile
    #[must_use]
    pub fn new(actor_id: ActorId, name: impl Into<String>, speaker_ids: Vec<SpeakerId>) -> Self {
        let now = Utc::now();
        let mut deduped = Vec::new();
        for id in speaker_ids {
            if !deduped.contains(&id) {
                deduped.push(id);
            }
        }
        Self {
            schema_version: ACTOR_PROFILE_SCHEMA_VERSION,
            actor_id,
            name: name.into(),
            voice_ids: Vec::new(),
            speaker_ids: deduped,
            appearances: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Link a speaker to this actor; returns false if already linked
    pub fn add_speaker(&mut self, speaker_id: SpeakerId) -> bool {
        if self.speaker_ids.contains(&speaker_id) {
            return false;
        }
        self.speaker_ids.push(speaker_id);
        self.updated_at = Utc::now();
        true
    }

    /// Add a voice to this actor; returns false if already present
    pub fn add_voice(&mut self, voice_id: VoiceId) -> bool {
        if self.voice_ids.contains(&voice_id) {
            return false;
        }
        self.voice_ids.push(voice_id);
        self.updated_at = Utc::now();
        true
    }

    /// Record an appearance in a content item; idempotent per content id
    pub fn record_appearance(&mut self, content_id: ContentId) -> bool {
        if self.appearances.iter().any(|a| a.content_id == content_id) {
            return false;
        }
        self.appearances.push(ContentAppearance {
            content_id,
            first_tracked_at: Utc::now(),
        });
        self.updated_at = Utc::now();
        true
    }
}
