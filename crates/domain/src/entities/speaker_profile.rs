//! Speaker profile entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{SpeakerId, VoiceFingerprint, VoiceId};

/// Schema version written into persisted speaker records
pub const SPEAKER_PROFILE_SCHEMA_VERSION: u32 = 1;

/// Base learning rate for embedding updates; scaled down as confidence grows
const BASE_LEARNING_RATE: f32 = 0.1;

/// Confidence gained per matched observation
const CONFIDENCE_INCREMENT: f32 = 0.02;

/// Named scalar voice metrics for one speaker
///
/// Each metric is optional: a metric that could not be computed for the
/// available audio is absent, never zero. All frequencies are in Hz.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VoiceCharacteristics {
    /// Mean fundamental frequency over voiced frames
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pitch_mean: Option<f64>,
    /// Standard deviation of the fundamental frequency
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pitch_std: Option<f64>,
    /// Peak-to-peak fundamental frequency range
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pitch_range: Option<f64>,
    /// Ratio of harmonic to non-harmonic energy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub harmonics_noise_ratio: Option<f64>,
    /// Mean signal energy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub energy: Option<f64>,
    /// Root-mean-square amplitude
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rms: Option<f64>,
    /// Mean spectral centroid
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spectral_centroid: Option<f64>,
    /// Mean spectral bandwidth
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spectral_bandwidth: Option<f64>,
    /// Mean spectral rolloff (85% energy point)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spectral_rolloff: Option<f64>,
    /// Onsets per second, a crude speaking-rate proxy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speaking_rate: Option<f64>,
    /// Voice clarity in [0, 1], derived from the zero-crossing rate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clarity: Option<f64>,
    /// Gender likelihood: 0.0 = male register, 1.0 = female register
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender_likelihood: Option<f64>,
}

/// A recurring voice tracked by the speaker registry
///
/// Profiles are created on first sighting of a sufficiently dissimilar
/// voice and updated on every subsequent match. They are never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeakerProfile {
    /// Persisted record schema version
    pub schema_version: u32,
    /// Unique sequential speaker id
    pub speaker_id: SpeakerId,
    /// Current voice embedding, refined by a moving average over matches
    pub embedding: VoiceFingerprint,
    /// Match confidence in [0, 1]; only ever increases
    pub confidence: f32,
    /// Acoustic characteristics captured at first sighting
    pub characteristics: VoiceCharacteristics,
    /// Most recently associated synthesis voice clone, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_clone_id: Option<VoiceId>,
    /// When the profile was created
    pub created_at: DateTime<Utc>,
    /// When the profile was last updated
    pub updated_at: DateTime<Utc>,
}

impl SpeakerProfile {
    /// Create a profile for a newly sighted speaker
    #[must_use]
    pub fn new(
        speaker_id: SpeakerId,
        embedding: VoiceFingerprint,
        characteristics: VoiceCharacteristics,
    ) -> Self {
        let now = Utc::now();
        Self {
            schema_version: SPEAKER_PROFILE_SCHEMA_VERSION,
            speaker_id,
            embedding,
            confidence: 0.5,
            characteristics,
            voice_clone_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Fold a new matched observation into the profile
    ///
    /// The embedding moves toward the observation with learning rate
    /// `0.1 * (1 - confidence)`, so a well-established profile barely moves.
    /// Confidence ratchets up by a small fixed increment, capped at 1.0.
    pub fn absorb(&mut self, observation: &VoiceFingerprint) {
        let alpha = BASE_LEARNING_RATE * (1.0 - self.confidence);
        self.embedding = self.embedding.blend(observation, alpha);
        self.confidence = (self.confidence + CONFIDENCE_INCREMENT).min(1.0);
        self.updated_at = Utc::now();
    }

    /// Associate a synthesis voice clone with this speaker
    pub fn set_voice_clone(&mut self, voice_id: VoiceId) {
        self.voice_clone_id = Some(voice_id);
        self.updated_at = Utc::now();
    }
}
