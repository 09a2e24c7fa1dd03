//! Voice clone entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{SpeakerId, VoiceId};

/// Schema version written into the persisted voice library document
pub const VOICE_CLONE_SCHEMA_VERSION: u32 = 1;

/// Tuning parameters passed to the synthesis provider
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SynthesisSettings {
    /// Voice stability; lower values allow more expressive variation
    pub stability: f32,
    /// How strongly the output should match the cloned voice
    pub similarity_boost: f32,
    /// Style exaggeration
    pub style: f32,
    /// Provider-side speaker boost flag
    pub speaker_boost: bool,
}

impl Default for SynthesisSettings {
    fn default() -> Self {
        Self {
            stability: 0.5,
            similarity_boost: 0.75,
            style: 0.5,
            speaker_boost: true,
        }
    }
}

/// Quality estimate for a voice clone
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    /// Number of audio samples the clone was trained on
    pub sample_count: usize,
    /// Estimated clone quality in [0, 1], derived from total sample duration
    pub estimated_quality: f64,
}

/// A synthesis-provider voice trained from one speaker's audio
///
/// Many clones may exist for one speaker; the registry keeps only the most
/// recently associated one as that speaker's default, but older clones stay
/// in the library for quality comparisons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceClone {
    /// Persisted record schema version
    pub schema_version: u32,
    /// Provider-assigned voice id, globally unique
    pub voice_id: VoiceId,
    /// Speaker the clone was trained from
    pub speaker_id: SpeakerId,
    /// Human-readable name
    pub display_name: String,
    /// When the clone was created
    pub created_at: DateTime<Utc>,
    /// Total duration of the training samples in seconds
    pub total_sample_duration_secs: f64,
    /// Synthesis tuning parameters for this clone
    pub settings: SynthesisSettings,
    /// Quality estimate
    pub quality: QualityMetrics,
    /// Last time this clone was used for synthesis
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_used_at: Option<DateTime<Utc>>,
}

impl VoiceClone {
    /// Create a new clone record
    #[must_use]
    pub fn new(
        voice_id: VoiceId,
        speaker_id: SpeakerId,
        display_name: impl Into<String>,
        total_sample_duration_secs: f64,
        sample_count: usize,
    ) -> Self {
        Self {
            schema_version: VOICE_CLONE_SCHEMA_VERSION,
            voice_id,
            speaker_id,
            display_name: display_name.into(),
            created_at: Utc::now(),
            total_sample_duration_secs,
            settings: SynthesisSettings::default(),
            quality: QualityMetrics {
                sample_count,
                estimated_quality: estimate_quality(total_sample_duration_secs),
            },
            last_used_at: None,
        }
    }

    /// Record that the clone was just used for synthesis
    pub fn touch(&mut self) {
        self.last_used_at = Some(Utc::now());
    }
}

/// Estimate clone quality from total training-sample duration
///
/// Staircase with linear ramps: up to 30 s of audio gives a poor clone,
/// 5 minutes a good one, and quality saturates at 1.0 by 30 minutes.
#[must_use]
pub fn estimate_quality(total_duration_secs: f64) -> f64 {
    if total_duration_secs <= 30.0 {
        0.3
    } else if total_duration_secs <= 60.0 {
        0.5
    } else if total_duration_secs <= 300.0 {
        0.7 + (total_duration_secs - 60.0) / (300.0 - 60.0) * 0.2
    } else {
        (0.9 + (total_duration_secs - 300.0) / (1800.0 - 300.0) * 0.1).min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_staircase_anchor_points() {
        assert!((estimate_quality(10.0) - 0.3).abs() < f64::EPSILON);
        assert!((estimate_quality(45.0) - 0.5).abs() < f64::EPSILON);

        let mid = estimate_quality(180.0);
        assert!(mid > 0.7 && mid < 0.9);

        let long = estimate_quality(1000.0);
        assert!(long > 0.9 && long <= 1.0);

        assert!((estimate_quality(5000.0) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn quality_is_monotonic() {
        let durations = [0.0, 15.0, 30.0, 31.0, 60.0, 61.0, 180.0, 300.0, 900.0, 1800.0, 3600.0];
        for pair in durations.windows(2) {
            assert!(estimate_quality(pair[0]) <= estimate_quality(pair[1]));
        }
    }

    #[test]
    fn new_clone_gets_default_settings_and_quality() {
        let clone = VoiceClone::new(
            VoiceId::new("v_abc"),
            SpeakerId::from_index(1),
            "Alice",
            45.0,
            3,
        );
        assert_eq!(clone.settings, SynthesisSettings::default());
        assert_eq!(clone.quality.sample_count, 3);
        assert!((clone.quality.estimated_quality - 0.5).abs() < f64::EPSILON);
        assert!(clone.last_used_at.is_none());
    }

    #[test]
    fn touch_sets_last_used() {
        let mut clone = VoiceClone::new(
            VoiceId::new("v_abc"),
            SpeakerId::from_index(1),
            "Alice",
            45.0,
            3,
        );
        clone.touch();
        assert!(clone.last_used_at.is_some());
    }

    #[test]
    fn clone_roundtrips_through_json() {
        let clone = VoiceClone::new(
            VoiceId::new("v_xyz"),
            SpeakerId::from_index(2),
            "Bob",
            120.0,
            5,
        );
        let json = serde_json::to_string(&clone).unwrap();
        let restored: VoiceClone = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, clone);
    }
}
