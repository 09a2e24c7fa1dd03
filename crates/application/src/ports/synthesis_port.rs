//! Synthesis port - Interface for text-to-speech and voice cloning

use async_trait::async_trait;
use domain::entities::SynthesisSettings;
use domain::value_objects::VoiceId;
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Result of a synthesis operation
#[derive(Debug, Clone)]
pub struct SynthesizedAudio {
    /// Generated audio bytes
    pub audio: Vec<u8>,
    /// Duration of the audio in milliseconds (if known)
    pub duration_ms: Option<u64>,
}

/// Port for speech synthesis and voice cloning
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SynthesisPort: Send + Sync {
    /// Synthesize speech with the given voice and tuning
    async fn synthesize(
        &self,
        text: String,
        voice_id: VoiceId,
        settings: SynthesisSettings,
    ) -> Result<SynthesizedAudio, ApplicationError>;

    /// Create a provider-side voice clone from raw audio samples
    ///
    /// Returns the provider-assigned voice id.
    async fn clone_voice(
        &self,
        display_name: String,
        description: Option<String>,
        samples: Vec<Vec<u8>>,
    ) -> Result<VoiceId, ApplicationError>;
}
