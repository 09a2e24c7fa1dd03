//! Recognition port - Interface for speech-to-text

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Result of a recognition operation
#[derive(Debug, Clone)]
pub struct RecognitionResult {
    /// Recognized text; may be empty for non-speech audio
    pub text: String,
    /// Detected language code (e.g., "en", "de")
    pub detected_language: Option<String>,
    /// Confidence score (0.0 - 1.0)
    pub confidence: Option<f32>,
}

/// Port for speech recognition
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RecognitionPort: Send + Sync {
    /// Recognize speech in a chunk of mono PCM samples
    ///
    /// An empty `text` in the result means the chunk contained no
    /// recognizable speech; that is not an error.
    async fn recognize(
        &self,
        samples: Vec<f32>,
        sample_rate: u32,
        language_hint: Option<String>,
    ) -> Result<RecognitionResult, ApplicationError>;
}
