//! Translation port - Interface for text translation

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Result of a translation operation
#[derive(Debug, Clone)]
pub struct TranslationResult {
    /// Text in the target language
    pub translated_text: String,
    /// Source language the translator settled on
    pub source_language: Option<String>,
    /// Confidence score (0.0 - 1.0)
    pub confidence: Option<f32>,
}

/// Port for translation
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TranslationPort: Send + Sync {
    /// Translate text into the target language
    async fn translate(
        &self,
        text: String,
        target_language: String,
        source_language: Option<String>,
    ) -> Result<TranslationResult, ApplicationError>;
}
