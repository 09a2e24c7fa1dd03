//! Analysis errors

use thiserror::Error;

/// Errors raised by the internal analysis stages
///
/// These never escape the extractor's public API; extraction degrades to
/// the zero fingerprint instead. The characteristics analyzer reports
/// uncomputable metrics as absent fields.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Not enough samples for even a single analysis frame
    #[error("Audio too short: {samples} samples, need at least {required}")]
    TooShort {
        /// Samples supplied
        samples: usize,
        /// Minimum required
        required: usize,
    },

    /// The FFT backend rejected the input
    #[error("Spectrum computation failed: {0}")]
    Spectrum(String),

    /// Sample rate of zero or similar nonsense
    #[error("Invalid sample rate: {0}")]
    InvalidSampleRate(u32),
}
