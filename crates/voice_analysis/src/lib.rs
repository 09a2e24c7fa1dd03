//! Voice analysis - acoustic fingerprinting and voice characteristics
//!
//! CPU-bound, dependency-light analysis of raw audio chunks:
//! - [`EmbeddingExtractor`] turns an arbitrary-length chunk into a
//!   fixed-length, L2-normalized [`domain::VoiceFingerprint`]
//! - [`CharacteristicsAnalyzer`] measures named scalar voice metrics
//!   (pitch, energy, spectral shape, speaking rate) for a chunk
//!
//! Both are pure functions of their inputs and safe to call concurrently.
//! Extraction never fails outward: degenerate input (silence, a handful of
//! samples, NaNs) produces the zero fingerprint, which matches nothing.

pub mod characteristics;
pub mod config;
pub mod error;
pub mod extractor;
mod pitch;
mod spectrum;

pub use characteristics::CharacteristicsAnalyzer;
pub use config::AnalysisConfig;
pub use error::AnalysisError;
pub use extractor::EmbeddingExtractor;
