//! Analysis configuration

use serde::{Deserialize, Serialize};

/// Configuration for fingerprint extraction and characteristics analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Analysis frame length in samples
    pub frame_size: usize,
    /// Hop between successive frames in samples
    pub hop_size: usize,
    /// Number of log-energy bands summarized per frame
    pub num_bands: usize,
    /// Lowest fundamental frequency considered by the pitch tracker (Hz)
    pub pitch_fmin: f64,
    /// Highest fundamental frequency considered by the pitch tracker (Hz)
    pub pitch_fmax: f64,
    /// Autocorrelation peak below which a frame counts as unvoiced
    pub voicing_threshold: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            frame_size: 512,
            hop_size: 256,
            num_bands: 32,
            // Speech register; roughly C2 up to soprano territory
            pitch_fmin: 65.0,
            pitch_fmax: 450.0,
            voicing_threshold: 0.3,
        }
    }
}
