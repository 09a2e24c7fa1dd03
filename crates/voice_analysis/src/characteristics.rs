//! Scalar voice characteristics

use domain::VoiceCharacteristics;

use crate::config::AnalysisConfig;
use crate::pitch;
use crate::spectrum::{SpectrumAnalyzer, frames};

/// Rolloff point: frequency below which this fraction of energy lies
const ROLLOFF_FRACTION: f64 = 0.85;

/// Minimum frame energy for onset counting, relative to the mean
const ONSET_RATIO: f64 = 1.5;

/// Computes named scalar metrics describing a voice
///
/// Unlike the fingerprint, these values are meant for humans and for the
/// synthesis-settings heuristics: pitch in Hz, frequencies in Hz, ratios
/// in [0, 1]. Metrics that cannot be computed are absent.
#[derive(Debug)]
pub struct CharacteristicsAnalyzer {
    config: AnalysisConfig,
    spectrum: SpectrumAnalyzer,
}

impl CharacteristicsAnalyzer {
    #[must_use]
    pub fn new(config: AnalysisConfig) -> Self {
        let spectrum = SpectrumAnalyzer::new(config.frame_size);
        Self { config, spectrum }
    }

    /// Analyze one chunk of audio
    ///
    /// Degenerate input (empty, silent, zero sample rate) yields a struct
    /// with every field absent.
    #[must_use]
    pub fn analyze(&self, samples: &[f32], sample_rate: u32) -> VoiceCharacteristics {
        if sample_rate == 0 || samples.is_empty() {
            return VoiceCharacteristics::default();
        }

        let cleaned: Vec<f32> = samples
            .iter()
            .map(|&s| if s.is_finite() { s } else { 0.0 })
            .collect();

        let mut out = VoiceCharacteristics::default();

        let energy = cleaned
            .iter()
            .map(|&s| f64::from(s) * f64::from(s))
            .sum::<f64>()
            / cleaned.len() as f64;
        out.energy = Some(energy);
        out.rms = Some(energy.sqrt());

        if energy < 1e-12 {
            return out;
        }

        let stats = pitch::track(&cleaned, sample_rate, &self.config);
        out.pitch_mean = stats.mean;
        out.pitch_std = stats.std;
        out.pitch_range = stats.range;
        out.harmonics_noise_ratio = stats.mean_peak.map(harmonics_noise_ratio);
        out.gender_likelihood = Some(gender_likelihood(stats.mean));

        self.spectral_metrics(&cleaned, sample_rate, &mut out);
        out.speaking_rate = self.speaking_rate(&cleaned, sample_rate);
        out.clarity = Some(clarity(&cleaned));

        out
    }

    /// Mean centroid, bandwidth, and rolloff in Hz over voiced-enough frames
    fn spectral_metrics(&self, samples: &[f32], sample_rate: u32, out: &mut VoiceCharacteristics) {
        let bin_hz = f64::from(sample_rate) / self.config.frame_size as f64;
        let mut centroids = Vec::new();
        let mut bandwidths = Vec::new();
        let mut rolloffs = Vec::new();

        for frame in frames(samples, self.config.frame_size, self.config.hop_size) {
            let Ok(mags) = self.spectrum.magnitudes(frame) else {
                continue;
            };
            let total: f64 = mags.iter().map(|&m| f64::from(m)).sum();
            if total < 1e-9 {
                continue;
            }

            let centroid = mags
                .iter()
                .enumerate()
                .map(|(i, &m)| i as f64 * bin_hz * f64::from(m))
                .sum::<f64>()
                / total;
            centroids.push(centroid);

            let variance = mags
                .iter()
                .enumerate()
                .map(|(i, &m)| (i as f64 * bin_hz - centroid).powi(2) * f64::from(m))
                .sum::<f64>()
                / total;
            bandwidths.push(variance.sqrt());

            let energy_total: f64 = mags.iter().map(|&m| f64::from(m) * f64::from(m)).sum();
            let target = energy_total * ROLLOFF_FRACTION;
            let mut cumulative = 0.0;
            let mut rolloff_bin = mags.len() - 1;
            for (i, &m) in mags.iter().enumerate() {
                cumulative += f64::from(m) * f64::from(m);
                if cumulative >= target {
                    rolloff_bin = i;
                    break;
                }
            }
            rolloffs.push(rolloff_bin as f64 * bin_hz);
        }

        if !centroids.is_empty() {
            out.spectral_centroid = Some(mean(&centroids));
            out.spectral_bandwidth = Some(mean(&bandwidths));
            out.spectral_rolloff = Some(mean(&rolloffs));
        }
    }

    /// Energy-onset count per second, a crude speaking-rate proxy
    fn speaking_rate(&self, samples: &[f32], sample_rate: u32) -> Option<f64> {
        let frame_energies: Vec<f64> =
            frames(samples, self.config.frame_size, self.config.hop_size)
                .map(|frame| {
                    frame.iter().map(|&s| f64::from(s) * f64::from(s)).sum::<f64>()
                        / frame.len() as f64
                })
                .collect();
        if frame_energies.len() < 2 {
            return None;
        }

        let threshold = mean(&frame_energies) * ONSET_RATIO;
        let onsets = frame_energies
            .windows(2)
            .filter(|pair| pair[0] < threshold && pair[1] >= threshold)
            .count();

        let duration = samples.len() as f64 / f64::from(sample_rate);
        Some(onsets as f64 / duration)
    }
}

impl Default for CharacteristicsAnalyzer {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}

/// Harmonic-to-noise ratio approximated from the autocorrelation peak
///
/// A peak of r means roughly r of the energy repeats at the pitch period,
/// so the harmonic/noise energy ratio is r / (1 - r), clamped to avoid
/// blowing up on near-perfect periodicity.
fn harmonics_noise_ratio(peak: f64) -> f64 {
    let r = peak.clamp(0.0, 0.999);
    r / (1.0 - r)
}

/// Clarity proxy from the zero-crossing rate
///
/// Noisy or whispered audio crosses zero far more often than voiced
/// speech; map the rate into [0, 1] with 1.0 meaning clean voicing.
fn clarity(samples: &[f32]) -> f64 {
    if samples.len() < 2 {
        return 0.0;
    }
    let crossings = samples
        .windows(2)
        .filter(|pair| (pair[0] >= 0.0) != (pair[1] >= 0.0))
        .count();
    let zcr = crossings as f64 / (samples.len() - 1) as f64;
    1.0 - (zcr * 10.0).min(1.0)
}

/// Map mean pitch to a gender-likelihood score
///
/// 0.0 is a deep male register, 1.0 a high female register, with linear
/// ramps through the typical ranges. Unvoiced audio sits at 0.5.
fn gender_likelihood(pitch_mean: Option<f64>) -> f64 {
    let Some(pitch) = pitch_mean else {
        return 0.5;
    };
    if pitch <= 0.0 {
        0.5
    } else if pitch < 85.0 {
        0.0
    } else if pitch < 165.0 {
        (pitch - 85.0) / (165.0 - 85.0) * 0.5
    } else if pitch < 255.0 {
        0.5 + (pitch - 165.0) / (255.0 - 165.0) * 0.5
    } else {
        1.0
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}
