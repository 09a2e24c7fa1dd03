//! Voice fingerprint extraction

use domain::VoiceFingerprint;
use tracing::debug;

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::pitch;
use crate::spectrum::{SpectrumAnalyzer, frames};

const LOG_FLOOR: f64 = 1e-10;

/// Extracts fixed-length voice fingerprints from raw audio
///
/// The signature mixes three feature families into one vector:
/// - timbre: per-band log-energy statistics (mean, spread, frame-to-frame
///   motion) plus spectral centroid and flatness summaries
/// - register: pitch mean/spread and voiced ratio
/// - loudness pattern: overall energy statistics
///
/// The raw vector is padded or truncated to the fingerprint dimension and
/// L2-normalized. Any internal failure degrades to the zero fingerprint.
#[derive(Debug)]
pub struct EmbeddingExtractor {
    config: AnalysisConfig,
    spectrum: SpectrumAnalyzer,
}

impl EmbeddingExtractor {
    /// Build an extractor with the given configuration
    #[must_use]
    pub fn new(config: AnalysisConfig) -> Self {
        let spectrum = SpectrumAnalyzer::new(config.frame_size);
        Self { config, spectrum }
    }

    /// Extract a fingerprint from one audio chunk
    ///
    /// Never fails: silent, very short, or otherwise degenerate input
    /// yields the zero fingerprint.
    #[must_use]
    pub fn extract(&self, samples: &[f32], sample_rate: u32) -> VoiceFingerprint {
        match self.try_extract(samples, sample_rate) {
            Ok(fingerprint) => fingerprint,
            Err(e) => {
                debug!(error = %e, "fingerprint extraction degraded to zero vector");
                VoiceFingerprint::zero()
            },
        }
    }

    fn try_extract(
        &self,
        samples: &[f32],
        sample_rate: u32,
    ) -> Result<VoiceFingerprint, AnalysisError> {
        if sample_rate == 0 {
            return Err(AnalysisError::InvalidSampleRate(sample_rate));
        }
        if samples.len() < self.config.frame_size {
            return Err(AnalysisError::TooShort {
                samples: samples.len(),
                required: self.config.frame_size,
            });
        }

        // Non-finite samples would poison every statistic downstream.
        let cleaned: Vec<f32> = samples
            .iter()
            .map(|&s| if s.is_finite() { s } else { 0.0 })
            .collect();

        // Silence carries no speaker identity; short-circuit before the
        // floor-dominated energy features fabricate one.
        let peak = cleaned.iter().fold(0.0f32, |acc, &s| acc.max(s.abs()));
        if peak < 1e-6 {
            return Ok(VoiceFingerprint::zero());
        }

        let bands = self.band_log_energies(&cleaned)?;
        if bands.is_empty() {
            return Err(AnalysisError::TooShort {
                samples: cleaned.len(),
                required: self.config.frame_size,
            });
        }

        let num_bands = self.config.num_bands;
        let mut raw = Vec::with_capacity(num_bands * 3 + 16);

        // Per-band mean log energy, centered across bands so the silent-band
        // baseline common to all voices cancels out of the dot product.
        let band_means: Vec<f64> = (0..num_bands)
            .map(|b| bands.iter().map(|frame| frame[b]).sum::<f64>() / bands.len() as f64)
            .collect();
        let center = band_means.iter().sum::<f64>() / num_bands as f64;
        raw.extend(band_means.iter().map(|m| (m - center) as f32));

        // Per-band spread
        for b in 0..num_bands {
            let mean = band_means[b];
            let var = bands
                .iter()
                .map(|frame| (frame[b] - mean).powi(2))
                .sum::<f64>()
                / bands.len() as f64;
            raw.push(var.sqrt() as f32);
        }

        // Per-band mean absolute frame delta (spectral motion)
        for b in 0..num_bands {
            let delta = bands
                .windows(2)
                .map(|pair| (pair[1][b] - pair[0][b]).abs())
                .sum::<f64>()
                / (bands.len() - 1).max(1) as f64;
            raw.push(delta as f32);
        }

        // Spectral shape summaries
        let (centroid_mean, centroid_std, flatness_mean, flatness_std) =
            self.spectral_summaries(&cleaned)?;
        raw.push(centroid_mean as f32);
        raw.push(centroid_std as f32);
        raw.push(flatness_mean as f32);
        raw.push(flatness_std as f32);

        // Register
        let pitch = pitch::track(&cleaned, sample_rate, &self.config);
        raw.push(pitch.mean.map_or(0.0, |m| (m / 500.0) as f32));
        raw.push(pitch.std.map_or(0.0, |s| (s / 100.0) as f32));
        raw.push(pitch.voiced_ratio as f32);

        // Loudness pattern
        let frame_energies: Vec<f64> = frames(&cleaned, self.config.frame_size, self.config.hop_size)
            .map(|frame| {
                frame.iter().map(|&s| f64::from(s) * f64::from(s)).sum::<f64>()
                    / frame.len() as f64
            })
            .collect();
        let energy_mean = frame_energies.iter().sum::<f64>() / frame_energies.len() as f64;
        let energy_var = frame_energies
            .iter()
            .map(|e| (e - energy_mean).powi(2))
            .sum::<f64>()
            / frame_energies.len() as f64;
        raw.push((energy_mean + LOG_FLOOR).ln() as f32 / 10.0);
        raw.push((energy_var.sqrt() + LOG_FLOOR).ln() as f32 / 10.0);

        Ok(VoiceFingerprint::from_raw(raw))
    }

    /// Log energy per band per frame
    fn band_log_energies(&self, samples: &[f32]) -> Result<Vec<Vec<f64>>, AnalysisError> {
        let num_bands = self.config.num_bands;
        let bins = self.spectrum.num_bins();
        let bins_per_band = (bins / num_bands).max(1);

        let mut result = Vec::new();
        for frame in frames(samples, self.config.frame_size, self.config.hop_size) {
            let mags = self.spectrum.magnitudes(frame)?;
            let mut bands = Vec::with_capacity(num_bands);
            for b in 0..num_bands {
                let start = b * bins_per_band;
                let end = if b == num_bands - 1 {
                    bins
                } else {
                    (start + bins_per_band).min(bins)
                };
                let energy: f64 = mags[start..end]
                    .iter()
                    .map(|&m| f64::from(m) * f64::from(m))
                    .sum();
                bands.push((energy + LOG_FLOOR).ln());
            }
            result.push(bands);
        }
        Ok(result)
    }

    /// Mean/std of spectral centroid (normalized to Nyquist) and flatness
    fn spectral_summaries(&self, samples: &[f32]) -> Result<(f64, f64, f64, f64), AnalysisError> {
        let bins = self.spectrum.num_bins();
        let mut centroids = Vec::new();
        let mut flatnesses = Vec::new();

        for frame in frames(samples, self.config.frame_size, self.config.hop_size) {
            let mags = self.spectrum.magnitudes(frame)?;

            let total: f64 = mags.iter().map(|&m| f64::from(m)).sum();
            if total > 1e-9 {
                let weighted: f64 = mags
                    .iter()
                    .enumerate()
                    .map(|(i, &m)| i as f64 * f64::from(m))
                    .sum();
                centroids.push(weighted / total / bins as f64);

                let log_sum: f64 = mags.iter().map(|&m| (f64::from(m) + LOG_FLOOR).ln()).sum();
                let geometric = (log_sum / mags.len() as f64).exp();
                let arithmetic = total / mags.len() as f64;
                flatnesses.push(geometric / (arithmetic + LOG_FLOOR));
            }
        }

        Ok((
            mean(&centroids),
            std_dev(&centroids),
            mean(&flatnesses),
            std_dev(&flatnesses),
        ))
    }
}

impl Default for EmbeddingExtractor {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    (values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64).sqrt()
}
