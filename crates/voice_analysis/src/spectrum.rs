//! Frame-based magnitude spectra

use std::sync::Arc;

use realfft::{RealFftPlanner, RealToComplex};

use crate::error::AnalysisError;

/// Computes windowed magnitude spectra for fixed-size frames
///
/// The FFT plan and window are built once at construction; per-call scratch
/// buffers are local, so one analyzer can be shared across threads.
pub struct SpectrumAnalyzer {
    fft: Arc<dyn RealToComplex<f32>>,
    window: Vec<f32>,
    frame_size: usize,
}

impl std::fmt::Debug for SpectrumAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpectrumAnalyzer")
            .field("frame_size", &self.frame_size)
            .finish_non_exhaustive()
    }
}

impl SpectrumAnalyzer {
    /// Build an analyzer for the given frame size
    #[must_use]
    pub fn new(frame_size: usize) -> Self {
        let mut planner = RealFftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(frame_size);
        Self {
            fft,
            window: hann_window(frame_size),
            frame_size,
        }
    }

    /// Number of spectrum bins produced per frame
    #[must_use]
    pub fn num_bins(&self) -> usize {
        self.frame_size / 2 + 1
    }

    /// Magnitude spectrum of one frame
    ///
    /// The frame must be exactly `frame_size` samples.
    pub fn magnitudes(&self, frame: &[f32]) -> Result<Vec<f32>, AnalysisError> {
        if frame.len() != self.frame_size {
            return Err(AnalysisError::TooShort {
                samples: frame.len(),
                required: self.frame_size,
            });
        }

        let mut input: Vec<f32> = frame
            .iter()
            .zip(self.window.iter())
            .map(|(s, w)| s * w)
            .collect();
        let mut output = self.fft.make_output_vec();
        self.fft
            .process(&mut input, &mut output)
            .map_err(|e| AnalysisError::Spectrum(e.to_string()))?;

        Ok(output
            .iter()
            .copied()
            .map(realfft::num_complex::Complex::norm)
            .collect())
    }
}

/// Iterate full frames of `frame_size` samples with the given hop
pub fn frames(samples: &[f32], frame_size: usize, hop_size: usize) -> impl Iterator<Item = &[f32]> {
    let hop = hop_size.max(1);
    (0..)
        .map(move |i| i * hop)
        .take_while(move |start| start + frame_size <= samples.len())
        .map(move |start| &samples[start..start + frame_size])
}

fn hann_window(len: usize) -> Vec<f32> {
    if len <= 1 {
        return vec![1.0; len];
    }
    (0..len)
        .map(|i| {
            let phase = std::f32::consts::TAU * i as f32 / (len - 1) as f32;
            0.5 * (1.0 - phase.cos())
        })
        .collect()
}
