//! Autocorrelation pitch tracking

use crate::config::AnalysisConfig;

/// Pitch statistics over a chunk
///
/// All frequency fields are absent when no voiced frames were found.
#[derive(Debug, Clone, Copy, Default)]
pub struct PitchStats {
    /// Mean fundamental frequency over voiced frames (Hz)
    pub mean: Option<f64>,
    /// Standard deviation of the fundamental (Hz)
    pub std: Option<f64>,
    /// Peak-to-peak range of the fundamental (Hz)
    pub range: Option<f64>,
    /// Fraction of frames judged voiced
    pub voiced_ratio: f64,
    /// Mean normalized autocorrelation peak over voiced frames
    pub mean_peak: Option<f64>,
}

/// Track pitch over the chunk with frame-wise normalized autocorrelation
///
/// Frames whose autocorrelation peak in the configured lag range falls
/// below the voicing threshold (or that carry almost no energy) count as
/// unvoiced and contribute nothing to the frequency statistics.
pub fn track(samples: &[f32], sample_rate: u32, config: &AnalysisConfig) -> PitchStats {
    if sample_rate == 0 || config.pitch_fmin <= 0.0 || config.pitch_fmax <= config.pitch_fmin {
        return PitchStats::default();
    }

    let sr = f64::from(sample_rate);
    let min_lag = (sr / config.pitch_fmax).floor().max(2.0) as usize;
    let max_lag = (sr / config.pitch_fmin).ceil() as usize;

    // Pitch frames need to span at least two full periods of the lowest
    // trackable frequency.
    let frame_len = (2 * max_lag).max(config.frame_size);
    let hop = frame_len / 2;
    if samples.len() < frame_len {
        return PitchStats::default();
    }

    let mut frequencies = Vec::new();
    let mut peaks = Vec::new();
    let mut total_frames = 0usize;

    let mut start = 0;
    while start + frame_len <= samples.len() {
        let frame = &samples[start..start + frame_len];
        total_frames += 1;

        if let Some((lag, peak)) = best_lag(frame, min_lag, max_lag)
            && peak >= config.voicing_threshold
        {
            frequencies.push(sr / lag as f64);
            peaks.push(peak);
        }

        start += hop;
    }

    if frequencies.is_empty() {
        return PitchStats {
            voiced_ratio: 0.0,
            ..PitchStats::default()
        };
    }

    let n = frequencies.len() as f64;
    let mean = frequencies.iter().sum::<f64>() / n;
    let variance = frequencies.iter().map(|f| (f - mean).powi(2)).sum::<f64>() / n;
    let min = frequencies.iter().copied().fold(f64::INFINITY, f64::min);
    let max = frequencies.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    PitchStats {
        mean: Some(mean),
        std: Some(variance.sqrt()),
        range: Some(max - min),
        voiced_ratio: frequencies.len() as f64 / total_frames.max(1) as f64,
        mean_peak: Some(peaks.iter().sum::<f64>() / n),
    }
}

/// Best normalized autocorrelation lag within `[min_lag, max_lag]`
fn best_lag(frame: &[f32], min_lag: usize, max_lag: usize) -> Option<(usize, f64)> {
    let max_lag = max_lag.min(frame.len().saturating_sub(1));
    if min_lag >= max_lag {
        return None;
    }

    let energy: f64 = frame.iter().map(|&s| f64::from(s) * f64::from(s)).sum();
    if energy < 1e-9 {
        return None;
    }

    let mut best: Option<(usize, f64)> = None;
    for lag in min_lag..=max_lag {
        let mut num = 0.0f64;
        let mut e1 = 0.0f64;
        let mut e2 = 0.0f64;
        for i in 0..frame.len() - lag {
            let a = f64::from(frame[i]);
            let b = f64::from(frame[i + lag]);
            num += a * b;
            e1 += a * a;
            e2 += b * b;
        }
        let denom = (e1 * e2).sqrt();
        if denom < 1e-12 {
            continue;
        }
        let r = num / denom;
        if best.is_none_or(|(_, peak)| r > peak) {
            best = Some((lag, r));
        }
    }
    best
}
