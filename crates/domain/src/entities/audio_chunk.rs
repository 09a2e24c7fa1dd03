//! Audio chunk entity

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A short chunk of mono audio from a live conversation
///
/// Samples are float PCM in `[-1.0, 1.0]`. Chunks are the unit of work for
/// the whole pipeline: one chunk in, one processing response out.
#[derive(Debug, Clone)]
pub struct AudioChunk {
    /// Unique id for this chunk
    pub chunk_id: Uuid,
    /// Mono PCM samples
    pub samples: Vec<f32>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// When the chunk was captured
    pub captured_at: DateTime<Utc>,
}

impl AudioChunk {
    /// Create a chunk from samples captured now
    #[must_use]
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            chunk_id: Uuid::new_v4(),
            samples,
            sample_rate,
            captured_at: Utc::now(),
        }
    }

    /// Duration of the chunk in seconds
    #[must_use]
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / f64::from(self.sample_rate)
    }

    /// Whether the chunk carries no samples
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
