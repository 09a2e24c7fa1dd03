//! Voice fingerprint - fixed-length normalized embedding of a voice

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Dimension of every voice fingerprint
pub const EMBEDDING_DIM: usize = 256;

/// Epsilon added to norms to avoid division by zero
const NORM_EPSILON: f32 = 1e-8;

/// A fixed-length, L2-normalized voice embedding
///
/// Produced once per audio chunk by the embedding extractor and treated as
/// an immutable value. The all-zero vector is a valid, maximally-dissimilar
/// fallback used when extraction fails; its similarity against anything is
/// zero, so it can never cross a positive match threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceFingerprint(Vec<f32>);

impl VoiceFingerprint {
    /// Create a fingerprint from raw components, normalizing to unit length
    ///
    /// Input shorter than [`EMBEDDING_DIM`] is zero-padded; longer input is
    /// truncated. The all-zero input stays all-zero.
    #[must_use]
    pub fn from_raw(mut components: Vec<f32>) -> Self {
        components.resize(EMBEDDING_DIM, 0.0);
        let norm = l2_norm(&components);
        for c in &mut components {
            *c /= norm + NORM_EPSILON;
        }
        Self(components)
    }

    /// Create a fingerprint from an already-normalized vector
    ///
    /// Used when loading persisted profiles. Fails if the dimension is
    /// wrong. The values are taken as-is; callers that blend vectors go
    /// through [`Self::blend`], which re-normalizes.
    pub fn from_normalized(components: Vec<f32>) -> Result<Self, DomainError> {
        if components.len() == EMBEDDING_DIM {
            Ok(Self(components))
        } else {
            Err(DomainError::InvalidDimension {
                expected: EMBEDDING_DIM,
                actual: components.len(),
            })
        }
    }

    /// The zero fingerprint: valid and maximally dissimilar to everything
    #[must_use]
    pub fn zero() -> Self {
        Self(vec![0.0; EMBEDDING_DIM])
    }

    /// Whether this is the zero fallback fingerprint
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&c| c == 0.0)
    }

    /// Cosine similarity against another fingerprint
    ///
    /// Both vectors are unit length, so the plain dot product suffices.
    #[must_use]
    pub fn similarity(&self, other: &Self) -> f32 {
        self.0.iter().zip(other.0.iter()).map(|(a, b)| a * b).sum()
    }

    /// L2 norm of the vector (≈ 1 for any non-zero fingerprint)
    #[must_use]
    pub fn norm(&self) -> f32 {
        l2_norm(&self.0)
    }

    /// Blend with a newer observation using the given learning rate
    ///
    /// Computes `(1 - alpha) * self + alpha * other` and re-normalizes.
    #[must_use]
    pub fn blend(&self, other: &Self, alpha: f32) -> Self {
        let mixed = self
            .0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (1.0 - alpha) * a + alpha * b)
            .collect();
        Self::from_raw(mixed)
    }

    /// The raw components
    #[must_use]
    pub fn components(&self) -> &[f32] {
        &self.0
    }
}

fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|&c| c * c).sum::<f32>().sqrt()
}
