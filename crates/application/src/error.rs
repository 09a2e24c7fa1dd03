//! Application-level errors

use domain::DomainError;
use thiserror::Error;

/// Errors that can occur in the application layer
///
/// The pipeline orchestrator converts all of these into `Failed`
/// responses; they never escape a chunk.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Domain-level error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// External service error (recognition, translation, synthesis)
    #[error("External service error: {0}")]
    ExternalService(String),

    /// An external call exceeded the configured deadline
    #[error("Timed out waiting for {0}")]
    Timeout(String),

    /// Persistence adapter error
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Caller-supplied input was unusable
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// Check if retrying the same call could plausibly succeed
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::ExternalService(_) | Self::Timeout(_))
    }
}
