//! Domain-level errors

use thiserror::Error;

/// Errors that can occur in the domain layer
#[derive(Debug, Error)]
pub enum DomainError {
    /// An identifier string did not match the expected shape
    #[error("Invalid identifier: {0}")]
    InvalidId(String),

    /// A fingerprint had the wrong dimension
    #[error("Invalid fingerprint dimension: expected {expected}, got {actual}")]
    InvalidDimension {
        /// Expected vector length
        expected: usize,
        /// Length that was supplied
        actual: usize,
    },

    /// A numeric field was outside its allowed range
    #[error("Value out of range for {field}: {value}")]
    OutOfRange {
        /// Name of the offending field
        field: &'static str,
        /// The rejected value
        value: f64,
    },
}
