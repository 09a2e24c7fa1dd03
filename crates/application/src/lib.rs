//! Application layer - use cases and orchestration
//!
//! Holds the port definitions (interfaces to recognition, translation,
//! synthesis, and persistence) and the services implementing speaker
//! identity, voice continuity, actor continuity, and the per-chunk
//! dubbing pipeline.

pub mod error;
pub mod ports;
pub mod services;

pub use error::ApplicationError;
pub use ports::*;
pub use services::*;
