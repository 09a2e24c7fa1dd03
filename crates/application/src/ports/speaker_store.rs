//! Speaker store port - persistence for speaker profiles

use async_trait::async_trait;
use domain::entities::SpeakerProfile;
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for speaker profile persistence
///
/// One record per speaker. The registry writes through on every profile
/// change and treats store failures as non-fatal.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SpeakerStore: Send + Sync {
    /// Load every persisted speaker profile
    async fn load_all(&self) -> Result<Vec<SpeakerProfile>, ApplicationError>;

    /// Persist one speaker profile, overwriting any previous record
    async fn save(&self, profile: SpeakerProfile) -> Result<(), ApplicationError>;
}
