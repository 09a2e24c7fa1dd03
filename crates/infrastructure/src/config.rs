//! Application configuration

use std::path::PathBuf;

use application::{DirectoryConfig, PipelineConfig, RegistryConfig, VoiceBankConfig};
use serde::{Deserialize, Serialize};
use voice_analysis::AnalysisConfig;

use crate::telemetry::TelemetryConfig;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Speaker matching configuration
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Fingerprint extraction and characteristics analysis configuration
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Voice bank configuration
    #[serde(default)]
    pub voice_bank: VoiceBankConfig,

    /// Actor resolution configuration
    #[serde(default)]
    pub directory: DirectoryConfig,

    /// Pipeline orchestration configuration
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// On-disk storage layout
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging configuration
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// On-disk storage layout
///
/// Everything lives under a single data directory so a deployment can be
/// backed up or wiped as one unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory for all persisted state
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl StorageConfig {
    /// Directory holding the per-speaker profile files
    #[must_use]
    pub fn speakers_dir(&self) -> PathBuf {
        self.data_dir.join("speakers")
    }

    /// Path of the voice library document
    #[must_use]
    pub fn voice_library_path(&self) -> PathBuf {
        self.data_dir.join("voice_library.json")
    }

    /// Path of the actor directory document
    #[must_use]
    pub fn actor_directory_path(&self) -> PathBuf {
        self.data_dir.join("actors.json")
    }
}

impl AppConfig {
    /// Load configuration from environment and optional file
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            // Load from file if exists
            .add_source(config::File::with_name("config").required(false))
            // Override with environment variables (e.g., REDUB_PIPELINE_PORT_TIMEOUT_SECS)
            .add_source(
                config::Environment::with_prefix("REDUB")
                    .separator("_")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }
}
