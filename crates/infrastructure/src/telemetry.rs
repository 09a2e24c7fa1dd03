//! Tracing initialization
//!
//! Console logging through `tracing-subscriber`, either human-readable or
//! JSON for log shippers. The filter comes from `RUST_LOG` when set,
//! otherwise from the configured level.

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Default log level when `RUST_LOG` is not set (e.g., "info",
    /// "application=debug,info")
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit structured JSON lines instead of human-readable output
    #[serde(default)]
    pub json_logs: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logs: false,
        }
    }
}

/// Install the global tracing subscriber
///
/// Safe to call more than once; later calls are no-ops, which keeps tests
/// that each set up logging from panicking.
pub fn init_tracing(config: &TelemetryConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    // A subscriber installed by the embedding binary wins
    let _ = if config.json_logs {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}
