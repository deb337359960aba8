//! Daemon configuration.
//!
//! The configuration is loaded from `$XDG_CONFIG_HOME/spaceswitch/config.json`.
//! Every section is optional so new sections can be added later without
//! breaking existing files.
//!
//! # Example
//!
//! ```json
//! {
//!   "polling": { "tick_ms": 500, "follow_up_ms": 300 },
//!   "names": { "namespace": "SpaceNames" }
//! }
//! ```

use crate::names::DEFAULT_NAMESPACE;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Top-level configuration.
///
/// A minimal `{}` file is valid and all sections fall back to their
/// compiled-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Refresh cadence.
    #[serde(default)]
    pub polling: PollingConfig,

    /// Label storage settings.
    #[serde(default)]
    pub names: NamesConfig,
}

/// Refresh cadence.  All durations are in **milliseconds**.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Interval between two periodic refreshes.
    pub tick_ms: u64,
    /// Delay between issuing an activation and the one-shot follow-up
    /// refresh that picks up the new active space.  `0` refreshes on the
    /// next loop iteration.
    pub follow_up_ms: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            tick_ms: 500,
            follow_up_ms: 300,
        }
    }
}

impl PollingConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }

    pub fn follow_up(&self) -> Duration {
        Duration::from_millis(self.follow_up_ms)
    }
}

/// Label storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NamesConfig {
    /// Namespace inside the key/value store that holds the labels.
    pub namespace: String,
}

impl Default for NamesConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| ConfigError(format!("failed to parse {}: {}", path.display(), e)))?;
        Ok(config)
    }
}

/// Error from loading or parsing a configuration file.
#[derive(Debug, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(String);
