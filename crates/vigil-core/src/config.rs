//! Configuration module for Vigil.
//!
//! Provides typed configuration structs that map to the YAML configuration
//! file, with loading, validation, and defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level configuration for Vigil.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub monitor: MonitorConfig,
}

/// Rate-limiting settings for the monitor core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Minimum spacing in milliseconds between two delivered `Changed`
    /// events for the same path.
    pub rate_limit_ms: u64,
    /// Quiet period in milliseconds after the last `Changed` event
    /// before a synthesized `ChangesDoneHint` fires.
    pub changes_done_delay_ms: u64,
}

/// Default rate-limit window.
const DEFAULT_RATE_LIMIT_MS: u64 = 800;
/// Default changes-done quiet period.
const DEFAULT_CHANGES_DONE_DELAY_MS: u64 = 2000;

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            rate_limit_ms: DEFAULT_RATE_LIMIT_MS,
            changes_done_delay_ms: DEFAULT_CHANGES_DONE_DELAY_MS,
        }
    }
}

impl MonitorConfig {
    /// The rate-limit window as a `Duration`.
    #[must_use]
    pub fn rate_limit(&self) -> Duration {
        Duration::from_millis(self.rate_limit_ms)
    }

    /// The changes-done quiet period as a `Duration`.
    #[must_use]
    pub fn changes_done_delay(&self) -> Duration {
        Duration::from_millis(self.changes_done_delay_ms)
    }
}

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/vigil/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("vigil")
            .join("config.yaml")
    }

    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid. A zero rate
    /// limit is legal (it disables debouncing entirely); a zero
    /// changes-done delay is not, because the hint would race the
    /// `Changed` it follows.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.monitor.changes_done_delay_ms == 0 {
            errors.push(ValidationError {
                field: "monitor.changes_done_delay_ms".into(),
                message: "must be greater than 0".into(),
            });
        }

        errors
    }
}

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"monitor.rate_limit_ms"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}
