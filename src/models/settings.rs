//! Statistics configuration, loaded from TOML.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unable to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid configuration {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

fn default_db_path() -> PathBuf {
    PathBuf::from("main.db")
}
fn default_api_base_url() -> String {
    "https://api.quavergame.com".to_string()
}
fn default_request_timeout_ms() -> u64 {
    5000
}
fn default_projection_interval_ms() -> f64 {
    crate::display::DEFAULT_PROJECTION_INTERVAL_MS
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OnlineConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Upper bound for one remote statistics request.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl OnlineConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for OnlineConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DisplayConfig {
    /// Minimum time between two recomputations of a HUD readout.
    #[serde(default = "default_projection_interval_ms")]
    pub projection_interval_ms: f64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            projection_interval_ms: default_projection_interval_ms(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StatsConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub online: OnlineConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

impl StatsConfig {
    /// Loads the configuration, falling back to defaults when the file is missing.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::info!("CONFIG: {:?} not found, using defaults", path);
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|source| {
            log::error!("Failed to parse TOML file {:?}: {}", path, source);
            ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }
        })
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}
