//! Configuration file support.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/workout/config.toml`.

use crate::{Error, Result, WeightUnit};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub units: UnitsConfig,

    #[serde(default)]
    pub summary: SummaryConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Session engine tuning
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionConfig {
    /// Sessions idle longer than this are eligible for cleanup
    #[serde(default = "default_stale_after_days")]
    pub stale_after_days: i64,

    /// Per-set estimate behind the time-remaining figure
    #[serde(default = "default_seconds_per_set")]
    pub seconds_per_set: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            stale_after_days: default_stale_after_days(),
            seconds_per_set: default_seconds_per_set(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct UnitsConfig {
    /// Unit volume and max-weight totals are reported in
    #[serde(default)]
    pub weight: WeightUnit,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SummaryConfig {
    #[serde(default = "default_top_exercises")]
    pub top_exercises: usize,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            top_exercises: default_top_exercises(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("workout")
}

fn default_stale_after_days() -> i64 {
    7
}

fn default_seconds_per_set() -> u32 {
    crate::progress::DEFAULT_SECONDS_PER_SET
}

fn default_top_exercises() -> usize {
    5
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.session.stale_after_days < 1 {
            return Err(Error::Config(format!(
                "session.stale_after_days must be at least 1, got {}",
                self.session.stale_after_days
            )));
        }
        if self.session.seconds_per_set == 0 {
            return Err(Error::Config("session.seconds_per_set must be positive".into()));
        }
        Ok(())
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("workout").join("config.toml")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}
