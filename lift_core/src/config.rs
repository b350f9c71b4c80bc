//! Configuration file support for lift.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/lift/config.toml`.

use crate::{Error, ExerciseRecord, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub defaults: ExerciseDefaults,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_roster_path")]
    pub roster_path: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            roster_path: default_roster_path(),
        }
    }
}

/// Baseline used when a new exercise is added
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExerciseDefaults {
    #[serde(default = "default_base_sets")]
    pub base_sets: u32,

    #[serde(default = "default_base_reps")]
    pub base_reps: u32,

    #[serde(default = "crate::types::default_weight_increment")]
    pub weight_increment: f64,
}

impl Default for ExerciseDefaults {
    fn default() -> Self {
        Self {
            base_sets: default_base_sets(),
            base_reps: default_base_reps(),
            weight_increment: crate::types::default_weight_increment(),
        }
    }
}

impl ExerciseDefaults {
    /// Fresh record using these defaults
    pub fn new_record(&self) -> ExerciseRecord {
        ExerciseRecord::new(self.base_sets, self.base_reps, self.weight_increment)
    }
}

// Default value functions
fn default_roster_path() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        std::env::var_os("HOME")
            .map(|home| PathBuf::from(home).join(".local/share"))
            .unwrap_or_else(|| PathBuf::from("."))
    });
    base.join("lift").join("gym_roster.json")
}

fn default_base_sets() -> u32 {
    3
}

fn default_base_reps() -> u32 {
    8
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

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            std::env::var_os("HOME")
                .map(|home| PathBuf::from(home).join(".config"))
                .unwrap_or_else(|| PathBuf::from("."))
        });
        base.join("lift").join("config.toml")
    }

    /// Reject defaults that would produce invalid exercise records
    pub fn validate(&self) -> Result<()> {
        self.defaults
            .new_record()
            .validate()
            .map_err(|e| Error::Config(format!("invalid [defaults]: {}", e)))
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
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
