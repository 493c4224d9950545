//! Configuration file support.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/vet-anesthesia/config.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calculator::CalcError;
use crate::models::InfusionSettings;

const APP_DIR: &str = "vet-anesthesia";

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid config: {0}")]
    Invalid(#[from] CalcError),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Defaults applied to new infusion configurations
    #[serde(default)]
    pub infusion: InfusionSettings,

    #[serde(default)]
    pub prescription: PrescriptionConfig,
}

/// Record store location
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

/// Where prescriptions are written
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PrescriptionConfig {
    #[serde(default = "default_prescription_dir")]
    pub output_dir: PathBuf,
}

impl Default for PrescriptionConfig {
    fn default() -> Self {
        Self {
            output_dir: default_prescription_dir(),
        }
    }
}

fn data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

fn default_database_path() -> PathBuf {
    data_dir().join("anesthesia.db")
}

fn default_prescription_dir() -> PathBuf {
    data_dir().join("prescriptions")
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join("config.toml")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    pub fn validate(&self) -> ConfigResult<()> {
        self.infusion.validate()?;
        Ok(())
    }
}
