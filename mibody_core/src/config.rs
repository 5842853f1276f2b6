//! Configuration file support for mibody.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/mibody/config.toml`.

use crate::collection::DEFAULT_MAX_INPUT_BYTES;
use crate::export::ExportOptions;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub input: InputConfig,

    #[serde(default)]
    pub export: ExportConfig,
}

/// Where and how much to read
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InputConfig {
    #[serde(default = "default_input_path")]
    pub path: PathBuf,

    #[serde(default = "default_max_input_bytes")]
    pub max_input_bytes: u64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: default_input_path(),
            max_input_bytes: default_max_input_bytes(),
        }
    }
}

/// Default export selections, kept as text until validated
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_format")]
    pub format: String,

    #[serde(default = "default_height_unit")]
    pub height_unit: String,

    #[serde(default = "default_weight_unit")]
    pub weight_unit: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            height_unit: default_height_unit(),
            weight_unit: default_weight_unit(),
        }
    }
}

// Default value functions
fn default_input_path() -> PathBuf {
    PathBuf::from("BODYDATA.TXT")
}

fn default_max_input_bytes() -> u64 {
    DEFAULT_MAX_INPUT_BYTES
}

fn default_format() -> String {
    "json".into()
}

fn default_height_unit() -> String {
    "cm".into()
}

fn default_weight_unit() -> String {
    "kg".into()
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        match Self::default_config_path() {
            Some(config_path) if config_path.exists() => Self::load_from(&config_path),
            config_path => {
                tracing::info!(
                    "No config file found at {:?}, using defaults",
                    config_path
                );
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|base| base.join("mibody").join("config.toml"))
    }

    /// Save the configuration to a specific path
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

    /// Validate the export section
    pub fn export_options(&self) -> Result<ExportOptions> {
        ExportOptions::parse(
            &self.export.format,
            &self.export.height_unit,
            &self.export.weight_unit,
        )
    }
}
