//! Configuration file support for Promille.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/promille/config.toml`.

use crate::catalog::{build_default_catalog, Catalog};
use crate::drink::Drink;
use crate::units::Unit;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// Session storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_session_dir")]
    pub dir: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            dir: default_session_dir(),
        }
    }
}

/// A preset drink declared in the config file
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PresetDrink {
    pub name: String,
    pub volume: f64,
    pub unit: String,
    pub alcohol: f64,
}

/// Extra catalog presets configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct CatalogConfig {
    #[serde(default)]
    pub custom: Vec<PresetDrink>,
}

fn default_session_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        let home = std::env::var("HOME").expect("HOME environment variable not set");
        PathBuf::from(home).join(".local/share")
    });
    base.join("promille").join("sessions")
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
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
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            let home = std::env::var("HOME").expect("HOME environment variable not set");
            PathBuf::from(home).join(".config")
        });
        base.join("promille").join("config.toml")
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

    /// Build the drink catalog: default presets plus configured extras
    ///
    /// Configured presets go through full drink validation; a bad entry is
    /// a configuration error, not a silent skip.
    pub fn catalog(&self) -> Result<Catalog> {
        let mut catalog = build_default_catalog();
        for preset in &self.catalog.custom {
            let unit = Unit::from_str(&preset.unit)?;
            let drink = Drink::new(&preset.name, preset.volume, unit, preset.alcohol)
                .map_err(|e| Error::Config(format!("Invalid preset '{}': {}", preset.name, e)))?;
            catalog.push(drink);
        }
        Ok(catalog)
    }
}
