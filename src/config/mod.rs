//! Configuration management for jirakit.
//!
//! This module handles loading, saving, and validating the TOML
//! configuration file that holds connection profiles and tuning for search
//! pagination, bulk job polling, and the transport's resilience policy.

mod profile;
mod settings;

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

pub use profile::Profile;
pub use settings::{BulkSettings, ResilienceSettings, SearchSettings, Settings};

/// Environment variable that overrides the configuration file location.
pub const CONFIG_ENV_VAR: &str = "JIRAKIT_CONFIG";

/// Errors raised while loading or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No platform configuration directory could be determined.
    #[error("Could not determine configuration directory")]
    NoConfigDir,

    /// The configuration directory could not be created.
    #[error("Failed to create configuration directory: {0}")]
    CreateDirError(#[source] std::io::Error),

    /// The configuration file could not be read.
    #[error("Failed to read configuration file: {0}")]
    ReadError(#[source] std::io::Error),

    /// The configuration file could not be written.
    #[error("Failed to write configuration file: {0}")]
    WriteError(#[source] std::io::Error),

    /// The configuration file is not valid TOML for this schema.
    #[error("Failed to parse configuration file: {0}")]
    ParseError(#[from] toml::de::Error),

    /// The configuration could not be serialized.
    #[error("Failed to serialize configuration: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// A value in the configuration is invalid.
    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    /// The requested profile does not exist.
    #[error("Profile '{0}' not found")]
    ProfileNotFound(String),
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// The full configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Application settings.
    #[serde(default)]
    pub settings: Settings,
    /// Connection profiles.
    #[serde(default)]
    pub profiles: Vec<Profile>,
}

impl Config {
    /// Resolve the configuration file path.
    ///
    /// `JIRAKIT_CONFIG` wins; otherwise `<config dir>/jirakit/config.toml`.
    pub fn default_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if !path.is_empty() {
                return Ok(PathBuf::from(path));
            }
        }
        let base = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(base.join("jirakit").join("config.toml"))
    }

    /// Load the configuration from the default location.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path()?)
    }

    /// Load and validate the configuration from `path`.
    pub fn load_from(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "Loading configuration");
        let contents = fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate and write the configuration to `path`, creating parent
    /// directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(ConfigError::CreateDirError)?;
        }
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents).map_err(ConfigError::WriteError)?;
        info!(path = %path.display(), "Configuration saved");
        Ok(())
    }

    /// Validate settings, every profile, and profile name uniqueness.
    pub fn validate(&self) -> Result<()> {
        self.settings.validate()?;
        for (i, profile) in self.profiles.iter().enumerate() {
            profile.validate()?;
            if self.profiles[..i].iter().any(|p| p.name == profile.name) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate profile name '{}'",
                    profile.name
                )));
            }
        }
        if let Some(name) = &self.settings.default_profile {
            if !self.profiles.iter().any(|p| &p.name == name) {
                return Err(ConfigError::ProfileNotFound(name.clone()));
            }
        }
        Ok(())
    }

    /// Select a profile by name, falling back to the default profile and
    /// then to the only profile.
    pub fn profile(&self, name: Option<&str>) -> Result<&Profile> {
        let wanted = name.or(self.settings.default_profile.as_deref());
        match wanted {
            Some(name) => self
                .profiles
                .iter()
                .find(|p| p.name == name)
                .ok_or_else(|| ConfigError::ProfileNotFound(name.to_string())),
            None => match self.profiles.as_slice() {
                [only] => Ok(only),
                [] => Err(ConfigError::ValidationError(
                    "no profiles configured".to_string(),
                )),
                _ => Err(ConfigError::ValidationError(
                    "multiple profiles configured; choose one or set default_profile".to_string(),
                )),
            },
        }
    }
}
