//! Configuration management for the meaning table tools.
//!
//! Handles loading, saving, and validating configuration from
//! platform-specific config directories.

use crate::error::ConfigError;
use crate::translator::PROVIDER_MAX_BATCH;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application name used for config directory.
const APP_NAME: &str = "MeaningTables";

/// Default config filename.
const CONFIG_FILENAME: &str = "config.toml";

/// Placeholder value for unconfigured API keys.
const API_KEY_PLACEHOLDER: &str = "YOUR_API_KEY_HERE";

/// Environment variable that overrides `api.key`.
pub const API_KEY_ENV: &str = "GOOGLE_TRANSLATE_API_KEY";

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Translation API configuration.
    pub api: ApiConfig,

    /// Translation behavior settings.
    pub translation: TranslationConfig,

    /// Flat export file settings.
    pub flat_file: FlatFileConfig,

    /// File paths.
    pub paths: PathsConfig,
}

/// API configuration for the translation provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// API key (required for `translate`).
    pub key: String,

    /// Endpoint of the translate method.
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            key: API_KEY_PLACEHOLDER.to_string(),
            base_url: "https://translation.googleapis.com/language/translate/v2".to_string(),
        }
    }
}

impl ApiConfig {
    /// Checks if the API key is configured (not placeholder).
    pub fn is_configured(&self) -> bool {
        !self.key.is_empty() && self.key != API_KEY_PLACEHOLDER
    }
}

/// Translation behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    /// Maximum strings per provider request.
    pub batch_size: usize,

    /// Number of attempts for a failed request.
    pub retries: u32,

    /// Delay after each successful request in seconds.
    pub delay_between_requests_sec: f64,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            batch_size: PROVIDER_MAX_BATCH,
            retries: 3,
            delay_between_requests_sec: 0.0,
        }
    }
}

/// Flat export file configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlatFileConfig {
    /// Column delimiter, a single ASCII character.
    pub delimiter: String,
}

impl Default for FlatFileConfig {
    fn default() -> Self {
        Self {
            delimiter: ";".to_string(),
        }
    }
}

/// File path configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory holding one subdirectory of tables per language.
    pub tables_root: PathBuf,

    /// Language of the reference tables.
    pub reference_language: String,

    /// Directory where flat files are written and read.
    pub export_directory: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            tables_root: PathBuf::from("./meaning_tables"),
            reference_language: "en".to_string(),
            export_directory: PathBuf::from("."),
        }
    }
}

impl PathsConfig {
    /// Path of the flat file for a language.
    pub fn export_file(&self, language: &str) -> PathBuf {
        self.export_directory
            .join(format!("meaning-tables_{}.csv", language))
    }
}

/// Converts a delimiter setting into the byte used by the CSV codec.
pub fn parse_delimiter(value: &str) -> Result<u8, ConfigError> {
    match value.as_bytes() {
        [byte] if byte.is_ascii() => Ok(*byte),
        _ => Err(ConfigError::InvalidValue {
            key: "flat_file.delimiter".to_string(),
            message: format!("{:?} is not a single ASCII character", value),
        }),
    }
}

impl Config {
    /// Returns the platform-specific config directory path.
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|p| p.join(APP_NAME))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Returns the full path to the config file.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join(CONFIG_FILENAME))
    }

    /// Loads configuration from the default location.
    ///
    /// If the config file doesn't exist, creates a default one.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            // Create default config
            let config = Config::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        Ok(config)
    }

    /// Saves configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Replaces the API key with the environment override, if set.
    pub fn apply_env(&mut self) {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                self.api.key = key.trim().to_string();
            }
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.translation.batch_size == 0 || self.translation.batch_size > PROVIDER_MAX_BATCH {
            return Err(ConfigError::InvalidValue {
                key: "translation.batch_size".to_string(),
                message: format!("must be between 1 and {}", PROVIDER_MAX_BATCH),
            });
        }

        if self.paths.reference_language.is_empty() {
            return Err(ConfigError::MissingValue(
                "paths.reference_language".to_string(),
            ));
        }

        parse_delimiter(&self.flat_file.delimiter)?;
        Ok(())
    }

    /// Validates the settings the `translate` command additionally needs.
    pub fn validate_for_translation(&self) -> Result<(), ConfigError> {
        self.validate()?;
        if !self.api.is_configured() {
            return Err(ConfigError::MissingValue(format!(
                "api.key (set it in the config file or {})",
                API_KEY_ENV
            )));
        }
        Ok(())
    }

    /// Delimiter byte from the config file.
    pub fn delimiter(&self) -> Result<u8, ConfigError> {
        parse_delimiter(&self.flat_file.delimiter)
    }
}
