use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::definition::CommandDefinition;
use crate::config::types::ParseSettings;

/// Errors that can occur when loading settings or command definitions.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },

    #[error("Invalid parameter definition: {0}")]
    Parameter(#[from] crate::error::ParseError),
}

fn read_toml<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    toml::from_str(&content).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })
}

impl ParseSettings {
    /// Loads settings from a TOML file.
    ///
    /// - If the file doesn't exist, returns `ParseSettings::default()`.
    /// - Otherwise parses and validates it.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No settings file, using defaults");
            return Ok(ParseSettings::default());
        }

        let settings: ParseSettings = read_toml(path)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validates the settings.
    ///
    /// Checks:
    /// - The value separator is not empty
    /// - The end-of-options marker contains no whitespace
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.value_separator.is_empty() {
            return Err(ConfigError::ValidationError {
                message: "value_separator must not be empty".to_string(),
            });
        }

        if self.end_of_options.chars().any(char::is_whitespace) {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "end_of_options '{}' must not contain whitespace",
                    self.end_of_options
                ),
            });
        }

        Ok(())
    }
}

impl CommandDefinition {
    /// Loads a command definition. Unlike settings, the file must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let definition: CommandDefinition = read_toml(path)?;
        if let Some(settings) = &definition.settings {
            settings.validate()?;
        }
        Ok(definition)
    }
}
