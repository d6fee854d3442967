//! Error types for the settings crate.
//!
//! This module provides structured error types for the parameter store,
//! configuration files, and validation.

use puzzlebot_core::ConfigurationError;
use thiserror::Error;

/// Errors that can occur during settings operations.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// The parameter or configuration file could not be loaded.
    #[error("Failed to load settings: {0}")]
    LoadError(String),

    /// The parameter or configuration file could not be saved.
    #[error("Failed to save settings: {0}")]
    SaveError(String),

    /// A configuration value is invalid.
    #[error("Invalid setting '{key}': {reason}")]
    InvalidSetting { key: String, reason: String },

    /// The configuration directory could not be found or created.
    #[error("Config directory error: {0}")]
    ConfigDirectory(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// TOML deserialization error.
    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("TOML error: {0}")]
    TomlSerializeError(#[from] toml::ser::Error),

    /// A configuration lookup error occurred.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Calibration values do not form a valid coordinate pipeline.
    #[error("Calibration error: {0}")]
    Calibration(#[from] ConfigurationError),
}

/// Errors related to parameter lookup and file formats.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A parameter has neither a stored value nor a default.
    #[error("Missing configuration key: {0}")]
    MissingKey(String),

    /// The configuration file format is not supported.
    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),

    /// A stored value does not have the requested type.
    #[error("Value out of range for '{key}': {value}")]
    ValueOutOfRange { key: String, value: String },

    /// The parameter file is not a flat JSON object.
    #[error("Corrupted configuration: {0}")]
    Corrupted(String),
}

/// Result type alias for settings operations.
pub type SettingsResult<T> = Result<T, SettingsError>;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
