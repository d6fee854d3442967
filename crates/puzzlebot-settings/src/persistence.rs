//! Parameter Persistence
//!
//! A flat JSON key/value store backing every tunable of the machine. Reads
//! fall back to built-in defaults; writes rewrite the whole file.

use crate::error::{ConfigError, SettingsError, SettingsResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};

/// Parameter names understood by the driver
pub mod keys {
    pub const MACHINE_HOST_NAME: &str = "MachineHostName";
    pub const MACHINE_PORT: &str = "MachinePort";
    pub const CONNECT_TIMEOUT_MS: &str = "ConnectTimeoutMs";
    pub const MAX_X: &str = "MaxX";
    pub const MAX_Y: &str = "MaxY";
    pub const MAX_Z: &str = "MaxZ";
    pub const MAX_A: &str = "MaxA";
    pub const NUDGE_X: &str = "NudgeX";
    pub const NUDGE_Y: &str = "NudgeY";
    pub const NUDGE_Z: &str = "NudgeZ";
    pub const NUDGE_A: &str = "NudgeA";
    pub const USE_CALIBRATION: &str = "UseCalibration";
    pub const X_SHEAR: &str = "XShear";
    pub const X_SCALE: &str = "XScale";
    pub const Y_SCALE: &str = "YScale";
    pub const Z_SCALE: &str = "ZScale";
    pub const MOVEMENT_START_TIMEOUT_MS: &str = "MovementStartTimeoutMs";
    pub const MOVEMENT_FINISH_TIMEOUT_MS: &str = "MovementFinishTimeoutMs";
}

/// Built-in value for a parameter that has never been stored
pub fn default_value(name: &str) -> Option<Value> {
    use keys::*;

    let value = match name {
        MACHINE_HOST_NAME => json!("192.168.1.74"),
        MACHINE_PORT => json!(2000),
        CONNECT_TIMEOUT_MS => json!(5000),
        MAX_X => json!(595.0),
        MAX_Y => json!(360.0),
        MAX_Z => json!(30.0),
        MAX_A => json!(365.0),
        NUDGE_X | NUDGE_Y | NUDGE_Z => json!(0.2),
        NUDGE_A => json!(1.0),
        USE_CALIBRATION => json!(false),
        X_SHEAR => json!(0.0),
        X_SCALE | Y_SCALE | Z_SCALE => json!(1.0),
        MOVEMENT_START_TIMEOUT_MS => json!(500),
        MOVEMENT_FINISH_TIMEOUT_MS => json!(10_000),
        _ => return None,
    };
    Some(value)
}

/// Flat JSON parameter file
#[derive(Debug, Clone, Default)]
pub struct ParameterStore {
    path: Option<PathBuf>,
    values: Map<String, Value>,
}

impl ParameterStore {
    /// `<config dir>/puzzlebot/params.json`
    pub fn default_path() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("puzzlebot").join("params.json"))
            .ok_or_else(|| {
                SettingsError::ConfigDirectory(
                    "no configuration directory on this platform".to_string(),
                )
            })
    }

    /// Store backed by `path`; a missing file starts empty
    pub fn open(path: impl Into<PathBuf>) -> SettingsResult<Self> {
        let path = path.into();
        if !path.exists() {
            tracing::info!(path = %path.display(), "No parameter file yet; using defaults");
            return Ok(Self {
                path: Some(path),
                values: Map::new(),
            });
        }

        let content = std::fs::read_to_string(&path)
            .map_err(|e| SettingsError::LoadError(format!("{}: {}", path.display(), e)))?;
        let values = match serde_json::from_str::<Value>(&content)? {
            Value::Object(values) => values,
            other => {
                return Err(ConfigError::Corrupted(format!(
                    "{} holds {} instead of an object",
                    path.display(),
                    kind(&other)
                ))
                .into())
            }
        };

        tracing::debug!(path = %path.display(), count = values.len(), "Loaded parameters");
        Ok(Self {
            path: Some(path),
            values,
        })
    }

    /// Store that never touches disk
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Whether a value has been stored explicitly
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Stored value, else the built-in default
    pub fn get<T: DeserializeOwned>(&self, name: &str) -> SettingsResult<T> {
        let value = match self.values.get(name) {
            Some(value) => value.clone(),
            None => default_value(name).ok_or_else(|| ConfigError::MissingKey(name.to_string()))?,
        };

        serde_json::from_value(value.clone()).map_err(|_| {
            SettingsError::from(ConfigError::ValueOutOfRange {
                key: name.to_string(),
                value: value.to_string(),
            })
        })
    }

    /// Store a value and rewrite the file
    pub fn set<T: Serialize>(&mut self, name: &str, value: T) -> SettingsResult<()> {
        let value = serde_json::to_value(value)?;
        self.values.insert(name.to_string(), value);
        self.save()
    }

    /// Write all stored values as pretty JSON
    pub fn save(&self) -> SettingsResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| {
                SettingsError::ConfigDirectory(format!("{}: {}", dir.display(), e))
            })?;
        }

        let content = serde_json::to_string_pretty(&self.values)?;
        std::fs::write(path, content)
            .map_err(|e| SettingsError::SaveError(format!("{}: {}", path.display(), e)))?;
        tracing::debug!(path = %path.display(), "Saved parameters");
        Ok(())
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
