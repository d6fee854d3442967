//! Configuration for PuzzleBot
//!
//! Structured view over the parameter store. Supports JSON and TOML files
//! in addition to the flat parameter file.
//!
//! Configuration is organized into logical sections:
//! - Connection settings (controller host, port, connect timeout)
//! - Machine travel limits
//! - Calibration (shear and per-axis scale)
//! - Jog increments
//! - Motion synchronisation timeouts

use crate::error::{ConfigError, SettingsError, SettingsResult};
use crate::persistence::{keys, ParameterStore};
use puzzlebot_communication::{MotionTimeouts, NudgeIncrements, TcpConnectionInfo};
use puzzlebot_core::{Coord, CoordSystemBuilder, CoordTranslator};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Travel limits; every axis starts at its home switch
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MachineSettings {
    /// X travel
    pub max_x: f64,
    /// Y travel
    pub max_y: f64,
    /// Z travel below the switch
    pub max_z: f64,
    /// Rotary travel in degrees
    pub max_a: f64,
}

impl Default for MachineSettings {
    fn default() -> Self {
        Self {
            max_x: 595.0,
            max_y: 360.0,
            max_z: 30.0,
            max_a: 365.0,
        }
    }
}

/// Skew and scale correction applied between logical and machine space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationSettings {
    /// Apply the correction pipeline
    pub enabled: bool,
    pub x_shear: f64,
    pub x_scale: f64,
    pub y_scale: f64,
    pub z_scale: f64,
}

impl Default for CalibrationSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            x_shear: 0.0,
            x_scale: 1.0,
            y_scale: 1.0,
            z_scale: 1.0,
        }
    }
}

/// Movement wait bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotionSettings {
    pub movement_start_ms: u64,
    pub movement_finish_ms: u64,
}

impl Default for MotionSettings {
    fn default() -> Self {
        Self {
            movement_start_ms: 500,
            movement_finish_ms: 10_000,
        }
    }
}

/// Complete driver configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Controller network bridge
    pub connection: TcpConnectionInfo,
    /// Travel limits
    pub machine: MachineSettings,
    /// Coordinate correction
    #[serde(default)]
    pub calibration: CalibrationSettings,
    /// Nudge distances
    #[serde(default)]
    pub jog: NudgeIncrements,
    /// Wait bounds
    #[serde(default)]
    pub motion: MotionSettings,
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Read every section from the parameter store
    pub fn from_store(store: &ParameterStore) -> SettingsResult<Self> {
        let config = Self {
            connection: TcpConnectionInfo {
                host: store.get(keys::MACHINE_HOST_NAME)?,
                port: store.get(keys::MACHINE_PORT)?,
                timeout_ms: store.get(keys::CONNECT_TIMEOUT_MS)?,
            },
            machine: MachineSettings {
                max_x: store.get(keys::MAX_X)?,
                max_y: store.get(keys::MAX_Y)?,
                max_z: store.get(keys::MAX_Z)?,
                max_a: store.get(keys::MAX_A)?,
            },
            calibration: CalibrationSettings {
                enabled: store.get(keys::USE_CALIBRATION)?,
                x_shear: store.get(keys::X_SHEAR)?,
                x_scale: store.get(keys::X_SCALE)?,
                y_scale: store.get(keys::Y_SCALE)?,
                z_scale: store.get(keys::Z_SCALE)?,
            },
            jog: NudgeIncrements {
                x: store.get(keys::NUDGE_X)?,
                y: store.get(keys::NUDGE_Y)?,
                z: store.get(keys::NUDGE_Z)?,
                a: store.get(keys::NUDGE_A)?,
            },
            motion: MotionSettings {
                movement_start_ms: store.get(keys::MOVEMENT_START_TIMEOUT_MS)?,
                movement_finish_ms: store.get(keys::MOVEMENT_FINISH_TIMEOUT_MS)?,
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SettingsError::LoadError(format!("{}: {}", path.display(), e)))?;

        let config: Self = match Format::of(path)? {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match Format::of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        std::fs::write(path, content)
            .map_err(|e| SettingsError::SaveError(format!("{}: {}", path.display(), e)))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        self.connection
            .validate()
            .map_err(|e| invalid(keys::MACHINE_HOST_NAME, e.to_string()))?;

        for (key, limit) in [
            (keys::MAX_X, self.machine.max_x),
            (keys::MAX_Y, self.machine.max_y),
            (keys::MAX_Z, self.machine.max_z),
            (keys::MAX_A, self.machine.max_a),
        ] {
            if !(limit.is_finite() && limit > 0.0) {
                return Err(invalid(key, format!("travel must be > 0, got {}", limit)));
            }
        }

        for (key, step) in [
            (keys::NUDGE_X, self.jog.x),
            (keys::NUDGE_Y, self.jog.y),
            (keys::NUDGE_Z, self.jog.z),
            (keys::NUDGE_A, self.jog.a),
        ] {
            if !(step.is_finite() && step > 0.0) {
                return Err(invalid(key, format!("increment must be > 0, got {}", step)));
            }
        }

        if self.motion.movement_start_ms == 0 {
            return Err(invalid(keys::MOVEMENT_START_TIMEOUT_MS, "must be > 0".to_string()));
        }
        if self.motion.movement_finish_ms == 0 {
            return Err(invalid(keys::MOVEMENT_FINISH_TIMEOUT_MS, "must be > 0".to_string()));
        }

        if self.calibration.enabled {
            self.coordinate_translator()?;
        }

        Ok(())
    }

    /// Machine-space bounds: Min=(0,0,-MaxZ,0), Max=(MaxX,MaxY,0,MaxA)
    pub fn machine_bounds(&self) -> (Coord, Coord) {
        let m = &self.machine;
        (
            Coord::new(0.0, 0.0, -m.max_z, 0.0),
            Coord::new(m.max_x, m.max_y, 0.0, m.max_a),
        )
    }

    /// Pipeline from logical to machine coordinates
    pub fn coordinate_translator(&self) -> SettingsResult<Box<dyn CoordTranslator>> {
        let (min, max) = self.machine_bounds();
        let c = &self.calibration;
        let translator = if c.enabled {
            CoordSystemBuilder::composite(c.x_shear, c.x_scale, c.y_scale, c.z_scale, min, max)?
        } else {
            CoordSystemBuilder::identity(min, max)?
        };
        Ok(translator)
    }

    pub fn timeouts(&self) -> MotionTimeouts {
        MotionTimeouts::from_millis(self.motion.movement_start_ms, self.motion.movement_finish_ms)
    }
}

enum Format {
    Json,
    Toml,
}

impl Format {
    fn of(path: &Path) -> SettingsResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            other => Err(ConfigError::UnsupportedFormat(other.unwrap_or("none").to_string()).into()),
        }
    }
}

fn invalid(key: &str, reason: String) -> SettingsError {
    SettingsError::InvalidSetting {
        key: key.to_string(),
        reason,
    }
}
