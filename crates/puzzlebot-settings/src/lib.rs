//! PuzzleBot Settings Crate
//!
//! Handles the flat parameter file, structured configuration, and building
//! the coordinate pipeline and controller tunables from them.

pub mod config;
pub mod error;
pub mod persistence;

pub use config::{CalibrationSettings, Config, MachineSettings, MotionSettings};
pub use error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
pub use persistence::{default_value, keys, ParameterStore};
