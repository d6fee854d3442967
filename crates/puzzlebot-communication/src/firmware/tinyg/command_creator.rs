//! TinyG Command Creator
//!
//! This module provides utilities for creating TinyG JSON command frames and
//! the raw control sequences that bypass the JSON parser.

use puzzlebot_core::{Coord, CoordCmd};
use serde_json::json;

/// Mechanical homing of the linear axes
pub const HOME_ALL_AXES: &str = "G28.2 X0 Y0 Z0";

/// Raw control sequences, sent without JSON wrapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RealTimeCommand {
    /// Feed hold followed by queue flush
    FeedHoldFlush,
}

impl RealTimeCommand {
    /// Wire text of the sequence
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FeedHoldFlush => "!%",
        }
    }
}

/// Fire-and-forget accessory commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessoryCommand {
    /// Vacuum pump on (spindle CW output)
    PumpOn,
    /// Vacuum pump off
    PumpOff,
    /// Solenoid engage (coolant output)
    SolenoidEngage,
    /// Solenoid disengage
    SolenoidDisengage,
}

impl AccessoryCommand {
    /// M-code driving the accessory output
    pub fn gcode(&self) -> &'static str {
        match self {
            Self::PumpOn => "M3",
            Self::PumpOff => "M5",
            Self::SolenoidEngage => "M8",
            Self::SolenoidDisengage => "M9",
        }
    }
}

impl std::fmt::Display for AccessoryCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::PumpOn => "pump on",
            Self::PumpOff => "pump off",
            Self::SolenoidEngage => "solenoid engage",
            Self::SolenoidDisengage => "solenoid disengage",
        };
        write!(f, "{}", name)
    }
}

/// TinyG frame builder
#[derive(Debug, Default, Clone, Copy)]
pub struct CommandCreator;

impl CommandCreator {
    /// Wrap a G-code block as `{"gc":"..."}`
    pub fn gcode_frame(gcode: &str) -> String {
        json!({ "gc": gcode }).to_string()
    }

    /// Status report request
    pub fn status_request() -> String {
        r#"{"sr":null}"#.to_string()
    }

    /// Rapid move naming only the axes present in `cmd`, with values taken
    /// from the translated machine destination
    pub fn motion_gcode(cmd: &CoordCmd, machine_destination: Coord) -> String {
        let mut gcode = String::from("G0");
        for (axis, _) in cmd.axes() {
            gcode.push_str(&format!(" {}{}", axis.letter(), machine_destination.get(axis)));
        }
        gcode
    }
}
