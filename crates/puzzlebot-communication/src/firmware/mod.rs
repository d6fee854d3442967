//! Firmware implementations
//!
//! Supported controllers:
//! - TinyG: JSON-mode motion controller driving the PuzzleBot stage

pub mod tinyg;

pub use tinyg::{
    AccessoryCommand, CommandCreator, JogController, JogDirection, MachineSnapshot,
    MotionController, MotionSignals, MotionTimeouts, NudgeIncrements, RealTimeCommand,
    StatusReport, TinyGReport, TinyGResponseParser,
};
