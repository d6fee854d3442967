//! TinyG firmware support
//!
//! - `command_creator`: outgoing JSON and raw control frames
//! - `response_parser`: status and fault frame decoding
//! - `controller`: the motion state machine
//! - `jog`: directional jog and nudge helpers

pub mod command_creator;
pub mod controller;
pub mod jog;
pub mod response_parser;

pub use command_creator::{AccessoryCommand, CommandCreator, RealTimeCommand};
pub use controller::{MachineSnapshot, MotionController, MotionSignals, MotionTimeouts};
pub use jog::{JogController, JogDirection, NudgeIncrements};
pub use response_parser::{StatusReport, TinyGReport, TinyGResponseParser};
