//! # PuzzleBot Communication
//!
//! Transport and firmware layer for PuzzleBot.
//! Provides the persistent TCP line transport to the TinyG controller, the
//! TinyG JSON protocol, the motion state machine and the jog helpers.

pub mod communication;
pub mod firmware;

pub use communication::{LineHandler, TcpConnectionInfo, TcpTransport, Transport};

pub use firmware::{
    AccessoryCommand, CommandCreator, JogController, JogDirection, MachineSnapshot,
    MotionController, MotionSignals, MotionTimeouts, NudgeIncrements, RealTimeCommand,
    StatusReport, TinyGReport, TinyGResponseParser,
};
