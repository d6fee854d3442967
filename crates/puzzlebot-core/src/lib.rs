//! # PuzzleBot Core
//!
//! Core types, traits, and utilities for PuzzleBot.
//! Provides the coordinate model, the composable coordinate translators,
//! the controller status state set, the error taxonomy and controller events.

pub mod coords;
pub mod core;
pub mod data;
pub mod error;

pub use coords::{
    CoordSystem, CoordSystemBuilder, CoordTranslator, IdentityTranslator, MachineCoordSystem,
    ScalingCoordSystem, ShearingCoordSystem,
};

pub use core::event::{ControllerEvent, EventDispatcher};

pub use data::{Axis, Coord, CoordCmd, MachineStatus, MoveType, StatusClass};

pub use error::{
    ConfigurationError, ConnectionError, ControllerError, Error, ProtocolError, Result,
};
