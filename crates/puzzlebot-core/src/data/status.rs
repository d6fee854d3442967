//! TinyG machine status
//!
//! The controller reports its state as an integer `stat` code inside each
//! status report. The motion state machine only cares whether a status is
//! idle (ready for a new command) or moving.

use crate::error::ProtocolError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Controller state as reported in `sr.stat`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MachineStatus {
    /// Firmware booting; no report received yet
    #[default]
    Initializing,
    /// Reported after boot
    Ready,
    /// Alarm condition
    Alarm,
    /// Reported after a command completes
    Stop,
    /// Program end (M2/M30)
    ProgEnd,
    /// Executing motion
    Run,
    /// Feed hold
    Hold,
    /// Probing cycle
    Probe,
    /// Machining cycle
    RunCycle,
    /// Homing cycle
    Homing,
}

/// Coarse classification used for motion synchronisation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// Ready for a new motion command
    Idle,
    /// Axes are executing motion
    Moving,
    /// Neither idle nor moving
    Other,
}

impl MachineStatus {
    /// Map a raw `stat` code
    pub fn from_code(code: i64) -> Result<Self, ProtocolError> {
        Ok(match code {
            0 => Self::Initializing,
            1 => Self::Ready,
            2 => Self::Alarm,
            3 => Self::Stop,
            4 => Self::ProgEnd,
            5 => Self::Run,
            6 => Self::Hold,
            7 => Self::Probe,
            8 => Self::RunCycle,
            9 => Self::Homing,
            _ => return Err(ProtocolError::UnknownStatus { code }),
        })
    }

    /// Raw `stat` code
    pub fn code(self) -> i64 {
        match self {
            Self::Initializing => 0,
            Self::Ready => 1,
            Self::Alarm => 2,
            Self::Stop => 3,
            Self::ProgEnd => 4,
            Self::Run => 5,
            Self::Hold => 6,
            Self::Probe => 7,
            Self::RunCycle => 8,
            Self::Homing => 9,
        }
    }

    /// Idle/moving classification
    pub fn class(self) -> StatusClass {
        match self {
            Self::Stop | Self::Ready => StatusClass::Idle,
            Self::Homing | Self::Run | Self::Probe => StatusClass::Moving,
            _ => StatusClass::Other,
        }
    }

    /// True for Stop and Ready
    pub fn is_idle(self) -> bool {
        self.class() == StatusClass::Idle
    }

    /// True for Homing, Run and Probe
    pub fn is_moving(self) -> bool {
        self.class() == StatusClass::Moving
    }
}

impl fmt::Display for MachineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Initializing => "Initializing",
            Self::Ready => "Ready",
            Self::Alarm => "Alarm",
            Self::Stop => "Stop",
            Self::ProgEnd => "ProgEnd",
            Self::Run => "Run",
            Self::Hold => "Hold",
            Self::Probe => "Probe",
            Self::RunCycle => "RunCycle",
            Self::Homing => "Homing",
        };
        write!(f, "{}", name)
    }
}
