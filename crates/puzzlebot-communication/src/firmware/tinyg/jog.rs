//! Directional jog and nudge
//!
//! Stateless helpers expressing operator intents as [`MotionController`]
//! calls. A jog runs towards the travel limit until stopped; a nudge is a
//! short synchronous incremental move.

use super::controller::MotionController;
use puzzlebot_core::{Axis, ControllerError, CoordCmd, MoveType, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Operator-facing jog directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JogDirection {
    /// -X
    Left,
    /// +X
    Right,
    /// +Y
    Top,
    /// -Y
    Bottom,
    /// +Z
    Up,
    /// -Z
    Down,
    /// +A
    Cw,
    /// -A
    Ccw,
}

impl JogDirection {
    pub const ALL: [JogDirection; 8] = [
        Self::Left,
        Self::Right,
        Self::Top,
        Self::Bottom,
        Self::Up,
        Self::Down,
        Self::Cw,
        Self::Ccw,
    ];

    /// Axis this direction moves
    pub fn axis(self) -> Axis {
        match self {
            Self::Left | Self::Right => Axis::X,
            Self::Top | Self::Bottom => Axis::Y,
            Self::Up | Self::Down => Axis::Z,
            Self::Cw | Self::Ccw => Axis::A,
        }
    }

    /// Whether the direction increases the axis value
    pub fn is_positive(self) -> bool {
        matches!(self, Self::Right | Self::Top | Self::Up | Self::Cw)
    }

    fn name(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Up => "up",
            Self::Down => "down",
            Self::Cw => "cw",
            Self::Ccw => "ccw",
        }
    }
}

impl fmt::Display for JogDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for JogDirection {
    type Err = ControllerError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|d| d.name() == wanted)
            .ok_or_else(|| ControllerError::InvalidCommand {
                reason: format!("unknown jog direction '{}'", s),
            })
    }
}

/// Per-axis default nudge distances
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NudgeIncrements {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Degrees
    pub a: f64,
}

impl NudgeIncrements {
    pub fn for_axis(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
            Axis::A => self.a,
        }
    }
}

impl Default for NudgeIncrements {
    fn default() -> Self {
        Self {
            x: 0.2,
            y: 0.2,
            z: 0.2,
            a: 1.0,
        }
    }
}

/// Jog/nudge front end borrowing a controller
#[derive(Debug, Clone, Copy)]
pub struct JogController<'a> {
    machine: &'a MotionController,
    increments: NudgeIncrements,
}

impl<'a> JogController<'a> {
    pub fn new(machine: &'a MotionController, increments: NudgeIncrements) -> Self {
        Self {
            machine,
            increments,
        }
    }

    /// Cancel any motion, then run towards the travel limit without waiting
    /// for completion
    ///
    /// The limit is the logical image of a machine corner. Under a calibration
    /// shear that point can lie outside machine travel for the current
    /// position, in which case the jog is rejected with `OutOfBounds`.
    pub async fn start_jog(&self, direction: JogDirection) -> Result<()> {
        self.machine.cancel_move().await?;

        let axis = direction.axis();
        let limit = if direction.is_positive() {
            self.machine.max()
        } else {
            self.machine.min()
        };
        tracing::debug!(%direction, "Starting jog");
        let cmd = CoordCmd::single(MoveType::Absolute, axis, limit.get(axis));
        self.machine.move_to(&cmd, false).await
    }

    pub async fn stop_jog(&self) -> Result<()> {
        self.machine.cancel_move().await
    }

    /// Synchronous incremental move of `amount` in `direction`
    pub async fn nudge(&self, direction: JogDirection, amount: f64) -> Result<()> {
        let delta = if direction.is_positive() {
            amount
        } else {
            -amount
        };
        let cmd = CoordCmd::single(MoveType::Incremental, direction.axis(), delta);
        self.machine.move_to(&cmd, true).await
    }

    /// Nudge by the configured increment for the direction's axis
    pub async fn nudge_default(&self, direction: JogDirection) -> Result<()> {
        let amount = self.increments.for_axis(direction.axis());
        self.nudge(direction, amount).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_mapping() {
        assert_eq!(JogDirection::Left.axis(), Axis::X);
        assert!(!JogDirection::Left.is_positive());
        assert_eq!(JogDirection::Top.axis(), Axis::Y);
        assert!(JogDirection::Top.is_positive());
        assert!(!JogDirection::Bottom.is_positive());
        assert_eq!(JogDirection::Down.axis(), Axis::Z);
        assert!(!JogDirection::Down.is_positive());
        assert_eq!(JogDirection::Cw.axis(), Axis::A);
        assert!(JogDirection::Cw.is_positive());
        assert!(!JogDirection::Ccw.is_positive());
    }

    #[test]
    fn test_direction_from_str() {
        assert_eq!("Right".parse::<JogDirection>().unwrap(), JogDirection::Right);
        assert_eq!(" ccw ".parse::<JogDirection>().unwrap(), JogDirection::Ccw);
        assert!("sideways".parse::<JogDirection>().is_err());
        for direction in JogDirection::ALL {
            assert_eq!(direction.to_string().parse::<JogDirection>().unwrap(), direction);
        }
    }

    #[test]
    fn test_default_increments() {
        let inc = NudgeIncrements::default();
        assert_eq!(inc.for_axis(Axis::X), 0.2);
        assert_eq!(inc.for_axis(Axis::A), 1.0);
    }
}
