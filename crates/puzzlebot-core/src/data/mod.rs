//! Data models for positions, move commands and machine status
//!
//! This module provides:
//! - Four-axis coordinates (X, Y, Z linear; A rotary in degrees)
//! - Move commands with optional per-axis values (absolute or incremental)
//! - Controller status codes and their idle/moving classification

pub mod status;

pub use status::{MachineStatus, StatusClass};

use crate::error::ControllerError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Machine axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// Linear X axis
    X,
    /// Linear Y axis
    Y,
    /// Linear Z axis
    Z,
    /// Rotary A axis (degrees)
    A,
}

impl Axis {
    /// All axes in wire order
    pub const ALL: [Axis; 4] = [Axis::X, Axis::Y, Axis::Z, Axis::A];

    /// G-code letter for this axis
    pub fn letter(self) -> char {
        match self {
            Axis::X => 'X',
            Axis::Y => 'Y',
            Axis::Z => 'Z',
            Axis::A => 'A',
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Four-axis machine coordinate
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coord {
    /// X-axis position
    pub x: f64,
    /// Y-axis position
    pub y: f64,
    /// Z-axis position
    pub z: f64,
    /// A-axis (rotary) position in degrees
    pub a: f64,
}

impl Coord {
    /// Create a coordinate from its four axes
    pub const fn new(x: f64, y: f64, z: f64, a: f64) -> Self {
        Self { x, y, z, a }
    }

    /// Value on a single axis
    pub fn get(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
            Axis::A => self.a,
        }
    }

    /// Copy of this coordinate with one axis replaced
    pub fn with_axis(mut self, axis: Axis, value: f64) -> Self {
        match axis {
            Axis::X => self.x = value,
            Axis::Y => self.y = value,
            Axis::Z => self.z = value,
            Axis::A => self.a = value,
        }
        self
    }

    /// True when no axis is NaN or infinite
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite() && self.a.is_finite()
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "X:{:.3} Y:{:.3} Z:{:.3} A:{:.3}",
            self.x, self.y, self.z, self.a
        )
    }
}

/// How a [`CoordCmd`] relates to the current position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveType {
    /// Axis values are deltas from the last known position
    Incremental,
    /// Axis values are target positions; absent axes stay put
    Absolute,
}

/// Move command with optional per-axis values
///
/// At least one axis is always present; the constructors and deserialization
/// enforce it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordCmd")]
pub struct CoordCmd {
    move_type: MoveType,
    x: Option<f64>,
    y: Option<f64>,
    z: Option<f64>,
    a: Option<f64>,
}

/// Wire form of [`CoordCmd`], validated on the way in
#[derive(Deserialize)]
struct RawCoordCmd {
    move_type: MoveType,
    #[serde(default)]
    x: Option<f64>,
    #[serde(default)]
    y: Option<f64>,
    #[serde(default)]
    z: Option<f64>,
    #[serde(default)]
    a: Option<f64>,
}

impl TryFrom<RawCoordCmd> for CoordCmd {
    type Error = ControllerError;

    fn try_from(raw: RawCoordCmd) -> Result<Self, Self::Error> {
        Self::try_new(raw.move_type, raw.x, raw.y, raw.z, raw.a)
    }
}

impl CoordCmd {
    fn try_new(
        move_type: MoveType,
        x: Option<f64>,
        y: Option<f64>,
        z: Option<f64>,
        a: Option<f64>,
    ) -> Result<Self, ControllerError> {
        if x.is_none() && y.is_none() && z.is_none() && a.is_none() {
            return Err(ControllerError::InvalidCommand {
                reason: "move command needs at least one axis".to_string(),
            });
        }
        Ok(Self {
            move_type,
            x,
            y,
            z,
            a,
        })
    }

    /// Relative move; absent axes contribute a zero delta
    pub fn incremental(
        x: Option<f64>,
        y: Option<f64>,
        z: Option<f64>,
        a: Option<f64>,
    ) -> Result<Self, ControllerError> {
        Self::try_new(MoveType::Incremental, x, y, z, a)
    }

    /// Absolute move; absent axes keep their current value
    pub fn absolute(
        x: Option<f64>,
        y: Option<f64>,
        z: Option<f64>,
        a: Option<f64>,
    ) -> Result<Self, ControllerError> {
        Self::try_new(MoveType::Absolute, x, y, z, a)
    }

    /// Single-axis command
    pub fn single(move_type: MoveType, axis: Axis, value: f64) -> Self {
        let mut cmd = Self {
            move_type,
            x: None,
            y: None,
            z: None,
            a: None,
        };
        match axis {
            Axis::X => cmd.x = Some(value),
            Axis::Y => cmd.y = Some(value),
            Axis::Z => cmd.z = Some(value),
            Axis::A => cmd.a = Some(value),
        }
        cmd
    }

    /// Absolute move in the XY plane
    pub fn set_xy_position(x: f64, y: f64) -> Self {
        Self {
            move_type: MoveType::Absolute,
            x: Some(x),
            y: Some(y),
            z: None,
            a: None,
        }
    }

    /// Absolute move of the Z axis only
    pub fn set_z_position(z: f64) -> Self {
        Self::single(MoveType::Absolute, Axis::Z, z)
    }

    /// Command kind
    pub fn move_type(&self) -> MoveType {
        self.move_type
    }

    /// Value carried for an axis, if present
    pub fn get(&self, axis: Axis) -> Option<f64> {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
            Axis::A => self.a,
        }
    }

    /// Present axes in X, Y, Z, A order
    pub fn axes(&self) -> impl Iterator<Item = (Axis, f64)> + '_ {
        Axis::ALL
            .into_iter()
            .filter_map(move |axis| self.get(axis).map(|v| (axis, v)))
    }

    /// Compute the destination reached from `from`
    pub fn resolve(&self, from: Coord) -> Coord {
        match self.move_type {
            MoveType::Absolute => Coord::new(
                self.x.unwrap_or(from.x),
                self.y.unwrap_or(from.y),
                self.z.unwrap_or(from.z),
                self.a.unwrap_or(from.a),
            ),
            MoveType::Incremental => Coord::new(
                from.x + self.x.unwrap_or(0.0),
                from.y + self.y.unwrap_or(0.0),
                from.z + self.z.unwrap_or(0.0),
                from.a + self.a.unwrap_or(0.0),
            ),
        }
    }
}

impl fmt::Display for CoordCmd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.move_type {
            MoveType::Absolute => "abs",
            MoveType::Incremental => "inc",
        };
        write!(f, "{}", kind)?;
        for (axis, value) in self.axes() {
            write!(f, " {}{}", axis, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_keeps_absent_axes() {
        let from = Coord::new(0.0, 5.0, 0.0, 0.0);
        let cmd = CoordCmd::absolute(Some(10.0), None, None, None).unwrap();
        assert_eq!(cmd.resolve(from), Coord::new(10.0, 5.0, 0.0, 0.0));
    }

    #[test]
    fn test_incremental_adds_present_axes() {
        let from = Coord::new(10.0, 5.0, 0.0, 0.0);
        let cmd = CoordCmd::incremental(None, Some(-2.0), None, None).unwrap();
        assert_eq!(cmd.resolve(from), Coord::new(10.0, 3.0, 0.0, 0.0));
    }

    #[test]
    fn test_incremental_absent_axes_do_not_zero() {
        let from = Coord::new(1.0, 2.0, -3.0, 90.0);
        let cmd = CoordCmd::single(MoveType::Incremental, Axis::A, 1.0);
        assert_eq!(cmd.resolve(from), Coord::new(1.0, 2.0, -3.0, 91.0));
    }

    #[test]
    fn test_empty_command_rejected() {
        let err = CoordCmd::absolute(None, None, None, None).unwrap_err();
        assert!(matches!(err, ControllerError::InvalidCommand { .. }));
        assert!(CoordCmd::incremental(None, None, None, None).is_err());
    }

    #[test]
    fn test_deserialize_rejects_empty_command() {
        let err = serde_json::from_str::<CoordCmd>(
            r#"{"move_type":"Absolute","x":null,"y":null,"z":null,"a":null}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("at least one axis"));

        assert!(serde_json::from_str::<CoordCmd>(r#"{"move_type":"Incremental"}"#).is_err());
    }

    #[test]
    fn test_deserialize_valid_command() {
        let cmd: CoordCmd = serde_json::from_str(r#"{"move_type":"Incremental","y":-2.5}"#).unwrap();
        assert_eq!(cmd, CoordCmd::single(MoveType::Incremental, Axis::Y, -2.5));

        let json = serde_json::to_string(&CoordCmd::set_xy_position(1.0, 2.0)).unwrap();
        assert_eq!(serde_json::from_str::<CoordCmd>(&json).unwrap(), CoordCmd::set_xy_position(1.0, 2.0));
    }

    #[test]
    fn test_axes_iterates_present_in_order() {
        let cmd = CoordCmd::absolute(None, Some(2.0), None, Some(45.0)).unwrap();
        let axes: Vec<_> = cmd.axes().collect();
        assert_eq!(axes, vec![(Axis::Y, 2.0), (Axis::A, 45.0)]);
        assert_eq!(cmd.to_string(), "abs Y2 A45");
    }

    #[test]
    fn test_coord_finite() {
        assert!(Coord::new(1.0, 2.0, 3.0, 4.0).is_finite());
        assert!(!Coord::new(f64::NAN, 0.0, 0.0, 0.0).is_finite());
        assert!(!Coord::new(0.0, 0.0, 0.0, f64::INFINITY).is_finite());
    }

    #[test]
    fn test_with_axis() {
        let c = Coord::default().with_axis(Axis::Z, -4.5);
        assert_eq!(c.get(Axis::Z), -4.5);
        assert_eq!(c.get(Axis::X), 0.0);
    }
}
