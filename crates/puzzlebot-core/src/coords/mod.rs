//! Coordinate systems and translators
//!
//! The controller accepts and reports positions in its own native ("inner")
//! space. Callers work in a logical space that hides machine quirks such as
//! per-axis step calibration and a skewed Y gantry. A translator pipeline maps
//! between the two:
//!
//! ```text
//! logical --Shearing--> --Scaling--> machine (inner)
//! ```
//!
//! Every stage implements [`CoordTranslator`]; `to_inner` and `from_inner`
//! always go all the way to and from the machine space, so the outermost
//! stage is the whole pipeline. Stages never fail once built.

mod machine;
mod translators;

pub use machine::MachineCoordSystem;
pub use translators::{IdentityTranslator, ScalingCoordSystem, ShearingCoordSystem};

use crate::data::Coord;
use crate::error::ConfigurationError;
use std::fmt;

/// A bounded coordinate space
pub trait CoordSystem: Send + Sync + fmt::Debug {
    /// Lower travel bound in this system's coordinates
    fn min(&self) -> Coord;

    /// Upper travel bound in this system's coordinates
    fn max(&self) -> Coord;

    /// True iff every axis of `c` lies within the travel bounds, inclusive
    fn bounds_check(&self, c: Coord) -> bool;
}

/// A coordinate system layered on top of the machine space
pub trait CoordTranslator: CoordSystem {
    /// Map a coordinate in this system to machine coordinates
    fn to_inner(&self, c: Coord) -> Coord;

    /// Map machine coordinates to this system
    fn from_inner(&self, c: Coord) -> Coord;
}

/// Inclusive four-axis range check
pub fn within(min: Coord, max: Coord, c: Coord) -> bool {
    c.x >= min.x
        && c.x <= max.x
        && c.y >= min.y
        && c.y <= max.y
        && c.z >= min.z
        && c.z <= max.z
        && c.a >= min.a
        && c.a <= max.a
}

/// Builds the translator pipelines used by the motion controller
pub struct CoordSystemBuilder;

impl CoordSystemBuilder {
    /// Calibrated pipeline: shearing outside scaling outside the machine bounds
    pub fn composite(
        x_shear: f64,
        x_scale: f64,
        y_scale: f64,
        z_scale: f64,
        machine_min: Coord,
        machine_max: Coord,
    ) -> Result<Box<dyn CoordTranslator>, ConfigurationError> {
        let machine = MachineCoordSystem::new(machine_min, machine_max)?;
        let scaled = ScalingCoordSystem::new(Box::new(machine), x_scale, y_scale, z_scale)?;
        let sheared = ShearingCoordSystem::new(Box::new(scaled), x_shear)?;
        tracing::debug!(
            x_shear,
            x_scale,
            y_scale,
            z_scale,
            "Built calibrated coordinate pipeline"
        );
        Ok(Box::new(sheared))
    }

    /// Uncalibrated pipeline: logical space equals machine space
    pub fn identity(
        machine_min: Coord,
        machine_max: Coord,
    ) -> Result<Box<dyn CoordTranslator>, ConfigurationError> {
        let machine = MachineCoordSystem::new(machine_min, machine_max)?;
        Ok(Box::new(IdentityTranslator::new(Box::new(machine))))
    }
}
