//! Translator stages
//!
//! Each stage owns the stage below it and applies its own local mapping on
//! top. Bounds are always checked in machine space.

use super::{CoordSystem, CoordTranslator};
use crate::data::Coord;
use crate::error::ConfigurationError;

/// Pass-through stage
#[derive(Debug)]
pub struct IdentityTranslator {
    inner: Box<dyn CoordTranslator>,
}

impl IdentityTranslator {
    /// Wrap an inner system without changing coordinates
    pub fn new(inner: Box<dyn CoordTranslator>) -> Self {
        Self { inner }
    }
}

impl CoordSystem for IdentityTranslator {
    fn min(&self) -> Coord {
        self.inner.min()
    }

    fn max(&self) -> Coord {
        self.inner.max()
    }

    fn bounds_check(&self, c: Coord) -> bool {
        self.inner.bounds_check(c)
    }
}

impl CoordTranslator for IdentityTranslator {
    fn to_inner(&self, c: Coord) -> Coord {
        self.inner.to_inner(c)
    }

    fn from_inner(&self, c: Coord) -> Coord {
        self.inner.from_inner(c)
    }
}

/// Per-axis linear scaling of X, Y and Z
///
/// Corrects steps-per-unit calibration error. The A axis is never scaled.
#[derive(Debug)]
pub struct ScalingCoordSystem {
    inner: Box<dyn CoordTranslator>,
    x_scale: f64,
    y_scale: f64,
    z_scale: f64,
}

impl ScalingCoordSystem {
    /// Create a scaling stage; every factor must be positive and finite
    pub fn new(
        inner: Box<dyn CoordTranslator>,
        x_scale: f64,
        y_scale: f64,
        z_scale: f64,
    ) -> Result<Self, ConfigurationError> {
        for (axis, factor) in [('X', x_scale), ('Y', y_scale), ('Z', z_scale)] {
            if !(factor.is_finite() && factor > 0.0) {
                return Err(ConfigurationError::InvalidScale { axis, factor });
            }
        }
        Ok(Self {
            inner,
            x_scale,
            y_scale,
            z_scale,
        })
    }

    fn scale(&self, c: Coord) -> Coord {
        Coord::new(
            c.x * self.x_scale,
            c.y * self.y_scale,
            c.z * self.z_scale,
            c.a,
        )
    }

    fn unscale(&self, c: Coord) -> Coord {
        Coord::new(
            c.x / self.x_scale,
            c.y / self.y_scale,
            c.z / self.z_scale,
            c.a,
        )
    }
}

impl CoordSystem for ScalingCoordSystem {
    fn min(&self) -> Coord {
        self.unscale(self.inner.min())
    }

    fn max(&self) -> Coord {
        self.unscale(self.inner.max())
    }

    fn bounds_check(&self, c: Coord) -> bool {
        self.inner.bounds_check(self.scale(c))
    }
}

impl CoordTranslator for ScalingCoordSystem {
    fn to_inner(&self, c: Coord) -> Coord {
        self.inner.to_inner(self.scale(c))
    }

    fn from_inner(&self, c: Coord) -> Coord {
        self.unscale(self.inner.from_inner(c))
    }
}

/// Y-axis skew correction
///
/// The physical X axis is taken as ground truth and parallel to the logical
/// X axis. The Y gantry is skewed, so every unit of X travel introduces
/// `shear` units of Y error: `y_inner = y + x * shear`.
#[derive(Debug)]
pub struct ShearingCoordSystem {
    inner: Box<dyn CoordTranslator>,
    shear: f64,
}

impl ShearingCoordSystem {
    /// Create a shearing stage; `shear` must lie in the open interval (-1, 1)
    pub fn new(inner: Box<dyn CoordTranslator>, shear: f64) -> Result<Self, ConfigurationError> {
        if !(shear > -1.0 && shear < 1.0) {
            return Err(ConfigurationError::InvalidShear { shear });
        }
        Ok(Self { inner, shear })
    }

    fn shear(&self, c: Coord) -> Coord {
        Coord::new(c.x, c.y + c.x * self.shear, c.z, c.a)
    }

    fn unshear(&self, c: Coord) -> Coord {
        Coord::new(c.x, c.y - c.x * self.shear, c.z, c.a)
    }
}

impl CoordSystem for ShearingCoordSystem {
    fn min(&self) -> Coord {
        self.unshear(self.inner.min())
    }

    fn max(&self) -> Coord {
        self.unshear(self.inner.max())
    }

    fn bounds_check(&self, c: Coord) -> bool {
        self.inner.bounds_check(self.shear(c))
    }
}

impl CoordTranslator for ShearingCoordSystem {
    fn to_inner(&self, c: Coord) -> Coord {
        self.inner.to_inner(self.shear(c))
    }

    fn from_inner(&self, c: Coord) -> Coord {
        self.unshear(self.inner.from_inner(c))
    }
}
