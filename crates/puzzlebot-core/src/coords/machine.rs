use super::{within, CoordSystem, CoordTranslator};
use crate::data::{Axis, Coord};
use crate::error::ConfigurationError;
use std::cmp::Ordering;

/// The controller's native coordinate space and its travel bounds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MachineCoordSystem {
    min: Coord,
    max: Coord,
}

impl MachineCoordSystem {
    /// Create the machine space; `min` must be strictly below `max` on every axis
    pub fn new(min: Coord, max: Coord) -> Result<Self, ConfigurationError> {
        for axis in Axis::ALL {
            let (lo, hi) = (min.get(axis), max.get(axis));
            // NaN bounds compare as None and are rejected too
            if lo.partial_cmp(&hi) != Some(Ordering::Less) {
                return Err(ConfigurationError::InvalidBounds {
                    axis: axis.letter(),
                    min: lo,
                    max: hi,
                });
            }
        }
        Ok(Self { min, max })
    }
}

impl CoordSystem for MachineCoordSystem {
    fn min(&self) -> Coord {
        self.min
    }

    fn max(&self) -> Coord {
        self.max
    }

    fn bounds_check(&self, c: Coord) -> bool {
        within(self.min, self.max, c)
    }
}

// The base of every pipeline; it is its own inner space.
impl CoordTranslator for MachineCoordSystem {
    fn to_inner(&self, c: Coord) -> Coord {
        c
    }

    fn from_inner(&self, c: Coord) -> Coord {
        c
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_min_not_below_max() {
        let max = Coord::new(10.0, 10.0, 10.0, 10.0);
        for axis in Axis::ALL {
            let min = Coord::default().with_axis(axis, 10.0);
            let err = MachineCoordSystem::new(min, max).unwrap_err();
            assert_eq!(
                err,
                ConfigurationError::InvalidBounds {
                    axis: axis.letter(),
                    min: 10.0,
                    max: 10.0
                }
            );

            let min = Coord::default().with_axis(axis, 11.0);
            assert!(MachineCoordSystem::new(min, max).is_err());
        }
    }

    #[test]
    fn test_rejects_nan_bounds() {
        let min = Coord::new(f64::NAN, 0.0, 0.0, 0.0);
        let max = Coord::new(1.0, 1.0, 1.0, 1.0);
        assert!(MachineCoordSystem::new(min, max).is_err());
    }

    #[test]
    fn test_bounds_check_each_axis_both_sides() {
        let sys = MachineCoordSystem::new(
            Coord::new(0.0, 0.0, -30.0, 0.0),
            Coord::new(595.0, 360.0, 0.0, 365.0),
        )
        .unwrap();
        let inside = Coord::new(10.0, 10.0, -10.0, 10.0);
        assert!(sys.bounds_check(inside));

        for axis in Axis::ALL {
            let below = inside.with_axis(axis, sys.min().get(axis) - 0.5);
            let above = inside.with_axis(axis, sys.max().get(axis) + 0.5);
            let at_min = inside.with_axis(axis, sys.min().get(axis));
            let at_max = inside.with_axis(axis, sys.max().get(axis));
            assert!(!sys.bounds_check(below), "{} below", axis);
            assert!(!sys.bounds_check(above), "{} above", axis);
            assert!(sys.bounds_check(at_min), "{} at min", axis);
            assert!(sys.bounds_check(at_max), "{} at max", axis);
        }
    }
}
