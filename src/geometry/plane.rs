use std::fmt;

use crate::error::Result;
use crate::math::vector::assure_unit;
use crate::math::{Point3, Tolerance, Vector3};

/// An infinite plane in 3D space.
///
/// Represented by a unit normal and the signed distance from the world
/// origin to the plane, measured along the normal. A negative distance means
/// the normal points towards the origin.
///
/// Implicit form: `normal . P = distance`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    normal: Vector3,
    distance: f64,
}

impl Plane {
    /// Creates a new plane from a normal vector and a signed distance.
    ///
    /// The normal is normalized.
    ///
    /// # Errors
    ///
    /// Returns an error if the normal vector is zero-length.
    pub fn new(normal: Vector3, distance: f64) -> Result<Self> {
        let normal = assure_unit(&normal, "plane normal")?;
        Ok(Self { normal, distance })
    }

    /// Creates the plane through `point` that is perpendicular to `normal`.
    ///
    /// # Errors
    ///
    /// Returns an error if the normal vector is zero-length.
    pub fn from_point_and_normal(point: &Point3, normal: &Vector3) -> Result<Self> {
        let normal = assure_unit(normal, "plane normal")?;
        Ok(Self {
            normal,
            distance: normal.dot(&point.coords),
        })
    }

    /// Returns the unit normal of the plane.
    #[must_use]
    pub fn normal(&self) -> &Vector3 {
        &self.normal
    }

    /// Returns the signed distance from the world origin.
    #[must_use]
    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Compares normal and distance within `tol`.
    #[must_use]
    pub fn is_same(&self, other: &Plane, tol: &Tolerance) -> bool {
        (0..3).all(|i| tol.is_close(self.normal[i], other.normal[i]))
            && tol.is_close(self.distance, other.distance)
    }

    /// Flattens the plane to `[nx, ny, nz, distance]`.
    #[must_use]
    pub fn to_array(&self) -> [f64; 4] {
        [self.normal.x, self.normal.y, self.normal.z, self.distance]
    }
}

impl fmt::Display for Plane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Plane([{}, {}, {}], {})",
            self.normal.x, self.normal.y, self.normal.z, self.distance
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn new_normalizes() {
        let plane = Plane::new(Vector3::new(0.0, 0.0, 5.0), 2.0).unwrap();
        assert_relative_eq!(*plane.normal(), Vector3::new(0.0, 0.0, 1.0));
        assert_relative_eq!(plane.distance(), 2.0);
    }

    #[test]
    fn zero_normal_is_rejected() {
        assert!(Plane::new(Vector3::zeros(), 1.0).is_err());
    }

    #[test]
    fn from_point_and_normal() {
        let plane =
            Plane::from_point_and_normal(&Point3::new(1.0, 1.0, 1.0), &Vector3::new(1.0, 1.0, 1.0))
                .unwrap();
        let n = 3.0_f64.sqrt();
        let expected = Plane::new(Vector3::new(1.0, 1.0, 1.0), n).unwrap();
        assert!(plane.is_same(&expected, &Tolerance::default()));
    }

    #[test]
    fn to_array_layout() {
        let plane = Plane::new(Vector3::new(1.0, 0.0, 0.0), -4.4).unwrap();
        assert_eq!(plane.to_array(), [1.0, 0.0, 0.0, -4.4]);
    }
}
