//! Angle computations on triangles given by their corner points.

use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3};

/// Calculates the angle between `v1` and `v2`, in the range `[0, pi]`.
///
/// # Errors
///
/// Returns [`GeometryError::ZeroVector`] if either vector has zero length.
pub fn angle_between_vectors(v1: &Vector3, v2: &Vector3) -> Result<f64> {
    let n1 = v1.norm();
    let n2 = v2.norm();
    if n1 == 0.0 || n2 == 0.0 {
        return Err(GeometryError::ZeroVector.into());
    }
    let cos_a = (v1.dot(v2) / (n1 * n2)).clamp(-1.0, 1.0);
    Ok(cos_a.acos())
}

/// Calculates the angle `p1-p2-p3` (at corner `p2`), in the range `[0, pi]`.
///
/// # Errors
///
/// Returns [`GeometryError::ZeroVector`] if `p2` coincides with `p1` or `p3`.
pub fn angle_from_points(p1: &Point3, p2: &Point3, p3: &Point3) -> Result<f64> {
    angle_between_vectors(&(p1 - p2), &(p3 - p2))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::f64::consts::{FRAC_PI_2, PI};

    use approx::assert_relative_eq;

    use super::*;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn opposite_vectors() {
        let a = angle_between_vectors(&Vector3::new(1.0, 1.0, 1.0), &Vector3::new(-1.0, -1.0, -1.0)).unwrap();
        assert_relative_eq!(a, PI, epsilon = 1e-10);
    }

    #[test]
    fn parallel_vectors() {
        let a = angle_between_vectors(&Vector3::new(1.0, 1.0, 1.0), &Vector3::new(2.0, 2.0, 2.0)).unwrap();
        assert!(a.abs() < 1e-7);
    }

    #[test]
    fn corner_angle() {
        let a = angle_from_points(&p(1.0, 0.5, 0.5), &p(0.0, 1.5, 1.5), &p(-1.0, 1.0, 1.0)).unwrap();
        assert_relative_eq!(a, FRAC_PI_2, epsilon = 1e-10);
    }

    #[test]
    fn coincident_corner_is_an_error() {
        assert!(angle_from_points(&p(1.0, 0.0, 0.0), &p(1.0, 0.0, 0.0), &p(0.0, 1.0, 0.0)).is_err());
    }
}
