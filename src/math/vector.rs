use crate::error::{GeometryError, Result};
use crate::math::{Tolerance, Vector3, TOLERANCE};

/// Returns `v` scaled to unit length.
///
/// A vector that already has unit length is returned unchanged, so repeated
/// normalization is exact. `what` names the vector in the error reported for
/// a zero-length input.
///
/// # Errors
///
/// Returns [`GeometryError::Degenerate`] if `v` has zero length.
pub fn assure_unit(v: &Vector3, what: &str) -> Result<Vector3> {
    let len = v.norm();
    if len < TOLERANCE {
        return Err(GeometryError::Degenerate(format!("{what}: zero-length vector has no direction")).into());
    }
    if (len - 1.0).abs() < TOLERANCE {
        return Ok(*v);
    }
    Ok(v / len)
}

/// Returns a unit vector perpendicular to `v`.
///
/// Zeroes the component of smallest magnitude and swaps the other two,
/// negating the first, so the result is deterministic for a given input.
///
/// # Errors
///
/// Returns [`GeometryError::Degenerate`] if `v` has zero length.
pub fn orthogonal(v: &Vector3) -> Result<Vector3> {
    let mut smallest = 0;
    for i in 1..3 {
        if v[i].abs() < v[smallest].abs() {
            smallest = i;
        }
    }
    let j = (smallest + 1) % 3;
    let k = (smallest + 2) % 3;
    let mut result = Vector3::zeros();
    result[j] = -v[k];
    result[k] = v[j];
    assure_unit(&result, "orthogonal")
}

/// Element-wise closeness of two equally sized slices.
///
/// Slices of different lengths are never close.
#[must_use]
pub fn all_close(actual: &[f64], expected: &[f64], tol: &Tolerance) -> bool {
    actual.len() == expected.len()
        && actual
            .iter()
            .zip(expected)
            .all(|(a, e)| tol.is_close(*a, *e))
}
