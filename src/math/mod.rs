pub mod triangle;
pub mod vector;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Global geometric tolerance below which a length counts as zero.
pub const TOLERANCE: f64 = 1e-10;

/// Tolerance used when comparing two computed values for equality.
///
/// Two numbers `a` (actual) and `b` (expected) are close when
/// `|a - b| <= absolute + relative * |b|`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    /// Relative tolerance, scaled by the magnitude of the expected value.
    pub relative: f64,
    /// Absolute tolerance, dominant for values near zero.
    pub absolute: f64,
}

impl Tolerance {
    /// Creates a new tolerance.
    #[must_use]
    pub fn new(relative: f64, absolute: f64) -> Self {
        Self { relative, absolute }
    }

    /// Returns whether `actual` is close to `expected`.
    #[must_use]
    pub fn is_close(&self, actual: f64, expected: f64) -> bool {
        (actual - expected).abs() <= self.absolute + self.relative * expected.abs()
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            relative: 1e-5,
            absolute: 1e-8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tolerance_accepts_tiny_differences() {
        let tol = Tolerance::default();
        assert!(tol.is_close(1.0 + 1e-9, 1.0));
        assert!(tol.is_close(1e-9, 0.0));
        assert!(!tol.is_close(1.001, 1.0));
    }

    #[test]
    fn relative_part_scales_with_expected() {
        let tol = Tolerance::new(1e-3, 0.0);
        assert!(tol.is_close(1000.5, 1000.0));
        assert!(!tol.is_close(1.5, 1.0));
    }
}
