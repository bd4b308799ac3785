use std::fmt;

use crate::error::{CoercionError, GeodefError, Result};
use crate::geometry::Plane;
use crate::math::vector::all_close;
use crate::math::{Point3, Tolerance, Vector3};

/// The type a parameter's raw input is coerced into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Scalar,
    Flag,
    Point,
    Vector,
    Plane,
}

impl ValueKind {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Scalar => "scalar",
            Self::Flag => "flag",
            Self::Point => "point",
            Self::Vector => "vector",
            Self::Plane => "plane",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A typed, coerced parameter value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Scalar(f64),
    Flag(bool),
    Point(Point3),
    Vector(Vector3),
    Plane(Plane),
}

impl Value {
    /// Returns the kind of this value.
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Scalar(_) => ValueKind::Scalar,
            Self::Flag(_) => ValueKind::Flag,
            Self::Point(_) => ValueKind::Point,
            Self::Vector(_) => ValueKind::Vector,
            Self::Plane(_) => ValueKind::Plane,
        }
    }

    #[must_use]
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Self::Scalar(x) => Some(*x),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_point(&self) -> Option<Point3> {
        match self {
            Self::Point(p) => Some(*p),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_vector(&self) -> Option<Vector3> {
        match self {
            Self::Vector(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_plane(&self) -> Option<Plane> {
        match self {
            Self::Plane(p) => Some(*p),
            _ => None,
        }
    }

    /// Numeric closeness for numbers, points, vectors and planes; equality
    /// for flags. Values of different kinds are never close.
    #[must_use]
    pub fn is_close(&self, expected: &Value, tol: &Tolerance) -> bool {
        match (self, expected) {
            (Self::Scalar(a), Self::Scalar(b)) => tol.is_close(*a, *b),
            (Self::Flag(a), Self::Flag(b)) => a == b,
            (Self::Point(a), Self::Point(b)) => all_close(a.coords.as_slice(), b.coords.as_slice(), tol),
            (Self::Vector(a), Self::Vector(b)) => all_close(a.as_slice(), b.as_slice(), tol),
            (Self::Plane(a), Self::Plane(b)) => a.is_same(b, tol),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(x) => write!(f, "{x}"),
            Self::Flag(b) => write!(f, "{b}"),
            Self::Point(p) => write!(f, "({}, {}, {})", p.x, p.y, p.z),
            Self::Vector(v) => write!(f, "[{}, {}, {}]", v.x, v.y, v.z),
            Self::Plane(p) => write!(f, "{p}"),
        }
    }
}

/// Untyped parameter input, as handed over by callers that build entities
/// from loosely typed data.
///
/// Coercion rules per target kind:
/// - scalar: a number, numeric text, a flag (`1` / `0`) or a single-element sequence
/// - flag: a flag, a number (non-zero is `true`) or text `true`/`false`/`1`/`0`
/// - point: three numbers
/// - vector: three numbers, or six numbers read as two points (their difference)
/// - plane: a [`Plane`], or four numbers (normal, distance)
///
/// Text holding comma-separated numbers is accepted wherever a sequence is.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Number(f64),
    Numbers(Vec<f64>),
    Text(String),
    Flag(bool),
    Plane(Plane),
}

impl RawValue {
    fn describe(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::Numbers(_) => "sequence",
            Self::Text(_) => "text",
            Self::Flag(_) => "flag",
            Self::Plane(_) => "plane",
        }
    }

    /// Coerces this raw input into a value of `kind`.
    ///
    /// `parameter` names the target parameter in error messages.
    ///
    /// # Errors
    ///
    /// Returns a [`CoercionError`] if the input cannot be read as `kind`, or a
    /// geometry error if four numbers describe a plane with a zero normal.
    pub fn coerce(self, parameter: &'static str, kind: ValueKind) -> Result<Value> {
        let wrong_type = |raw: &RawValue| CoercionError::WrongType {
            parameter,
            expected: kind.name(),
            actual: raw.describe(),
        };

        match kind {
            ValueKind::Scalar => match self {
                Self::Number(x) => Ok(Value::Scalar(x)),
                Self::Flag(b) => Ok(Value::Scalar(if b { 1.0 } else { 0.0 })),
                Self::Text(text) => {
                    let numbers = parse_numbers(parameter, &text)?;
                    single(parameter, &numbers).map(Value::Scalar)
                }
                Self::Numbers(numbers) => single(parameter, &numbers).map(Value::Scalar),
                raw @ Self::Plane(_) => Err(wrong_type(&raw).into()),
            },
            ValueKind::Flag => match self {
                Self::Flag(b) => Ok(Value::Flag(b)),
                Self::Number(x) => Ok(Value::Flag(x != 0.0)),
                Self::Text(text) => {
                    let lowered = text.trim().to_ascii_lowercase();
                    match lowered.as_str() {
                        "true" | "1" => Ok(Value::Flag(true)),
                        "false" | "0" => Ok(Value::Flag(false)),
                        _ => Err(wrong_type(&Self::Text(text)).into()),
                    }
                }
                raw => Err(wrong_type(&raw).into()),
            },
            ValueKind::Point => {
                let numbers = self.into_numbers(parameter, wrong_type)?;
                match numbers.as_slice() {
                    [x, y, z] => Ok(Value::Point(Point3::new(*x, *y, *z))),
                    _ => Err(arity(parameter, "3", numbers.len())),
                }
            }
            ValueKind::Vector => {
                let numbers = self.into_numbers(parameter, wrong_type)?;
                match numbers.as_slice() {
                    [x, y, z] => Ok(Value::Vector(Vector3::new(*x, *y, *z))),
                    [x0, y0, z0, x1, y1, z1] => {
                        Ok(Value::Vector(Vector3::new(x1 - x0, y1 - y0, z1 - z0)))
                    }
                    _ => Err(arity(parameter, "3 or 6", numbers.len())),
                }
            }
            ValueKind::Plane => match self {
                Self::Plane(plane) => Ok(Value::Plane(plane)),
                raw => {
                    let numbers = raw.into_numbers(parameter, wrong_type)?;
                    match numbers.as_slice() {
                        [x, y, z, d] => Ok(Value::Plane(Plane::new(Vector3::new(*x, *y, *z), *d)?)),
                        _ => Err(arity(parameter, "4", numbers.len())),
                    }
                }
            },
        }
    }

    fn into_numbers(
        self,
        parameter: &'static str,
        wrong_type: impl Fn(&RawValue) -> CoercionError,
    ) -> Result<Vec<f64>> {
        match self {
            Self::Numbers(numbers) => Ok(numbers),
            Self::Text(text) => parse_numbers(parameter, &text),
            raw => Err(wrong_type(&raw).into()),
        }
    }
}

fn arity(parameter: &'static str, expected: &'static str, actual: usize) -> GeodefError {
    CoercionError::WrongArity {
        parameter,
        expected,
        actual,
    }
    .into()
}

fn single(parameter: &'static str, numbers: &[f64]) -> Result<f64> {
    match numbers {
        [x] => Ok(*x),
        _ => Err(arity(parameter, "1", numbers.len())),
    }
}

fn parse_numbers(parameter: &'static str, text: &str) -> Result<Vec<f64>> {
    text.split(',')
        .map(|part| {
            let part = part.trim();
            part.parse::<f64>().map_err(|_| {
                GeodefError::from(CoercionError::NotANumber {
                    parameter,
                    text: part.to_owned(),
                })
            })
        })
        .collect()
}

impl From<f64> for RawValue {
    fn from(x: f64) -> Self {
        Self::Number(x)
    }
}

impl From<i32> for RawValue {
    fn from(x: i32) -> Self {
        Self::Number(f64::from(x))
    }
}

impl From<bool> for RawValue {
    fn from(b: bool) -> Self {
        Self::Flag(b)
    }
}

impl From<&str> for RawValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for RawValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl<const N: usize> From<[f64; N]> for RawValue {
    fn from(numbers: [f64; N]) -> Self {
        Self::Numbers(numbers.to_vec())
    }
}

impl From<&[f64]> for RawValue {
    fn from(numbers: &[f64]) -> Self {
        Self::Numbers(numbers.to_vec())
    }
}

impl From<Vec<f64>> for RawValue {
    fn from(numbers: Vec<f64>) -> Self {
        Self::Numbers(numbers)
    }
}

impl From<Point3> for RawValue {
    fn from(p: Point3) -> Self {
        Self::Numbers(vec![p.x, p.y, p.z])
    }
}

impl From<Vector3> for RawValue {
    fn from(v: Vector3) -> Self {
        Self::Numbers(vec![v.x, v.y, v.z])
    }
}

impl From<Plane> for RawValue {
    fn from(plane: Plane) -> Self {
        Self::Plane(plane)
    }
}

impl From<Value> for RawValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Scalar(x) => Self::Number(x),
            Value::Flag(b) => Self::Flag(b),
            Value::Point(p) => p.into(),
            Value::Vector(v) => v.into(),
            Value::Plane(plane) => Self::Plane(plane),
        }
    }
}
