use std::fmt;

use crate::error::Result;
use crate::math::vector::{all_close, assure_unit};
use crate::math::{Point3, Tolerance, Vector3, TOLERANCE};
use crate::resolve::{fmt_entity, Entity, Param, RawValue, Resolver, Value, ValueKind};

use super::Plane;

use SegmentParam::{Delta, DeltaUnit, EndPoint, Length, MidPoint, NormalPlane, StartPoint};

/// Parameters of a [`Segment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentParam {
    StartPoint,
    /// `end_point - start_point`.
    Delta,
    MidPoint,
    DeltaUnit,
    EndPoint,
    Length,
    /// Plane through the start point, perpendicular to the segment.
    NormalPlane,
}

impl Param for SegmentParam {
    const ENTITY: &'static str = "Segment";

    const ALL: &'static [Self] = &[StartPoint, Delta, MidPoint, DeltaUnit, EndPoint, Length, NormalPlane];

    fn index(self) -> usize {
        self as usize
    }

    fn name(self) -> &'static str {
        match self {
            StartPoint => "start_point",
            Delta => "delta",
            MidPoint => "mid_point",
            DeltaUnit => "delta_unit",
            EndPoint => "end_point",
            Length => "length",
            NormalPlane => "normal_plane",
        }
    }

    fn kind(self) -> ValueKind {
        match self {
            StartPoint | MidPoint | EndPoint => ValueKind::Point,
            Delta | DeltaUnit => ValueKind::Vector,
            Length => ValueKind::Scalar,
            NormalPlane => ValueKind::Plane,
        }
    }

    fn is_derived(self) -> bool {
        self != StartPoint
    }
}

impl fmt::Display for SegmentParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for SegmentParam {
    type Err = crate::error::ParameterError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

/// A directed line segment.
///
/// Defined by `start_point` together with one of `end_point`, `delta`, or
/// `delta_unit` and `length`.
#[derive(Debug)]
pub struct Segment {
    resolver: Resolver<SegmentParam>,
}

impl Segment {
    /// Starts building a segment.
    #[must_use]
    pub fn builder() -> SegmentBuilder {
        SegmentBuilder::default()
    }

    /// Creates a segment from parameters given by name, without verification.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown names or values that cannot be coerced.
    pub fn from_params<S: AsRef<str>>(params: impl IntoIterator<Item = (S, RawValue)>) -> Result<Self> {
        Ok(Self {
            resolver: Resolver::from_named(params, Tolerance::default())?,
        })
    }

    /// Returns the start point.
    ///
    /// # Errors
    ///
    /// Returns an error if the start point was not supplied.
    pub fn start_point(&self) -> Result<Point3> {
        self.get_point(StartPoint)
    }

    /// Returns the end point.
    ///
    /// # Errors
    ///
    /// Returns an error if the end point cannot be derived.
    pub fn end_point(&self) -> Result<Point3> {
        self.get_point(EndPoint)
    }

    /// Returns the vector from start to end point.
    ///
    /// # Errors
    ///
    /// Returns an error if the delta cannot be derived.
    pub fn delta(&self) -> Result<Vector3> {
        self.get_vector(Delta)
    }

    /// Returns the unit direction of the segment.
    ///
    /// # Errors
    ///
    /// Returns an error if the delta cannot be derived or has zero length.
    pub fn delta_unit(&self) -> Result<Vector3> {
        self.get_vector(DeltaUnit)
    }

    /// Returns the length of the segment.
    ///
    /// # Errors
    ///
    /// Returns an error if the delta cannot be derived.
    pub fn length(&self) -> Result<f64> {
        self.get_scalar(Length)
    }

    /// Returns the midpoint of the segment.
    ///
    /// # Errors
    ///
    /// Returns an error if the end point cannot be derived.
    pub fn mid_point(&self) -> Result<Point3> {
        self.get_point(MidPoint)
    }

    /// Returns the plane through the start point perpendicular to the segment.
    ///
    /// # Errors
    ///
    /// Returns an error if the segment has zero length.
    pub fn normal_plane(&self) -> Result<Plane> {
        self.get_plane(NormalPlane)
    }

    /// Rotates `point` by `angle` radians around the segment's line, using
    /// Rodrigues' formula with the axis running along `delta_unit`.
    ///
    /// A full-turn multiple of `angle` returns `point` unchanged without
    /// touching the segment, so it also works on a zero-length segment.
    ///
    /// # Errors
    ///
    /// Returns an error if the segment has zero length or cannot be resolved.
    pub fn rotate_point(&self, point: &Point3, angle: f64) -> Result<Point3> {
        let (sin, cos) = angle.sin_cos();
        if sin.abs() < TOLERANCE && (cos - 1.0).abs() < TOLERANCE {
            return Ok(*point);
        }
        let start = self.start_point()?;
        let axis = self.delta_unit()?;
        let ap = point - start;
        Ok(start + ap * cos + axis * ((1.0 - cos) * ap.dot(&axis)) + axis.cross(&ap) * sin)
    }

    /// Compares start point and delta within the tolerance of `self`.
    ///
    /// # Errors
    ///
    /// Returns an error if either segment cannot be resolved.
    pub fn is_same(&self, other: &Segment) -> Result<bool> {
        Ok(all_close(&other.to_array()?, &self.to_array()?, self.resolver.tolerance()))
    }

    /// Flattens to `[start.x, start.y, start.z, delta.x, delta.y, delta.z]`.
    ///
    /// # Errors
    ///
    /// Returns an error if the segment cannot be resolved.
    pub fn to_array(&self) -> Result<[f64; 6]> {
        let start = self.start_point()?;
        let delta = self.delta()?;
        Ok([start.x, start.y, start.z, delta.x, delta.y, delta.z])
    }

    fn calc_delta(&self) -> Result<Option<Vector3>> {
        if self.is_set(EndPoint) {
            if let (Some(start), Some(end)) = (self.lookup_point(StartPoint)?, self.lookup_point(EndPoint)?) {
                return Ok(Some(end - start));
            }
        }
        match (self.lookup_vector(DeltaUnit)?, self.lookup_scalar(Length)?) {
            (Some(unit), Some(length)) => Ok(Some(unit * length)),
            _ => Ok(None),
        }
    }

    fn calc_mid_point(&self) -> Result<Option<Point3>> {
        let Some(start) = self.lookup_point(StartPoint)? else {
            return Ok(None);
        };
        if self.is_set(EndPoint) {
            if let Some(end) = self.lookup_point(EndPoint)? {
                return Ok(Some(nalgebra::center(&start, &end)));
            }
        }
        Ok(self.lookup_vector(Delta)?.map(|delta| start + delta * 0.5))
    }

    fn calc_end_point(&self) -> Result<Option<Point3>> {
        match (self.lookup_point(StartPoint)?, self.lookup_vector(Delta)?) {
            (Some(start), Some(delta)) => Ok(Some(start + delta)),
            _ => Ok(None),
        }
    }

    fn calc_normal_plane(&self) -> Result<Option<Plane>> {
        match (self.lookup_point(StartPoint)?, self.lookup_vector(DeltaUnit)?) {
            (Some(start), Some(unit)) => Plane::from_point_and_normal(&start, &unit).map(Some),
            _ => Ok(None),
        }
    }
}

impl Entity for Segment {
    type Param = SegmentParam;

    const CANONICAL: &'static [SegmentParam] = &[StartPoint, Delta];

    fn from_resolver(resolver: Resolver<SegmentParam>) -> Self {
        Self { resolver }
    }

    fn resolver(&self) -> &Resolver<SegmentParam> {
        &self.resolver
    }

    fn calculate(&self, param: SegmentParam) -> Result<Option<Value>> {
        Ok(match param {
            StartPoint => None,
            Delta => self.calc_delta()?.map(Value::Vector),
            MidPoint => self.calc_mid_point()?.map(Value::Point),
            DeltaUnit => self
                .lookup_vector(Delta)?
                .map(|delta| assure_unit(&delta, "zero-length segment has no direction"))
                .transpose()?
                .map(Value::Vector),
            EndPoint => self.calc_end_point()?.map(Value::Point),
            Length => self.lookup_vector(Delta)?.map(|delta| Value::Scalar(delta.norm())),
            NormalPlane => self.calc_normal_plane()?.map(Value::Plane),
        })
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_entity(self, f)
    }
}

/// Builder for [`Segment`].
#[derive(Debug, Clone, Default)]
pub struct SegmentBuilder {
    params: Vec<(SegmentParam, RawValue)>,
    tolerance: Tolerance,
    verify: bool,
}

impl SegmentBuilder {
    /// Supplies any parameter.
    #[must_use]
    pub fn param(mut self, param: SegmentParam, value: impl Into<RawValue>) -> Self {
        self.params.push((param, value.into()));
        self
    }

    #[must_use]
    pub fn start_point(self, value: impl Into<RawValue>) -> Self {
        self.param(StartPoint, value)
    }

    #[must_use]
    pub fn end_point(self, value: impl Into<RawValue>) -> Self {
        self.param(EndPoint, value)
    }

    #[must_use]
    pub fn delta(self, value: impl Into<RawValue>) -> Self {
        self.param(Delta, value)
    }

    #[must_use]
    pub fn delta_unit(self, value: impl Into<RawValue>) -> Self {
        self.param(DeltaUnit, value)
    }

    #[must_use]
    pub fn length(self, value: impl Into<RawValue>) -> Self {
        self.param(Length, value)
    }

    #[must_use]
    pub fn tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    #[must_use]
    pub fn verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    /// Builds the segment.
    ///
    /// # Errors
    ///
    /// Returns an error if a value cannot be coerced, or if verification was
    /// requested and fails.
    pub fn build(self) -> Result<Segment> {
        let segment = Segment {
            resolver: Resolver::new(self.params, self.tolerance)?,
        };
        if self.verify {
            segment.verify()?;
        }
        Ok(segment)
    }
}
