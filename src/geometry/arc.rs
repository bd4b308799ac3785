use std::f64::consts::PI;
use std::fmt;

use crate::error::{GeometryError, Result};
use crate::math::triangle::angle_from_points;
use crate::math::vector::assure_unit;
use crate::math::{Point3, Tolerance, Vector3, TOLERANCE};
use crate::resolve::{fmt_entity, Entity, Param, RawValue, Resolver, Value, ValueKind};

use ArcParam::{
    Angle, Apex, ArcHeight, ArcHeightUnit, ArcPoint, DOrigin, Diameter, EndPoint, EndRadius,
    EndRadiusUnit, EndTangent, EndTangentUnit, Height, Length, MidPoint, Origin, PlaneNormal, Radius,
    ReflexAngle, Secant, SecantUnit, StartPoint, StartRadius, StartRadiusUnit, StartTangent,
    StartTangentUnit,
};

/// Parameters of an [`Arc`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArcParam {
    /// Start point of the arc.
    StartPoint,
    /// Tangent at the start point, of radius length.
    StartTangent,
    StartTangentUnit,
    /// Vector from the origin to the start point.
    StartRadius,
    StartRadiusUnit,
    /// End point of the arc.
    EndPoint,
    /// Tangent at the end point, of radius length.
    EndTangent,
    EndTangentUnit,
    /// Vector from the origin to the end point.
    EndRadius,
    EndRadiusUnit,
    /// Chord vector from the start point to the end point.
    Secant,
    SecantUnit,
    /// Chord length.
    Length,
    /// Midpoint of the chord.
    MidPoint,
    /// Central angle in radians, swept around the plane normal.
    Angle,
    /// Whether the central angle exceeds pi.
    ReflexAngle,
    /// Unit normal of the arc plane; the arc runs counter-clockwise around it.
    PlaneNormal,
    Radius,
    Diameter,
    /// Center of the circle carrying the arc.
    Origin,
    ArcHeightUnit,
    /// Vector from the chord midpoint to the apex.
    ArcHeight,
    /// Length of the arc height vector.
    Height,
    /// Point of the arc farthest from the chord.
    Apex,
    /// Distance between the chord and the origin.
    DOrigin,
    /// Any third point on the arc; input only.
    ArcPoint,
}

impl Param for ArcParam {
    const ENTITY: &'static str = "Arc";

    const ALL: &'static [Self] = &[
        StartPoint,
        StartTangent,
        StartTangentUnit,
        StartRadius,
        StartRadiusUnit,
        EndPoint,
        EndTangent,
        EndTangentUnit,
        EndRadius,
        EndRadiusUnit,
        Secant,
        SecantUnit,
        Length,
        MidPoint,
        Angle,
        ReflexAngle,
        PlaneNormal,
        Radius,
        Diameter,
        Origin,
        ArcHeightUnit,
        ArcHeight,
        Height,
        Apex,
        DOrigin,
        ArcPoint,
    ];

    fn index(self) -> usize {
        self as usize
    }

    fn name(self) -> &'static str {
        match self {
            StartPoint => "start_point",
            StartTangent => "start_tangent",
            StartTangentUnit => "start_tangent_unit",
            StartRadius => "start_radius",
            StartRadiusUnit => "start_radius_unit",
            EndPoint => "end_point",
            EndTangent => "end_tangent",
            EndTangentUnit => "end_tangent_unit",
            EndRadius => "end_radius",
            EndRadiusUnit => "end_radius_unit",
            Secant => "secant",
            SecantUnit => "secant_unit",
            Length => "length",
            MidPoint => "mid_point",
            Angle => "angle",
            ReflexAngle => "reflex_angle",
            PlaneNormal => "plane_normal",
            Radius => "radius",
            Diameter => "diameter",
            Origin => "origin",
            ArcHeightUnit => "arc_height_unit",
            ArcHeight => "arc_height",
            Height => "height",
            Apex => "apex",
            DOrigin => "d_origin",
            ArcPoint => "arc_point",
        }
    }

    fn kind(self) -> ValueKind {
        match self {
            StartPoint | EndPoint | MidPoint | Origin | Apex | ArcPoint => ValueKind::Point,
            Length | Angle | Radius | Diameter | Height | DOrigin => ValueKind::Scalar,
            ReflexAngle => ValueKind::Flag,
            _ => ValueKind::Vector,
        }
    }

    fn is_derived(self) -> bool {
        !matches!(self, StartPoint | ArcPoint)
    }
}

impl fmt::Display for ArcParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for ArcParam {
    type Err = crate::error::ParameterError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

/// A circular arc in 3D space.
///
/// An arc can be defined by any of these parameter combinations (`secant`
/// may stand in for `end_point` everywhere):
///
/// * `start_point`, `end_point`, `angle`, `plane_normal`
/// * `start_point`, `angle`, `origin`, `plane_normal`
/// * `start_point`, `end_point`, `origin`, `plane_normal`
/// * `start_point`, `length`, `reflex_angle`, `origin`, `plane_normal`
/// * `start_point`, `end_point`, `arc_height`
/// * `start_point`, `end_point`, `arc_point`
///
/// Every other parameter is derived on first access and cached. Supplied
/// parameters are not cross-checked unless [`Entity::verify`] is called (or
/// [`ArcBuilder::verify`] is set).
///
/// The arc runs counter-clockwise from `start_point` to `end_point` when
/// looking against `plane_normal`, so `start_tangent = plane_normal x
/// start_radius`.
#[derive(Debug)]
pub struct Arc {
    resolver: Resolver<ArcParam>,
}

impl Arc {
    /// Starts building an arc.
    #[must_use]
    pub fn builder() -> ArcBuilder {
        ArcBuilder::default()
    }

    /// Creates an arc from parameters given by name, without verification.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown names or values that cannot be coerced.
    pub fn from_params<S: AsRef<str>>(params: impl IntoIterator<Item = (S, RawValue)>) -> Result<Self> {
        Ok(Self {
            resolver: Resolver::from_named(params, Tolerance::default())?,
        })
    }

    /// Measure in radians of the arc from `start_point` to `end_point`
    /// that passes through `arc_point`, on their circumscribed circle.
    ///
    /// Equals the central angle, twice the supplement of the inscribed angle
    /// `start-arc_point-end`, so the result lies in `[0, 2 pi]`: 0 when the
    /// arc point sits on the chord between the two ends, `2 pi` when start and
    /// end coincide.
    ///
    /// # Errors
    ///
    /// Returns an error if `arc_point` coincides with either end.
    pub fn central_angle(start_point: &Point3, end_point: &Point3, arc_point: &Point3) -> Result<f64> {
        let inscribed = angle_from_points(start_point, arc_point, end_point)?;
        Ok(2.0 * (PI - inscribed))
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

    /// Returns the chord vector from start to end point.
    ///
    /// # Errors
    ///
    /// Returns an error if the chord cannot be derived.
    pub fn secant(&self) -> Result<Vector3> {
        self.get_vector(Secant)
    }

    /// Returns the unit direction of the chord.
    ///
    /// # Errors
    ///
    /// Returns an error if the chord cannot be derived or has zero length.
    pub fn secant_unit(&self) -> Result<Vector3> {
        self.get_vector(SecantUnit)
    }

    /// Chord length.
    ///
    /// # Errors
    ///
    /// Returns an error if the chord cannot be derived.
    pub fn length(&self) -> Result<f64> {
        self.get_scalar(Length)
    }

    /// Returns the midpoint of the chord.
    ///
    /// # Errors
    ///
    /// Returns an error if the end point cannot be derived.
    pub fn mid_point(&self) -> Result<Point3> {
        self.get_point(MidPoint)
    }

    /// Returns the central angle in radians.
    ///
    /// # Errors
    ///
    /// Returns an error if the angle cannot be derived.
    pub fn angle(&self) -> Result<f64> {
        self.get_scalar(Angle)
    }

    /// Returns whether the central angle exceeds pi.
    ///
    /// # Errors
    ///
    /// Returns an error if the angle cannot be derived.
    pub fn reflex_angle(&self) -> Result<bool> {
        self.get_flag(ReflexAngle)
    }

    /// Returns the unit normal of the arc plane.
    ///
    /// # Errors
    ///
    /// Returns an error if the normal cannot be derived, or if the points
    /// it is derived from are collinear.
    pub fn plane_normal(&self) -> Result<Vector3> {
        self.get_vector(PlaneNormal)
    }

    /// Returns the radius of the carrying circle.
    ///
    /// # Errors
    ///
    /// Returns an error if the radius cannot be derived.
    pub fn radius(&self) -> Result<f64> {
        self.get_scalar(Radius)
    }

    /// Returns the diameter of the carrying circle.
    ///
    /// # Errors
    ///
    /// Returns an error if the radius cannot be derived.
    pub fn diameter(&self) -> Result<f64> {
        self.get_scalar(Diameter)
    }

    /// Returns the center of the carrying circle.
    ///
    /// # Errors
    ///
    /// Returns an error if the origin cannot be derived.
    pub fn origin(&self) -> Result<Point3> {
        self.get_point(Origin)
    }

    /// Returns the vector from the origin to the start point.
    ///
    /// # Errors
    ///
    /// Returns an error if the start radius cannot be derived.
    pub fn start_radius(&self) -> Result<Vector3> {
        self.get_vector(StartRadius)
    }

    /// Returns the unit direction from the origin to the start point.
    ///
    /// # Errors
    ///
    /// Returns an error if the start radius cannot be derived or is zero.
    pub fn start_radius_unit(&self) -> Result<Vector3> {
        self.get_vector(StartRadiusUnit)
    }

    /// Returns the tangent at the start point, scaled to the radius.
    ///
    /// # Errors
    ///
    /// Returns an error if the start tangent cannot be derived.
    pub fn start_tangent(&self) -> Result<Vector3> {
        self.get_vector(StartTangent)
    }

    /// Returns the unit tangent at the start point.
    ///
    /// # Errors
    ///
    /// Returns an error if the start tangent cannot be derived or is zero.
    pub fn start_tangent_unit(&self) -> Result<Vector3> {
        self.get_vector(StartTangentUnit)
    }

    /// Returns the vector from the origin to the end point.
    ///
    /// # Errors
    ///
    /// Returns an error if the end radius cannot be derived.
    pub fn end_radius(&self) -> Result<Vector3> {
        self.get_vector(EndRadius)
    }

    /// Returns the unit direction from the origin to the end point.
    ///
    /// # Errors
    ///
    /// Returns an error if the end radius cannot be derived or is zero.
    pub fn end_radius_unit(&self) -> Result<Vector3> {
        self.get_vector(EndRadiusUnit)
    }

    /// Returns the tangent at the end point, scaled to the radius.
    ///
    /// # Errors
    ///
    /// Returns an error if the end tangent cannot be derived.
    pub fn end_tangent(&self) -> Result<Vector3> {
        self.get_vector(EndTangent)
    }

    /// Returns the unit tangent at the end point.
    ///
    /// # Errors
    ///
    /// Returns an error if the end tangent cannot be derived or is zero.
    pub fn end_tangent_unit(&self) -> Result<Vector3> {
        self.get_vector(EndTangentUnit)
    }

    /// Returns the vector from the chord midpoint to the apex.
    ///
    /// # Errors
    ///
    /// Returns an error if the arc height cannot be derived.
    pub fn arc_height(&self) -> Result<Vector3> {
        self.get_vector(ArcHeight)
    }

    /// Returns the unit direction from the chord midpoint to the apex.
    ///
    /// # Errors
    ///
    /// Returns an error if the arc height direction cannot be derived.
    pub fn arc_height_unit(&self) -> Result<Vector3> {
        self.get_vector(ArcHeightUnit)
    }

    /// Returns the distance from the chord midpoint to the apex.
    ///
    /// # Errors
    ///
    /// Returns an error if the height cannot be derived.
    pub fn height(&self) -> Result<f64> {
        self.get_scalar(Height)
    }

    /// Returns the point of the arc farthest from the chord.
    ///
    /// # Errors
    ///
    /// Returns an error if the apex cannot be derived.
    pub fn apex(&self) -> Result<Point3> {
        self.get_point(Apex)
    }

    /// Distance between the chord and the origin.
    ///
    /// # Errors
    ///
    /// Returns an error if radius or height cannot be derived.
    pub fn d_origin(&self) -> Result<f64> {
        self.get_scalar(DOrigin)
    }

    // Derivations. Each returns `Ok(None)` when the parameters it needs are
    // not reachable; alternatives are tried in the order written.

    fn arc_point_or_apex(&self) -> Result<Option<Point3>> {
        if self.is_set(ArcPoint) {
            self.lookup_point(ArcPoint)
        } else {
            self.lookup_point(Apex)
        }
    }

    fn calc_start_tangent(&self) -> Result<Option<Vector3>> {
        match (self.lookup_vector(PlaneNormal)?, self.lookup_vector(StartRadius)?) {
            (Some(normal), Some(radius)) => Ok(Some(normal.cross(&radius))),
            _ => Ok(None),
        }
    }

    fn calc_start_radius(&self) -> Result<Option<Vector3>> {
        match (self.lookup_point(Origin)?, self.lookup_point(StartPoint)?) {
            (Some(origin), Some(start)) => Ok(Some(start - origin)),
            _ => Ok(None),
        }
    }

    /// `end = origin + cos(angle) * start_radius + sin(angle) * start_tangent`.
    ///
    /// Without an angle, a supplied chord `length` and `reflex_angle` give
    /// `cos = 1 - l^2 / (2 r^2)` and `sin = +-sqrt(1 - cos^2)`, negative for
    /// a reflex arc.
    fn calc_end_point(&self) -> Result<Option<Point3>> {
        let Some(start) = self.lookup_point(StartPoint)? else {
            return Ok(None);
        };
        if self.is_set(Secant) {
            if let Some(secant) = self.lookup_vector(Secant)? {
                return Ok(Some(start + secant));
            }
        }

        let rotation = if self.is_set(Length) && self.is_set(ReflexAngle) && !self.is_set(Angle) {
            match (
                self.lookup_scalar(Radius)?,
                self.lookup_scalar(Length)?,
                self.lookup_flag(ReflexAngle)?,
            ) {
                (Some(radius), Some(length), Some(reflex)) => Some(chord_rotation(length, radius, reflex)?),
                _ => None,
            }
        } else {
            self.lookup_scalar(Angle)?.map(|angle| (angle.cos(), angle.sin()))
        };
        let Some((cos, sin)) = rotation else {
            return Ok(None);
        };

        match (
            self.lookup_point(Origin)?,
            self.lookup_vector(StartRadius)?,
            self.lookup_vector(StartTangent)?,
        ) {
            (Some(origin), Some(radius), Some(tangent)) => Ok(Some(origin + radius * cos + tangent * sin)),
            _ => Ok(None),
        }
    }

    fn calc_end_tangent(&self) -> Result<Option<Vector3>> {
        match (self.lookup_vector(PlaneNormal)?, self.lookup_vector(EndRadius)?) {
            (Some(normal), Some(radius)) => Ok(Some(normal.cross(&radius))),
            _ => Ok(None),
        }
    }

    fn calc_end_radius(&self) -> Result<Option<Vector3>> {
        match (self.lookup_point(EndPoint)?, self.lookup_point(Origin)?) {
            (Some(end), Some(origin)) => Ok(Some(end - origin)),
            _ => Ok(None),
        }
    }

    fn calc_secant(&self) -> Result<Option<Vector3>> {
        match (self.lookup_point(StartPoint)?, self.lookup_point(EndPoint)?) {
            (Some(start), Some(end)) => Ok(Some(end - start)),
            _ => Ok(None),
        }
    }

    fn calc_mid_point(&self) -> Result<Option<Point3>> {
        match (self.lookup_point(StartPoint)?, self.lookup_point(EndPoint)?) {
            (Some(start), Some(end)) => Ok(Some(nalgebra::center(&start, &end))),
            _ => Ok(None),
        }
    }

    /// From a supplied `reflex_angle` with chord length and radius:
    /// `2 asin(l / 2r)`, or `2 (pi - asin(l / 2r))` for a reflex arc.
    /// Otherwise the central angle through `arc_point` (or the apex).
    fn calc_angle(&self) -> Result<Option<f64>> {
        if self.is_set(ReflexAngle) {
            if let (Some(reflex), Some(length), Some(radius)) = (
                self.lookup_flag(ReflexAngle)?,
                self.lookup_scalar(Length)?,
                self.lookup_scalar(Radius)?,
            ) {
                let half = (0.5 * length / radius).min(1.0).asin();
                let half = if reflex { PI - half } else { half };
                return Ok(Some(2.0 * half));
            }
        }
        let (Some(start), Some(end)) = (self.lookup_point(StartPoint)?, self.lookup_point(EndPoint)?) else {
            return Ok(None);
        };
        let Some(arc_point) = self.arc_point_or_apex()? else {
            return Ok(None);
        };
        Self::central_angle(&start, &end, &arc_point).map(Some)
    }

    fn calc_plane_normal(&self) -> Result<Option<Vector3>> {
        let arc_point = self.arc_point_or_apex()?;
        let start = self.lookup_point(StartPoint)?;
        let end = self.lookup_point(EndPoint)?;
        let (Some(arc_point), Some(start), Some(end)) = (arc_point, start, end) else {
            return Ok(None);
        };
        let normal = (end - arc_point).cross(&(start - arc_point));
        assure_unit(&normal, "<arc_point>, <start_point>, <end_point> should not be collinear").map(Some)
    }

    /// Tried in order while the origin is unknown: from the arc height,
    /// `r = h/2 + l^2 / 8h`; from the angle, `r = l / (2 sin(angle/2))`.
    /// Finally the length of the start radius.
    fn calc_radius(&self) -> Result<Option<f64>> {
        if !self.is_set(Origin) {
            if self.is_set(ArcHeight) {
                if let (Some(height), Some(length)) = (self.lookup_scalar(Height)?, self.lookup_scalar(Length)?) {
                    if height.abs() < TOLERANCE {
                        return Err(GeometryError::Degenerate("<arc_height> should be non-zero".into()).into());
                    }
                    return Ok(Some(0.5 * height + 0.125 * length * length / height));
                }
            }
            if self.is_set(Angle) || self.is_set(ArcPoint) {
                if let (Some(angle), Some(length)) = (self.lookup_scalar(Angle)?, self.lookup_scalar(Length)?) {
                    let half_sin = (0.5 * angle).sin();
                    if half_sin.abs() < TOLERANCE {
                        return Err(GeometryError::Degenerate(format!(
                            "<angle> {angle} leaves the radius undetermined"
                        ))
                        .into());
                    }
                    return Ok(Some(0.5 * length / half_sin));
                }
            }
        }
        Ok(self.lookup_vector(StartRadius)?.map(|radius| radius.norm()))
    }

    fn calc_origin(&self) -> Result<Option<Point3>> {
        match (
            self.lookup_vector(ArcHeightUnit)?,
            self.lookup_scalar(Height)?,
            self.lookup_scalar(Radius)?,
            self.lookup_point(MidPoint)?,
        ) {
            (Some(unit), Some(height), Some(radius), Some(mid)) => Ok(Some(mid + unit * (height - radius))),
            _ => Ok(None),
        }
    }

    fn calc_arc_height_unit(&self) -> Result<Option<Vector3>> {
        if self.is_set(ArcHeight) {
            if let Some(arc_height) = self.lookup_vector(ArcHeight)? {
                return assure_unit(&arc_height, "<arc_height> should be non-zero").map(Some);
            }
        }
        match (self.lookup_vector(PlaneNormal)?, self.lookup_vector(SecantUnit)?) {
            (Some(normal), Some(secant_unit)) => Ok(Some(secant_unit.cross(&normal))),
            _ => Ok(None),
        }
    }

    fn calc_arc_height(&self) -> Result<Option<Vector3>> {
        match (self.lookup_scalar(Height)?, self.lookup_vector(ArcHeightUnit)?) {
            (Some(height), Some(unit)) => Ok(Some(unit * height)),
            _ => Ok(None),
        }
    }

    fn calc_height(&self) -> Result<Option<f64>> {
        if self.is_set(ArcHeight) {
            if let Some(arc_height) = self.lookup_vector(ArcHeight)? {
                return Ok(Some(arc_height.norm()));
            }
        }
        match (self.lookup_scalar(Radius)?, self.lookup_scalar(Angle)?) {
            (Some(radius), Some(angle)) => Ok(Some(radius * (1.0 - (0.5 * angle).cos()))),
            _ => Ok(None),
        }
    }

    fn calc_apex(&self) -> Result<Option<Point3>> {
        if self.is_set(Origin) && self.is_set(PlaneNormal) {
            if let (Some(radius), Some(unit), Some(origin)) = (
                self.lookup_scalar(Radius)?,
                self.lookup_vector(ArcHeightUnit)?,
                self.lookup_point(Origin)?,
            ) {
                return Ok(Some(origin + unit * radius));
            }
        }
        match (self.lookup_point(MidPoint)?, self.lookup_vector(ArcHeight)?) {
            (Some(mid), Some(arc_height)) => Ok(Some(mid + arc_height)),
            _ => Ok(None),
        }
    }

    fn calc_d_origin(&self) -> Result<Option<f64>> {
        match (self.lookup_scalar(Radius)?, self.lookup_scalar(Height)?) {
            (Some(radius), Some(height)) => Ok(Some((radius - height).abs())),
            _ => Ok(None),
        }
    }

    fn unit_of(&self, param: ArcParam, what: &str) -> Result<Option<Vector3>> {
        self.lookup_vector(param)?.map(|v| assure_unit(&v, what)).transpose()
    }
}

/// Cosine and sine of the central angle subtending a chord of `length`.
fn chord_rotation(length: f64, radius: f64, reflex: bool) -> Result<(f64, f64)> {
    let ratio = length / radius;
    if ratio > 2.0 {
        return Err(GeometryError::Degenerate(format!(
            "<length> {length} should be less than <diameter> {}",
            2.0 * radius
        ))
        .into());
    }
    let cos = 1.0 - 0.5 * ratio * ratio;
    let sin = (1.0 - cos * cos).max(0.0).sqrt();
    Ok((cos, if reflex { -sin } else { sin }))
}

impl Entity for Arc {
    type Param = ArcParam;

    const CANONICAL: &'static [ArcParam] = &[StartPoint, EndPoint, Secant, Origin, Angle, PlaneNormal, ArcHeight];

    fn from_resolver(resolver: Resolver<ArcParam>) -> Self {
        Self { resolver }
    }

    fn resolver(&self) -> &Resolver<ArcParam> {
        &self.resolver
    }

    fn calculate(&self, param: ArcParam) -> Result<Option<Value>> {
        Ok(match param {
            StartPoint | ArcPoint => None,
            StartTangent => self.calc_start_tangent()?.map(Value::Vector),
            StartTangentUnit => self.unit_of(StartTangent, "<start_tangent> of zero length")?.map(Value::Vector),
            StartRadius => self.calc_start_radius()?.map(Value::Vector),
            StartRadiusUnit => self.unit_of(StartRadius, "<start_radius> should be non-zero")?.map(Value::Vector),
            EndPoint => self.calc_end_point()?.map(Value::Point),
            EndTangent => self.calc_end_tangent()?.map(Value::Vector),
            EndTangentUnit => self.unit_of(EndTangent, "<end_tangent> of zero length")?.map(Value::Vector),
            EndRadius => self.calc_end_radius()?.map(Value::Vector),
            EndRadiusUnit => self.unit_of(EndRadius, "<end_radius> should be non-zero")?.map(Value::Vector),
            Secant => self.calc_secant()?.map(Value::Vector),
            SecantUnit => self.unit_of(Secant, "<secant> must be non-zero")?.map(Value::Vector),
            Length => self.lookup_vector(Secant)?.map(|secant| Value::Scalar(secant.norm())),
            MidPoint => self.calc_mid_point()?.map(Value::Point),
            Angle => self.calc_angle()?.map(Value::Scalar),
            ReflexAngle => self.lookup_scalar(Angle)?.map(|angle| Value::Flag(angle.abs() > PI)),
            PlaneNormal => self.calc_plane_normal()?.map(Value::Vector),
            Radius => self.calc_radius()?.map(Value::Scalar),
            Diameter => self.lookup_scalar(Radius)?.map(|radius| Value::Scalar(2.0 * radius)),
            Origin => self.calc_origin()?.map(Value::Point),
            ArcHeightUnit => self.calc_arc_height_unit()?.map(Value::Vector),
            ArcHeight => self.calc_arc_height()?.map(Value::Vector),
            Height => self.calc_height()?.map(Value::Scalar),
            Apex => self.calc_apex()?.map(Value::Point),
            DOrigin => self.calc_d_origin()?.map(Value::Scalar),
        })
    }
}

impl fmt::Display for Arc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_entity(self, f)
    }
}

/// Builder for [`Arc`].
///
/// Setters accept anything convertible to [`RawValue`]: nalgebra points and
/// vectors, arrays, comma-separated text, numbers and flags.
#[derive(Debug, Clone, Default)]
pub struct ArcBuilder {
    params: Vec<(ArcParam, RawValue)>,
    tolerance: Tolerance,
    verify: bool,
}

impl ArcBuilder {
    /// Supplies any parameter.
    #[must_use]
    pub fn param(mut self, param: ArcParam, value: impl Into<RawValue>) -> Self {
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
    pub fn secant(self, value: impl Into<RawValue>) -> Self {
        self.param(Secant, value)
    }

    #[must_use]
    pub fn angle(self, value: impl Into<RawValue>) -> Self {
        self.param(Angle, value)
    }

    #[must_use]
    pub fn plane_normal(self, value: impl Into<RawValue>) -> Self {
        self.param(PlaneNormal, value)
    }

    #[must_use]
    pub fn origin(self, value: impl Into<RawValue>) -> Self {
        self.param(Origin, value)
    }

    #[must_use]
    pub fn length(self, value: impl Into<RawValue>) -> Self {
        self.param(Length, value)
    }

    #[must_use]
    pub fn reflex_angle(self, value: impl Into<RawValue>) -> Self {
        self.param(ReflexAngle, value)
    }

    #[must_use]
    pub fn arc_height(self, value: impl Into<RawValue>) -> Self {
        self.param(ArcHeight, value)
    }

    /// Supplies a third point lying on the arc.
    #[must_use]
    pub fn arc_point(self, value: impl Into<RawValue>) -> Self {
        self.param(ArcPoint, value)
    }

    /// Tolerance for [`Entity::verify`].
    #[must_use]
    pub fn tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Verify the parameters right after construction.
    #[must_use]
    pub fn verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    /// Builds the arc.
    ///
    /// # Errors
    ///
    /// Returns an error if a value cannot be coerced, or if verification was
    /// requested and fails.
    pub fn build(self) -> Result<Arc> {
        let arc = Arc {
            resolver: Resolver::new(self.params, self.tolerance)?,
        };
        if self.verify {
            arc.verify()?;
        }
        Ok(arc)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, FRAC_PI_6, FRAC_PI_8, TAU};

    use approx::{assert_abs_diff_eq, assert_relative_eq};

    use super::*;
    use crate::error::{GeodefError, ParameterError};

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    /// Three arcs, each described by (more than) every parameter the
    /// construction combinations draw from.
    fn reference_arcs() -> Vec<Vec<(ArcParam, RawValue)>> {
        let s2 = 2.0_f64.sqrt();
        let r2 = 1.0 / s2;
        vec![
            vec![
                (StartPoint, "0, 1, -1".into()),
                (EndPoint, "0, -1, -1".into()),
                (PlaneNormal, "1, 0, 0".into()),
                (Angle, (3.0 * FRAC_PI_2).into()),
                (Origin, "0, 0, 0".into()),
                (Secant, "0, -2, 0".into()),
                (Length, 2.0.into()),
                (ReflexAngle, true.into()),
                (ArcHeight, [0.0, 0.0, 1.0 + s2].into()),
                (ArcPoint, "0, 1, 1".into()),
                (MidPoint, "0, 0, -1".into()),
                (Apex, [0.0, 0.0, s2].into()),
                (Radius, s2.into()),
                (Diameter, (2.0 * s2).into()),
            ],
            vec![
                (StartPoint, "0, 1, 1".into()),
                (EndPoint, "0, -1, 1".into()),
                (PlaneNormal, "1, 0, 0".into()),
                (Angle, FRAC_PI_2.into()),
                (Origin, "0, 0, 0".into()),
                (Secant, "0, -2, 0".into()),
                (Length, 2.0.into()),
                (ReflexAngle, false.into()),
                (ArcHeight, [0.0, 0.0, s2 - 1.0].into()),
                (ArcPoint, [0.0, 0.5_f64.sqrt(), 1.5_f64.sqrt()].into()),
                (MidPoint, "0, 0, 1".into()),
                (Apex, [0.0, 0.0, s2].into()),
                (Radius, s2.into()),
                (Diameter, (2.0 * s2).into()),
            ],
            vec![
                (StartPoint, "0, -1, 0".into()),
                (EndPoint, [0.0, -r2, r2].into()),
                (PlaneNormal, "-1, 0, 0".into()),
                (Angle, FRAC_PI_4.into()),
                (Origin, "0, 0, 0".into()),
                (Secant, [0.0, 1.0 - r2, r2].into()),
                (Length, (2.0 - s2).sqrt().into()),
                (ReflexAngle, false.into()),
                (
                    ArcHeight,
                    [0.0, 0.5 * (1.0 + r2) - FRAC_PI_8.cos(), FRAC_PI_8.sin() - 0.5 * r2].into(),
                ),
                (ArcPoint, [0.0, -FRAC_PI_6.cos(), FRAC_PI_6.sin()].into()),
                (MidPoint, [0.0, -0.5 * (1.0 + r2), 0.5 * r2].into()),
                (Apex, [0.0, -FRAC_PI_8.cos(), FRAC_PI_8.sin()].into()),
                (Radius, 1.0.into()),
                (Diameter, 2.0.into()),
            ],
        ]
    }

    const COMBINATIONS: &[&[ArcParam]] = &[
        &[StartPoint, EndPoint, Angle, PlaneNormal],
        &[StartPoint, Secant, Angle, PlaneNormal],
        &[StartPoint, Angle, Origin, PlaneNormal],
        &[StartPoint, EndPoint, Origin, PlaneNormal],
        &[StartPoint, Secant, Origin, PlaneNormal],
        &[StartPoint, Length, ReflexAngle, Origin, PlaneNormal],
        &[StartPoint, EndPoint, ArcHeight],
        &[StartPoint, Secant, ArcHeight],
        &[StartPoint, EndPoint, ArcPoint],
        &[StartPoint, Secant, ArcPoint],
    ];

    fn tight() -> Tolerance {
        Tolerance::new(1e-10, 1e-10)
    }

    fn expected(data: &[(ArcParam, RawValue)]) -> Vec<(ArcParam, Value)> {
        data.iter()
            .map(|(param, raw)| (*param, raw.clone().coerce(param.name(), param.kind()).unwrap()))
            .collect()
    }

    fn build(data: &[(ArcParam, RawValue)], combination: &[ArcParam]) -> Arc {
        data.iter()
            .filter(|(param, _)| combination.contains(param))
            .fold(Arc::builder(), |builder, (param, raw)| builder.param(*param, raw.clone()))
            .build()
            .unwrap()
    }

    fn check_all(arc: &Arc, expected: &[(ArcParam, Value)], order: &[ArcParam], context: &str) {
        for &param in order {
            let actual = arc
                .get(param)
                .unwrap_or_else(|e| panic!("{context}: <{param}> failed: {e}"));
            if let Some((_, want)) = expected.iter().find(|(p, _)| *p == param) {
                assert!(
                    actual.is_close(want, &tight()),
                    "{context}: <{param}> expected {want}, found {actual}"
                );
            }
        }
    }

    fn readable() -> Vec<ArcParam> {
        ArcParam::ALL.iter().copied().filter(|p| *p != ArcPoint).collect()
    }

    #[test]
    fn every_combination_derives_every_parameter() {
        for (i, data) in reference_arcs().iter().enumerate() {
            let expected = expected(data);
            for combination in COMBINATIONS {
                for param in readable() {
                    // a fresh arc per parameter, so each is derived from the inputs alone
                    let arc = build(data, combination);
                    check_all(&arc, &expected, &[param], &format!("arc {i} from {combination:?}"));
                }
            }
        }
    }

    #[test]
    fn every_combination_verifies() {
        for (i, data) in reference_arcs().iter().enumerate() {
            let expected = expected(data);
            for combination in COMBINATIONS {
                let arc = build(data, combination);
                arc.verify()
                    .unwrap_or_else(|e| panic!("arc {i} from {combination:?}: {e}"));
                check_all(&arc, &expected, &readable(), &format!("verified arc {i} from {combination:?}"));
            }
        }
    }

    #[test]
    fn access_order_does_not_matter() {
        let mut reversed = readable();
        reversed.reverse();
        for (i, data) in reference_arcs().iter().enumerate() {
            let expected = expected(data);
            for combination in COMBINATIONS {
                let arc = build(data, combination);
                check_all(&arc, &expected, &reversed, &format!("arc {i} from {combination:?}, reversed"));
            }
        }
    }

    #[test]
    fn reflex_arc_from_end_points_and_origin() {
        let arc = Arc::builder()
            .start_point(p(0.0, 1.0, -1.0))
            .end_point(p(0.0, -1.0, -1.0))
            .plane_normal(Vector3::new(1.0, 0.0, 0.0))
            .origin(p(0.0, 0.0, 0.0))
            .build()
            .unwrap();
        assert_relative_eq!(arc.angle().unwrap(), 3.0 * FRAC_PI_2, epsilon = 1e-10);
        assert_abs_diff_eq!(arc.origin().unwrap(), p(0.0, 0.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(arc.radius().unwrap(), 2.0_f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(arc.length().unwrap(), 2.0, epsilon = 1e-12);
        assert!(arc.reflex_angle().unwrap());
        assert_relative_eq!(arc.d_origin().unwrap(), 1.0, epsilon = 1e-10);
    }

    #[test]
    fn end_points_and_normal_alone_are_underdetermined() {
        let arc = Arc::builder()
            .start_point("0, 1, -1")
            .end_point("0, -1, -1")
            .plane_normal("1, 0, 0")
            .build()
            .unwrap();
        // the chord is still known
        assert_relative_eq!(arc.length().unwrap(), 2.0);
        assert!(matches!(
            arc.angle().unwrap_err(),
            GeodefError::Parameter(ParameterError::InsufficientData { parameter: "angle", .. })
        ));
        assert!(matches!(
            arc.verify().unwrap_err(),
            GeodefError::Parameter(ParameterError::IncompleteDefinition { .. })
        ));
    }

    #[test]
    fn verify_catches_wrong_angle() {
        let result = Arc::builder()
            .start_point("0, 1, -1")
            .end_point("0, -1, -1")
            .plane_normal("1, 0, 0")
            .origin("0, 0, 0")
            .angle(FRAC_PI_2)
            .verify(true)
            .build();
        assert!(matches!(
            result.unwrap_err(),
            GeodefError::Parameter(ParameterError::Inconsistent { .. })
        ));

        // unverified, the same input is accepted as is
        let arc = Arc::builder()
            .start_point("0, 1, -1")
            .end_point("0, -1, -1")
            .plane_normal("1, 0, 0")
            .origin("0, 0, 0")
            .angle(FRAC_PI_2)
            .build()
            .unwrap();
        assert_relative_eq!(arc.angle().unwrap(), FRAC_PI_2);
    }

    #[test]
    fn verify_catches_wrong_reflex_flag() {
        let result = Arc::builder()
            .start_point("0, 1, 1")
            .end_point("0, -1, 1")
            .arc_height([0.0, 0.0, 2.0_f64.sqrt() - 1.0])
            .reflex_angle(true)
            .verify(true)
            .build();
        assert!(matches!(
            result.unwrap_err(),
            GeodefError::Parameter(ParameterError::Inconsistent { parameter: "reflex_angle", .. })
        ));

        let arc = Arc::builder()
            .start_point("0, 1, 1")
            .end_point("0, -1, 1")
            .arc_height([0.0, 0.0, 2.0_f64.sqrt() - 1.0])
            .reflex_angle(false)
            .verify(true)
            .build()
            .unwrap();
        assert_relative_eq!(arc.angle().unwrap(), FRAC_PI_2, epsilon = 1e-10);
    }

    #[test]
    fn zero_arc_height_is_degenerate() {
        let arc = Arc::builder()
            .start_point("0, 1, 0")
            .end_point("0, -1, 0")
            .arc_height("0, 0, 0")
            .build()
            .unwrap();
        assert!(matches!(
            arc.radius().unwrap_err(),
            GeodefError::Geometry(GeometryError::Degenerate(_))
        ));
    }

    #[test]
    fn full_turn_or_zero_angle_leaves_radius_degenerate() {
        for angle in [0.0, TAU] {
            let arc = Arc::builder()
                .start_point("1, 0, 0")
                .end_point("-1, 0, 0")
                .angle(angle)
                .build()
                .unwrap();
            assert!(matches!(
                arc.radius().unwrap_err(),
                GeodefError::Geometry(GeometryError::Degenerate(_))
            ));
        }
    }

    #[test]
    fn unknown_parameter() {
        let err = Arc::from_params([
            ("start_point", RawValue::from("1,2,3")),
            ("wrong_param_for_arc", RawValue::from("some value")),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("wrong_param_for_arc"));
        assert!(matches!(err, GeodefError::Parameter(ParameterError::Unknown { entity: "Arc", .. })));
    }

    #[test]
    fn from_named_parameters() {
        let arc = Arc::from_params([
            ("start_point", RawValue::from("0, 1, 1")),
            ("end_point", RawValue::from("0, -1, 1")),
            ("arc_point", RawValue::from([0.0, 0.5_f64.sqrt(), 1.5_f64.sqrt()])),
        ])
        .unwrap();
        assert_relative_eq!(arc.angle().unwrap(), FRAC_PI_2, epsilon = 1e-10);
        assert_relative_eq!(arc.plane_normal().unwrap(), Vector3::new(1.0, 0.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn central_angles() {
        let cases = [
            (p(1.0, 1.0, 1.0), p(-1.0, -1.0, -1.0), p(0.5, 0.5, 0.5), 0.0),
            (p(1.0, 1.0, 1.0), p(1.0, 1.0, 1.0), p(2.0, 2.0, 2.0), TAU),
            (p(1.0, 0.5, 0.5), p(-1.0, 1.0, 1.0), p(0.0, 1.5, 1.5), PI),
            (p(FRAC_PI_4.cos(), 0.5, 0.5), p(0.0, 0.0, 0.5), p(0.0, 0.0, 0.0), 4.0 * PI / 3.0),
            (p(0.0, 0.0, 0.0), p(0.0, 0.0, 0.5), p(FRAC_PI_4.cos(), 0.5, 0.5), 5.0 * PI / 3.0),
        ];
        for (start, end, arc_point, want) in cases {
            let angle = Arc::central_angle(&start, &end, &arc_point).unwrap();
            assert_abs_diff_eq!(angle, want, epsilon = 1e-7);
            assert!((0.0..=TAU).contains(&angle));
        }
    }

    #[test]
    fn central_angle_rejects_arc_point_on_end() {
        assert!(Arc::central_angle(&p(0.0, 0.0, 0.0), &p(1.0, 0.0, 0.0), &p(1.0, 0.0, 0.0)).is_err());
    }

    #[test]
    fn missing_start_point() {
        let arc = Arc::builder().end_point("1, 0, 0").angle(1.0).build().unwrap();
        assert!(matches!(
            arc.start_point().unwrap_err(),
            GeodefError::Parameter(ParameterError::Missing { parameter: "start_point", .. })
        ));
        assert!(matches!(
            arc.radius().unwrap_err(),
            GeodefError::Parameter(ParameterError::InsufficientData { parameter: "radius", .. })
        ));
    }

    #[test]
    fn chord_longer_than_diameter_is_degenerate() {
        let arc = Arc::builder()
            .start_point("1, 0, 0")
            .origin("0, 0, 0")
            .plane_normal("0, 0, 1")
            .length(3.0)
            .reflex_angle(false)
            .build()
            .unwrap();
        assert!(matches!(
            arc.end_point().unwrap_err(),
            GeodefError::Geometry(GeometryError::Degenerate(_))
        ));
    }

    #[test]
    fn collinear_arc_point_is_degenerate() {
        let arc = Arc::builder()
            .start_point("0, 0, 0")
            .end_point("2, 0, 0")
            .arc_point("3, 0, 0")
            .build()
            .unwrap();
        assert!(matches!(
            arc.plane_normal().unwrap_err(),
            GeodefError::Geometry(GeometryError::Degenerate(_))
        ));
    }

    #[test]
    fn quarter_arc_tangents() {
        let arc = Arc::builder()
            .start_point("1, 0, 0")
            .origin("0, 0, 0")
            .plane_normal("0, 0, 1")
            .angle(FRAC_PI_2)
            .build()
            .unwrap();
        assert_abs_diff_eq!(arc.end_point().unwrap(), p(0.0, 1.0, 0.0), epsilon = 1e-12);
        assert_abs_diff_eq!(arc.start_tangent_unit().unwrap(), Vector3::new(0.0, 1.0, 0.0), epsilon = 1e-12);
        assert_abs_diff_eq!(arc.end_tangent_unit().unwrap(), Vector3::new(-1.0, 0.0, 0.0), epsilon = 1e-12);
        assert_abs_diff_eq!(arc.end_radius_unit().unwrap(), Vector3::new(0.0, 1.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(arc.diameter().unwrap(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn derived_values_are_cached() {
        let arc = Arc::builder()
            .start_point("1, 0, 0")
            .end_point("0, 1, 0")
            .arc_height([0.5, 0.5, 0.0, FRAC_PI_4.cos(), FRAC_PI_4.sin(), 0.0])
            .build()
            .unwrap();
        assert!(!arc.is_set(Radius));
        let radius = arc.radius().unwrap();
        assert_relative_eq!(radius, 1.0, epsilon = 1e-12);
        assert!(arc.is_set(Radius));
        assert_eq!(arc.resolver().slot(Radius), crate::resolve::Slot::Resolved(Value::Scalar(radius)));
        assert!(!arc.is_set(Apex));
    }

    #[test]
    fn display_lists_resolved_parameters() {
        let arc = Arc::builder().start_point("1, 2, 3").angle(0.5).build().unwrap();
        let text = arc.to_string();
        assert!(text.starts_with("Arc("));
        assert!(text.contains("start_point=(1, 2, 3)"));
        assert!(text.contains("angle=0.5"));
    }

    #[test]
    fn param_names_round_trip() {
        for &param in ArcParam::ALL {
            assert_eq!(param.name().parse::<ArcParam>().unwrap(), param);
            assert_eq!(ArcParam::ALL[param.index()], param);
        }
    }
}
