//! Lazy, cached resolution of entity parameters.
//!
//! An entity (arc, segment, ...) declares its parameters as a [`Param`] enum
//! and implements [`Entity::calculate`] as a `match` over that enum, one
//! derivation per parameter. Callers supply any complete subset of the
//! parameters; everything else is derived on first access and cached in the
//! entity's [`Resolver`].

mod resolver;
mod value;

use std::fmt;

pub use resolver::{Resolver, Slot};
pub use value::{RawValue, Value, ValueKind};

use crate::error::{CoercionError, GeodefError, ParameterError, Result};
use crate::geometry::Plane;
use crate::math::{Point3, Vector3};

/// Identifier of one parameter of an entity type.
pub trait Param: Copy + Eq + fmt::Debug + fmt::Display + 'static {
    /// Entity type name, used in error messages.
    const ENTITY: &'static str;

    /// Every parameter, in declaration order; `ALL[p.index()] == p`.
    const ALL: &'static [Self];

    /// Position of the parameter in [`Param::ALL`].
    fn index(self) -> usize;

    /// The `snake_case` name of the parameter.
    fn name(self) -> &'static str;

    /// The kind raw input is coerced into.
    fn kind(self) -> ValueKind;

    /// Whether the parameter has a derivation; if not, it must be supplied.
    fn is_derived(self) -> bool;

    /// Looks a parameter up by name.
    ///
    /// # Errors
    ///
    /// Returns [`ParameterError::Unknown`] if no parameter has this name.
    fn from_name(name: &str) -> std::result::Result<Self, ParameterError> {
        Self::ALL
            .iter()
            .copied()
            .find(|param| param.name() == name)
            .ok_or_else(|| ParameterError::Unknown {
                entity: Self::ENTITY,
                name: name.to_owned(),
            })
    }
}

/// A geometry object whose parameters resolve through a [`Resolver`].
pub trait Entity: Sized {
    type Param: Param;

    /// Parameters whose joint resolution certifies a complete definition.
    const CANONICAL: &'static [Self::Param];

    /// Wraps a resolver into an entity.
    fn from_resolver(resolver: Resolver<Self::Param>) -> Self;

    /// The parameter cache of this instance.
    fn resolver(&self) -> &Resolver<Self::Param>;

    /// Runs the derivation of `param` from the other parameters, bypassing
    /// the cache of `param` itself. The derivation may still read `param`
    /// back through other parameters derived from it.
    ///
    /// Returns `Ok(None)` when the available parameters are not enough, or
    /// when `param` has no derivation.
    ///
    /// # Errors
    ///
    /// Returns an error on degenerate geometry.
    fn calculate(&self, param: Self::Param) -> Result<Option<Value>>;

    /// Returns the value of `param`, deriving it if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameter cannot be resolved.
    fn get(&self, param: Self::Param) -> Result<Value> {
        self.resolver().resolve(self, param)?.ok_or_else(|| {
            ParameterError::InsufficientData {
                entity: <Self::Param as Param>::ENTITY,
                parameter: param.name(),
            }
            .into()
        })
    }

    /// Returns the value of `param` if it can be reached, for use inside
    /// derivations.
    ///
    /// # Errors
    ///
    /// Returns an error on degenerate geometry.
    fn lookup(&self, param: Self::Param) -> Result<Option<Value>> {
        self.resolver().lookup(self, param)
    }

    /// Whether `param` currently holds a supplied or derived value.
    fn is_set(&self, param: Self::Param) -> bool {
        self.resolver().is_set(param)
    }

    /// Checks completeness and consistency of the supplied parameters.
    ///
    /// # Errors
    ///
    /// See [`Resolver::verify`].
    fn verify(&self) -> Result<()> {
        self.resolver().verify(self)
    }

    /// Typed [`Entity::get`] for scalar parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameter cannot be resolved.
    fn get_scalar(&self, param: Self::Param) -> Result<f64> {
        typed(param, self.get(param)?, Value::as_scalar)
    }

    /// Typed [`Entity::get`] for flag parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameter cannot be resolved.
    fn get_flag(&self, param: Self::Param) -> Result<bool> {
        typed(param, self.get(param)?, Value::as_flag)
    }

    /// Typed [`Entity::get`] for point parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameter cannot be resolved.
    fn get_point(&self, param: Self::Param) -> Result<Point3> {
        typed(param, self.get(param)?, Value::as_point)
    }

    /// Typed [`Entity::get`] for vector parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameter cannot be resolved.
    fn get_vector(&self, param: Self::Param) -> Result<Vector3> {
        typed(param, self.get(param)?, Value::as_vector)
    }

    /// Typed [`Entity::get`] for plane parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameter cannot be resolved.
    fn get_plane(&self, param: Self::Param) -> Result<Plane> {
        typed(param, self.get(param)?, Value::as_plane)
    }

    /// Typed [`Entity::lookup`] for scalar parameters.
    ///
    /// # Errors
    ///
    /// Returns an error on degenerate geometry.
    fn lookup_scalar(&self, param: Self::Param) -> Result<Option<f64>> {
        self.lookup(param)?.map(|v| typed(param, v, Value::as_scalar)).transpose()
    }

    /// Typed [`Entity::lookup`] for flag parameters.
    ///
    /// # Errors
    ///
    /// Returns an error on degenerate geometry.
    fn lookup_flag(&self, param: Self::Param) -> Result<Option<bool>> {
        self.lookup(param)?.map(|v| typed(param, v, Value::as_flag)).transpose()
    }

    /// Typed [`Entity::lookup`] for point parameters.
    ///
    /// # Errors
    ///
    /// Returns an error on degenerate geometry.
    fn lookup_point(&self, param: Self::Param) -> Result<Option<Point3>> {
        self.lookup(param)?.map(|v| typed(param, v, Value::as_point)).transpose()
    }

    /// Typed [`Entity::lookup`] for vector parameters.
    ///
    /// # Errors
    ///
    /// Returns an error on degenerate geometry.
    fn lookup_vector(&self, param: Self::Param) -> Result<Option<Vector3>> {
        self.lookup(param)?.map(|v| typed(param, v, Value::as_vector)).transpose()
    }
}

fn typed<P: Param, T>(param: P, value: Value, extract: impl FnOnce(&Value) -> Option<T>) -> Result<T> {
    extract(&value).ok_or_else(|| {
        GeodefError::from(CoercionError::WrongType {
            parameter: param.name(),
            expected: param.kind().name(),
            actual: value.kind().name(),
        })
    })
}

/// Writes `Name(param=value, ...)` for every resolved parameter.
pub(crate) fn fmt_entity<E: Entity>(entity: &E, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}(", <E::Param as Param>::ENTITY)?;
    for (i, (param, value)) in entity.resolver().resolved().into_iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{param}={value}")?;
    }
    f.write_str(")")
}
