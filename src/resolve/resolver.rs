use std::cell::RefCell;

use tracing::{debug, trace};

use crate::error::{ParameterError, Result};
use crate::math::Tolerance;

use super::{Entity, Param, RawValue, Value};

/// Cache state of one parameter of one entity.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum Slot {
    /// Never supplied nor derived.
    #[default]
    Unset,
    /// Derivation in progress; reads of the parameter see no value.
    Pending,
    /// Supplied at construction or derived; never changes afterwards.
    Resolved(Value),
}

/// Per-instance parameter cache with cycle protection.
///
/// Holds one [`Slot`] per parameter of `P`. Derivations run through the
/// owning [`Entity`]'s `calculate` dispatch and may request other parameters
/// recursively; a parameter requested while its own derivation is running
/// reads as "no value", which lets derivations fall back to alternative
/// inputs instead of recursing forever.
///
/// Not thread safe: the pending check and the pending mark are two separate
/// steps on a `RefCell`.
#[derive(Debug)]
pub struct Resolver<P: Param> {
    slots: RefCell<Vec<Slot>>,
    supplied: Vec<P>,
    tolerance: Tolerance,
}

impl<P: Param> Resolver<P> {
    /// Creates a resolver from explicitly supplied parameters.
    ///
    /// Each raw value is coerced according to its parameter's kind. When a
    /// parameter is supplied more than once the last value wins.
    ///
    /// # Errors
    ///
    /// Returns an error if a raw value cannot be coerced.
    pub fn new(params: impl IntoIterator<Item = (P, RawValue)>, tolerance: Tolerance) -> Result<Self> {
        let values = params
            .into_iter()
            .map(|(param, raw)| -> Result<(P, Value)> { Ok((param, raw.coerce(param.name(), param.kind())?)) })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_values(values, tolerance))
    }

    fn from_values(values: impl IntoIterator<Item = (P, Value)>, tolerance: Tolerance) -> Self {
        let mut slots = vec![Slot::Unset; P::ALL.len()];
        let mut supplied = Vec::new();
        for (param, value) in values {
            slots[param.index()] = Slot::Resolved(value);
            if !supplied.contains(&param) {
                supplied.push(param);
            }
        }
        Self {
            slots: RefCell::new(slots),
            supplied,
            tolerance,
        }
    }

    /// Creates a resolver from parameters given by name.
    ///
    /// # Errors
    ///
    /// Returns [`ParameterError::Unknown`] for a name `P` does not declare,
    /// or a coercion error for a value of the wrong shape.
    pub fn from_named<S: AsRef<str>>(
        params: impl IntoIterator<Item = (S, RawValue)>,
        tolerance: Tolerance,
    ) -> Result<Self> {
        let params = params
            .into_iter()
            .map(|(name, raw)| -> Result<(P, RawValue)> { Ok((P::from_name(name.as_ref())?, raw)) })
            .collect::<Result<Vec<_>>>()?;
        Self::new(params, tolerance)
    }

    /// The tolerance used by verification.
    #[must_use]
    pub fn tolerance(&self) -> &Tolerance {
        &self.tolerance
    }

    /// Current cache state of `param`.
    #[must_use]
    pub fn slot(&self, param: P) -> Slot {
        self.slots.borrow()[param.index()]
    }

    /// Whether `param` currently holds a value.
    #[must_use]
    pub fn is_set(&self, param: P) -> bool {
        matches!(self.slot(param), Slot::Resolved(_))
    }

    /// All resolved parameters, in declaration order.
    #[must_use]
    pub fn resolved(&self) -> Vec<(P, Value)> {
        let slots = self.slots.borrow();
        P::ALL
            .iter()
            .filter_map(|&param| match slots[param.index()] {
                Slot::Resolved(value) => Some((param, value)),
                _ => None,
            })
            .collect()
    }

    /// Resolves `param`, deriving and caching it on first access.
    ///
    /// Returns `Ok(None)` only when `param` is pending (the cycle breaker).
    ///
    /// # Errors
    ///
    /// Returns [`ParameterError::Missing`] if `param` has no derivation and
    /// was not supplied, [`ParameterError::InsufficientData`] if its
    /// derivation could not reach a value, or the derivation's own error.
    pub fn resolve<E>(&self, entity: &E, param: P) -> Result<Option<Value>>
    where
        E: Entity<Param = P>,
    {
        let index = param.index();
        {
            let mut slots = self.slots.borrow_mut();
            match slots[index] {
                Slot::Resolved(value) => return Ok(Some(value)),
                Slot::Pending => {
                    trace!(entity = P::ENTITY, parameter = param.name(), "cycle guard: pending");
                    return Ok(None);
                }
                Slot::Unset => {}
            }
            if !param.is_derived() {
                return Err(ParameterError::Missing {
                    entity: P::ENTITY,
                    parameter: param.name(),
                }
                .into());
            }
            slots[index] = Slot::Pending;
        }

        trace!(entity = P::ENTITY, parameter = param.name(), "deriving");
        let outcome = entity.calculate(param);

        let mut slots = self.slots.borrow_mut();
        match outcome {
            Ok(Some(value)) => {
                debug_assert_eq!(value.kind(), param.kind(), "derivation of {param} returned wrong kind");
                trace!(entity = P::ENTITY, parameter = param.name(), %value, "resolved");
                slots[index] = Slot::Resolved(value);
                Ok(Some(value))
            }
            Ok(None) => {
                slots[index] = Slot::Unset;
                debug!(entity = P::ENTITY, parameter = param.name(), "insufficient data");
                Err(ParameterError::InsufficientData {
                    entity: P::ENTITY,
                    parameter: param.name(),
                }
                .into())
            }
            Err(err) => {
                slots[index] = Slot::Unset;
                Err(err)
            }
        }
    }

    /// Resolves `param` for use inside another derivation.
    ///
    /// Pending, missing and underivable parameters all read as `None`;
    /// degenerate geometry is still reported.
    ///
    /// # Errors
    ///
    /// Returns any error other than a missing parameter or insufficient data.
    pub fn lookup<E>(&self, entity: &E, param: P) -> Result<Option<Value>>
    where
        E: Entity<Param = P>,
    {
        match self.resolve(entity, param) {
            Err(err) if err.is_unresolved() => Ok(None),
            other => other,
        }
    }

    /// Checks that the entity is completely and consistently defined.
    ///
    /// Every supplied parameter that also has a derivation is re-derived on a
    /// scratch entity holding all other supplied values but not its own, and
    /// must agree with the supplied value. Supplied parameters the others
    /// cannot reach are not compared. Consistency is checked first, so an
    /// inconsistent entity never caches values derived from the bad input.
    /// Then every canonical parameter must resolve.
    ///
    /// # Errors
    ///
    /// Returns [`ParameterError::Inconsistent`] or
    /// [`ParameterError::IncompleteDefinition`], or a geometry error hit on
    /// the way.
    pub fn verify<E>(&self, entity: &E) -> Result<()>
    where
        E: Entity<Param = P>,
    {
        debug!(entity = P::ENTITY, "verifying");
        for &param in &self.supplied {
            if !param.is_derived() {
                continue;
            }
            let Slot::Resolved(supplied) = self.slot(param) else {
                continue;
            };
            let others = self
                .supplied
                .iter()
                .filter(|&&other| other != param)
                .filter_map(|&other| match self.slot(other) {
                    Slot::Resolved(value) => Some((other, value)),
                    _ => None,
                });
            let scratch = E::from_resolver(Self::from_values(others, self.tolerance));
            let Some(derived) = scratch.lookup(param)? else {
                trace!(entity = P::ENTITY, parameter = param.name(), "not derivable from the others");
                continue;
            };
            if !supplied.is_close(&derived, &self.tolerance) {
                debug!(entity = P::ENTITY, parameter = param.name(), %supplied, %derived, "inconsistent");
                return Err(ParameterError::Inconsistent {
                    entity: P::ENTITY,
                    parameter: param.name(),
                    supplied: supplied.to_string(),
                    derived: derived.to_string(),
                }
                .into());
            }
        }

        for &param in E::CANONICAL {
            match self.resolve(entity, param) {
                Ok(Some(_)) => {}
                Err(err) if !err.is_unresolved() => return Err(err),
                _ => {
                    return Err(ParameterError::IncompleteDefinition {
                        entity: P::ENTITY,
                        parameter: param.name(),
                    }
                    .into())
                }
            }
        }
        Ok(())
    }
}
