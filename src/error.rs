use thiserror::Error;

/// Top-level error type for geodef.
#[derive(Debug, Error)]
pub enum GeodefError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Parameter(#[from] ParameterError),

    #[error(transparent)]
    Coercion(#[from] CoercionError),
}

impl GeodefError {
    /// Returns `true` if the error only means "no value could be reached"
    /// (missing input or insufficient data), as opposed to a hard failure.
    #[must_use]
    pub fn is_unresolved(&self) -> bool {
        matches!(
            self,
            Self::Parameter(ParameterError::Missing { .. } | ParameterError::InsufficientData { .. })
        )
    }
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("zero-length vector")]
    ZeroVector,
}

/// Errors related to the parameters defining an entity.
#[derive(Debug, Error)]
pub enum ParameterError {
    #[error("unknown {entity} parameter: {name}")]
    Unknown { entity: &'static str, name: String },

    #[error("mandatory parameter <{parameter}> missing for {entity}")]
    Missing {
        entity: &'static str,
        parameter: &'static str,
    },

    #[error("not enough information to calculate <{parameter}> for {entity}")]
    InsufficientData {
        entity: &'static str,
        parameter: &'static str,
    },

    #[error("parameter set is not complete to fully define {entity}: <{parameter}> unresolved")]
    IncompleteDefinition {
        entity: &'static str,
        parameter: &'static str,
    },

    #[error("verify failed for <{parameter}> of {entity}: supplied {supplied} but derived {derived}")]
    Inconsistent {
        entity: &'static str,
        parameter: &'static str,
        supplied: String,
        derived: String,
    },
}

/// Errors raised while coercing raw input into a typed parameter value.
#[derive(Debug, Error)]
pub enum CoercionError {
    #[error("<{parameter}> expects {expected} numbers, got {actual}")]
    WrongArity {
        parameter: &'static str,
        expected: &'static str,
        actual: usize,
    },

    #[error("<{parameter}>: cannot parse {text:?} as a number")]
    NotANumber { parameter: &'static str, text: String },

    #[error("<{parameter}> expects a {expected}, got {actual}")]
    WrongType {
        parameter: &'static str,
        expected: &'static str,
        actual: &'static str,
    },
}

/// Convenience type alias for results using [`GeodefError`].
pub type Result<T> = std::result::Result<T, GeodefError>;
