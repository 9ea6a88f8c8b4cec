//! Error types.
//!
//! Only precondition violations are errors. An infeasible QUBO assignment
//! or a run that misses the optimum is an ordinary outcome and is reported
//! through return values, never through [`AnnealError`].

use thiserror::Error;

/// Errors raised while building a problem instance or validating a
/// configuration, before any optimization work starts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnnealError {
    /// A configuration parameter is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Two cities share the same identifier.
    #[error("duplicate city identifier '{0}'")]
    DuplicateCity(String),

    /// A city coordinate is NaN or infinite.
    #[error("city '{name}' has non-finite coordinates ({x}, {y})")]
    NonFiniteCoordinate {
        /// Identifier of the offending city.
        name: String,
        /// X coordinate as given.
        x: f64,
        /// Y coordinate as given.
        y: f64,
    },

    /// A neighbor operator name could not be parsed.
    #[error("unknown neighbor operator '{0}' (expected 2opt, swap, reverse, insert or mixed)")]
    UnknownOperator(String),

    /// A route refers to a city identifier that is not in the city set.
    #[error("unknown city identifier '{0}'")]
    UnknownCity(String),
}

impl AnnealError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        AnnealError::InvalidConfig(message.into())
    }
}
