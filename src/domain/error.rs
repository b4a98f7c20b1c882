//! Domain error types.
//!
//! `DomainError` covers invalid odds and probability inputs and is
//! always returned to the caller unchanged. `FitError` covers a ladder
//! that cannot support a distribution fit; callers report the model as
//! unavailable rather than retrying.

use serde::Serialize;
use thiserror::Error;

/// Invalid odds or probability input.
#[derive(Debug, Clone, PartialEq, Serialize, Error)]
pub enum DomainError {
    /// Decimal odds must be finite and strictly greater than 1.
    #[error("decimal odds must be > 1, got {0}")]
    InvalidOdds(f64),

    /// Handicaps must be finite numbers.
    #[error("handicap must be finite, got {0}")]
    InvalidHandicap(f64),

    /// A derived probability was zero or negative and has no odds form.
    #[error("{term} probability must be > 0, got {value}")]
    NonPositiveProbability {
        /// Which probability term failed.
        term: &'static str,
        /// The offending value.
        value: f64,
    },
}

/// Failure to fit a distribution to a ladder.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    #[error("need at least {required} populated handicap levels, found {found}")]
    InsufficientLevels { required: usize, found: usize },

    #[error("need at least {required} observations, found {found}")]
    InsufficientObservations { required: usize, found: usize },

    #[error("solver did not converge after {iterations} iterations")]
    NonConvergence { iterations: usize },

    #[error("fitted scale {0} is not a usable positive value")]
    InvalidScale(f64),

    #[error("degenerate fit: {0}")]
    Degenerate(&'static str),

    #[error(transparent)]
    Domain(#[from] DomainError),
}
