//! Errors for likelihood evaluation, moment matching and noise sampling.
//!
//! This module defines [`LikelihoodError`], used by every likelihood variant,
//! the quadrature moment-matching engine and the sampling helpers, together
//! with the [`LikResult`] alias. Errors from the numerical primitives and the
//! quadrature rules convert into it with `?`.
//!
//! ## Conventions
//! - Hyperparameters in messages are reported in model (constrained) space.
//! - Configuration problems (unknown link, wrong arity, power EP on a closed
//!   form) are separate variants from numerical-validity problems (cavity
//!   variance, degenerate partition function).
use crate::{numerics::errors::NumericsError, quadrature::errors::QuadratureError};
use thiserror::Error;

/// Result alias for likelihood operations.
pub type LikResult<T> = Result<T, LikelihoodError>;

/// Unified error type for the likelihood layer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LikelihoodError {
    // ---- Configuration ----
    /// Hyperparameter vector has the wrong length for this likelihood.
    #[error("{likelihood} likelihood expects {expected} hyperparameter(s), got {actual}")]
    HyperparameterArity { likelihood: &'static str, expected: usize, actual: usize },

    /// A hyperparameter value is outside its domain.
    #[error("Invalid hyperparameter at index {index}: {value} ({reason})")]
    InvalidHyperparameter { index: usize, value: f64, reason: &'static str },

    /// Link function name is not supported.
    #[error("Link function '{name}' is not implemented; valid options are 'exp', 'logistic' or 'softplus'")]
    UnsupportedLink { name: String },

    /// Likelihood name is not supported.
    #[error("Unknown likelihood '{name}'")]
    UnsupportedLikelihood { name: String },

    /// Closed-form moment matching only supports the EP fraction 1.
    #[error(
        "{likelihood} closed-form moment matching assumes ep_fraction = 1, got {ep_fraction}; use moment_match_quadrature for power EP"
    )]
    UnsupportedEpFraction { likelihood: &'static str, ep_fraction: f64 },

    // ---- Options ----
    /// EP fraction must be finite and strictly positive.
    #[error("EP fraction must be finite and > 0; got {value}")]
    InvalidEpFraction { value: f64 },

    /// Number of quadrature points is outside the supported range.
    #[error("Number of quadrature points must lie in [1, {max}]; got {value}")]
    InvalidNumQuadPoints { value: usize, max: usize },

    // ---- Inputs ----
    /// Cavity variance must be finite and strictly positive.
    #[error("Cavity variance must be finite and > 0; got {value}")]
    NonPositiveCavityVariance { value: f64 },

    /// Cavity mean must be finite.
    #[error("Cavity mean must be finite; got {value}")]
    NonFiniteCavityMean { value: f64 },

    /// Observation must be finite.
    #[error("Observation must be finite; got {value}")]
    NonFiniteObservation { value: f64 },

    /// Count observations must be non-negative.
    #[error("Count observation must be >= 0; got {value}")]
    NegativeCount { value: f64 },

    /// Noise variance must be finite and non-negative.
    #[error("Noise variance at index {index} must be finite and >= 0; got {value}")]
    InvalidNoiseVariance { index: usize, value: f64 },

    /// Array lengths disagree.
    #[error("Shape mismatch for {context}: expected {expected}, got {actual}")]
    ShapeMismatch { context: &'static str, expected: usize, actual: usize },

    // ---- Numerical validity ----
    /// Quadrature partition function is zero, negative or non-finite.
    #[error("Partition function is degenerate (Z = {value}); try the log-space quadrature path")]
    DegeneratePartition { value: f64 },

    // ---- Wrapped ----
    #[error(transparent)]
    Numerics(#[from] NumericsError),

    #[error(transparent)]
    Quadrature(#[from] QuadratureError),
}

#[cfg(feature = "python-bindings")]
impl From<LikelihoodError> for pyo3::PyErr {
    fn from(err: LikelihoodError) -> pyo3::PyErr {
        pyo3::exceptions::PyValueError::new_err(err.to_string())
    }
}
