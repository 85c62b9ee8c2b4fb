//! Errors for quadrature and cubature rule construction.
//!
//! [`QuadratureError`] covers invalid rule parameters (dimension, order,
//! κ), node-count explosions of tensor-product rules and internal failures
//! of the Golub–Welsch eigenproblem.
use thiserror::Error;

/// Result alias for rule construction.
pub type QuadResult<T> = Result<T, QuadratureError>;

/// Unified error type for quadrature/cubature rules.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QuadratureError {
    // ---- Rule parameters ----
    /// Dimension must be at least 1.
    #[error("Invalid rule dimension {dim}: {reason}")]
    InvalidDimension { dim: usize, reason: &'static str },

    /// Number of 1-D nodes is outside the supported range.
    #[error("Invalid number of quadrature points {num_points}: {reason}")]
    InvalidNumPoints { num_points: usize, reason: &'static str },

    /// κ must be finite with `dim + κ > 0`.
    #[error("Invalid cubature parameter kappa = {kappa}: {reason}")]
    InvalidKappa { kappa: f64, reason: &'static str },

    /// Tensor-product rule would exceed the node limit.
    #[error("Gauss-Hermite rule with {num_points}^{dim} nodes exceeds the limit of {limit}")]
    TooManyNodes { num_points: usize, dim: usize, limit: usize },

    // ---- Construction ----
    /// Points and weights disagree on the number of nodes.
    #[error("Rule shape mismatch: {point_cols} point columns vs {weight_len} weights")]
    ShapeMismatch { point_cols: usize, weight_len: usize },

    /// Golub–Welsch produced non-finite nodes or weights.
    #[error("Gauss-Hermite node computation failed for {num_points} points")]
    EigenDecompositionFailed { num_points: usize },
}

#[cfg(feature = "python-bindings")]
impl From<QuadratureError> for pyo3::PyErr {
    fn from(err: QuadratureError) -> pyo3::PyErr {
        pyo3::exceptions::PyValueError::new_err(err.to_string())
    }
}
