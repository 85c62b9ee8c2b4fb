//! Errors for the numerical primitives (parameter transforms and
//! Cholesky-based linear algebra).
//!
//! This module defines [`NumericsError`], the error type returned by the
//! softplus family and by the PSD solve/inverse helpers, together with the
//! [`NumericsResult`] alias.
//!
//! ## Conventions
//! - Matrix shapes are reported as `(rows, cols)`.
//! - A failed Cholesky factorization is always surfaced as
//!   [`NumericsError::NotPositiveDefinite`]; NaNs are never handed back to the
//!   caller in its place.
use thiserror::Error;

/// Result alias for numerical helpers that may produce [`NumericsError`].
pub type NumericsResult<T> = Result<T, NumericsError>;

/// Unified error type for transforms and dense linear algebra.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NumericsError {
    // ---- Transforms ----
    /// The inverse softplus is only defined on `(0, ∞)`.
    #[error("Inverse softplus requires a finite, strictly positive input; got {value}")]
    NonPositiveSoftplusInput { value: f64 },

    /// A scalar input was NaN/±inf.
    #[error("Input must be finite; got {value} ({context})")]
    NonFiniteInput { value: f64, context: &'static str },

    // ---- Linear algebra ----
    /// Matrix is not square.
    #[error("Matrix must be square; got shape {shape:?}")]
    NotSquare { shape: (usize, usize) },

    /// Right-hand side row count does not match the system size.
    #[error("Dimension mismatch: expected {expected} rows, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Matrix entries differ from their transpose beyond tolerance.
    #[error("Matrix is not symmetric: |P[{row},{col}] - P[{col},{row}]| = {gap}")]
    NotSymmetric { row: usize, col: usize, gap: f64 },

    /// Matrix contains NaN/±inf entries.
    #[error("Matrix entry at ({row}, {col}) is non-finite: {value}")]
    NonFiniteMatrix { row: usize, col: usize, value: f64 },

    /// Cholesky factorization failed.
    #[error("Matrix of size {dim} is not positive definite (Cholesky factorization failed)")]
    NotPositiveDefinite { dim: usize },
}

#[cfg(feature = "python-bindings")]
impl From<NumericsError> for pyo3::PyErr {
    fn from(err: NumericsError) -> pyo3::PyErr {
        pyo3::exceptions::PyValueError::new_err(err.to_string())
    }
}
