//! Errors for timeline construction and event discretisation.
//!
//! [`TimelineError`] reports malformed training/test inputs handed to
//! [`crate::timeline::input_admin`] and invalid grids for the binning
//! helpers. Row and column indices refer to the caller's original (unsorted)
//! arrays.
use thiserror::Error;

/// Result alias for timeline operations.
pub type TimelineResult<T> = Result<T, TimelineError>;

/// Unified error type for the timeline layer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimelineError {
    // ---- Shapes ----
    /// At least one training row is required.
    #[error("Training inputs must contain at least one row")]
    EmptyTrainingSet,

    /// Two arrays that describe the same rows disagree in length.
    #[error("Row count mismatch for {context}: expected {expected}, got {actual}")]
    RowCountMismatch { context: &'static str, expected: usize, actual: usize },

    /// An array has an unusable number of columns (for test inputs: more
    /// than the training counterpart).
    #[error("Column count mismatch for {context}: expected {expected}, got {actual}")]
    ColumnCountMismatch { context: &'static str, expected: usize, actual: usize },

    // ---- Values ----
    /// Training timestamps must be finite; NaN is not allowed as a missing
    /// marker on the training side.
    #[error("Training input at row {row}, column {col} must be finite; got {value}")]
    NonFiniteTrainInput { row: usize, col: usize, value: f64 },

    /// Infinite entries are never accepted; NaN marks a missing value.
    #[error("{context} at row {row}, column {col} is infinite ({value}); use NaN for missing values")]
    NonFiniteValue { context: &'static str, row: usize, col: usize, value: f64 },

    // ---- Binning ----
    /// Grids need at least one bin per axis.
    #[error("Number of bins must be >= 1; got {value}")]
    InvalidBinCount { value: usize },

    /// Window bounds must be finite with `lower < upper`.
    #[error("Invalid window [{lower}, {upper}]: bounds must be finite with lower < upper")]
    InvalidWindow { lower: f64, upper: f64 },
}

#[cfg(feature = "python-bindings")]
impl From<TimelineError> for pyo3::PyErr {
    fn from(err: TimelineError) -> pyo3::PyErr {
        pyo3::exceptions::PyValueError::new_err(err.to_string())
    }
}
