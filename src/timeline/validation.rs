//! Input checks shared by the timeline containers and the binning helpers.
//!
//! Each function validates one property and returns the first violation as a
//! [`TimelineError`]. Row/column indices refer to the caller's arrays.
use crate::timeline::errors::{TimelineError, TimelineResult};
use ndarray::ArrayView2;

/// Row counts of two arrays describing the same observations must agree.
pub fn validate_rows(context: &'static str, expected: usize, actual: usize) -> TimelineResult<()> {
    if expected != actual {
        return Err(TimelineError::RowCountMismatch { context, expected, actual });
    }
    Ok(())
}

/// An input array needs at least one column.
pub fn validate_has_columns(context: &'static str, cols: usize) -> TimelineResult<()> {
    if cols == 0 {
        return Err(TimelineError::ColumnCountMismatch { context, expected: 1, actual: 0 });
    }
    Ok(())
}

/// Exact column count, e.g. test vs training observations.
pub fn validate_columns(context: &'static str, expected: usize, actual: usize) -> TimelineResult<()> {
    if expected != actual {
        return Err(TimelineError::ColumnCountMismatch { context, expected, actual });
    }
    Ok(())
}

/// Test-side arrays may be narrower than the training side (they are padded
/// with NaN) but never wider.
pub fn validate_columns_at_most(context: &'static str, max: usize, actual: usize) -> TimelineResult<()> {
    if actual > max {
        return Err(TimelineError::ColumnCountMismatch { context, expected: max, actual });
    }
    Ok(())
}

/// Every training timestamp must be finite.
pub fn validate_train_times(t: ArrayView2<f64>) -> TimelineResult<()> {
    for ((row, col), &value) in t.indexed_iter() {
        if !value.is_finite() {
            return Err(TimelineError::NonFiniteTrainInput { row, col, value });
        }
    }
    Ok(())
}

/// NaN is a missing marker; infinities are rejected.
pub fn validate_no_infinite(context: &'static str, a: ArrayView2<f64>) -> TimelineResult<()> {
    for ((row, col), &value) in a.indexed_iter() {
        if value.is_infinite() {
            return Err(TimelineError::NonFiniteValue { context, row, col, value });
        }
    }
    Ok(())
}

pub fn validate_bin_count(value: usize) -> TimelineResult<usize> {
    if value == 0 {
        return Err(TimelineError::InvalidBinCount { value });
    }
    Ok(value)
}

/// Finite bounds with `lower < upper`.
pub fn validate_window(lower: f64, upper: f64) -> TimelineResult<(f64, f64)> {
    if !(lower.is_finite() && upper.is_finite() && lower < upper) {
        return Err(TimelineError::InvalidWindow { lower, upper });
    }
    Ok((lower, upper))
}
