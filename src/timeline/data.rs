//! Input and output containers for timeline construction.
//!
//! Purpose
//! -------
//! Hold validated training/test inputs on the way into
//! [`crate::timeline::input_admin`] and the merged [`Timeline`] on the way
//! out, so the recursive filter downstream can rely on shapes and value
//! conventions without re-checking them.
//!
//! Key behaviors
//! -------------
//! - [`Observation`] replaces the NaN sentinel of raw arrays with an explicit
//!   `Missing` variant.
//! - [`TrainInputs`] / [`TestInputs`] validate row counts, column counts and
//!   finiteness at construction.
//! - [`Timeline`] exposes the merged arrays plus index maps from the sorted
//!   training/test rows into the merged order.
//!
//! Invariants & assumptions
//! ------------------------
//! - Training timestamps are finite. Test timestamps may be NaN in the
//!   primary column; such rows are dropped during the merge.
//! - Infinite values are rejected everywhere; NaN always means "missing".
//! - Column 0 of every `t` array is the primary (time) coordinate used for
//!   ordering.
//!
//! Conventions
//! -----------
//! - One row per observation; `t` is `n × d_t`, `y` is `n × d_y` and the
//!   optional auxiliary covariates `r` are `n × d_r`.
//! - 1-D inputs are accepted through the `from_columns` constructors and
//!   stored as single-column arrays.
use crate::timeline::{
    errors::{TimelineError, TimelineResult},
    validation::{validate_has_columns, validate_no_infinite, validate_rows, validate_train_times},
};
use ndarray::{Array1, Array2, ArrayView1, Axis};

/// A single observation slot: a finite value or a missing marker.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Observation {
    Observed(f64),
    #[default]
    Missing,
}

impl Observation {
    pub fn is_missing(&self) -> bool {
        matches!(self, Observation::Missing)
    }

    pub fn value(&self) -> Option<f64> {
        match *self {
            Observation::Observed(v) => Some(v),
            Observation::Missing => None,
        }
    }

    /// Back to the raw-array convention (`Missing` becomes NaN).
    pub fn to_f64(&self) -> f64 {
        self.value().unwrap_or(f64::NAN)
    }
}

/// NaN maps to [`Observation::Missing`]. Infinite values are not filtered
/// here; the input containers reject them before conversion.
impl From<f64> for Observation {
    fn from(value: f64) -> Self {
        if value.is_nan() { Observation::Missing } else { Observation::Observed(value) }
    }
}

impl From<Option<f64>> for Observation {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Observation::Missing, Observation::from)
    }
}

fn column(a: Array1<f64>) -> Array2<f64> {
    a.insert_axis(Axis(1))
}

/// `TrainInputs` — validated training timestamps, observations and
/// optional auxiliary covariates.
///
/// Invariants
/// ----------
/// - At least one row; `t`, `y` (and `r` when present) share the row count.
/// - `t` and `y` have at least one column.
/// - `t` is finite; `y` and `r` contain no infinities (NaN = missing).
#[derive(Debug, Clone, PartialEq)]
pub struct TrainInputs {
    t: Array2<f64>,
    y: Array2<f64>,
    r: Option<Array2<f64>>,
}

impl TrainInputs {
    /// Construct validated training inputs.
    ///
    /// Errors
    /// ------
    /// - `TimelineError::EmptyTrainingSet` when `t` has no rows.
    /// - `TimelineError::RowCountMismatch` when `y` or `r` disagree with `t`.
    /// - `TimelineError::ColumnCountMismatch` when `t` or `y` has no columns.
    /// - `TimelineError::NonFiniteTrainInput` for a non-finite timestamp.
    /// - `TimelineError::NonFiniteValue` for an infinite observation or
    ///   covariate.
    pub fn new(t: Array2<f64>, y: Array2<f64>, r: Option<Array2<f64>>) -> TimelineResult<Self> {
        if t.nrows() == 0 {
            return Err(TimelineError::EmptyTrainingSet);
        }
        validate_has_columns("training inputs t", t.ncols())?;
        validate_has_columns("training observations y", y.ncols())?;
        validate_rows("training observations y vs t", t.nrows(), y.nrows())?;
        validate_train_times(t.view())?;
        validate_no_infinite("training observations y", y.view())?;
        if let Some(r) = &r {
            validate_rows("training covariates r vs t", t.nrows(), r.nrows())?;
            validate_no_infinite("training covariates r", r.view())?;
        }
        Ok(TrainInputs { t, y, r })
    }

    /// One timestamp and one observation per row.
    pub fn from_columns(t: Array1<f64>, y: Array1<f64>) -> TimelineResult<Self> {
        Self::new(column(t), column(y), None)
    }

    pub fn t(&self) -> &Array2<f64> {
        &self.t
    }

    pub fn y(&self) -> &Array2<f64> {
        &self.y
    }

    pub fn r(&self) -> Option<&Array2<f64>> {
        self.r.as_ref()
    }

    pub fn len(&self) -> usize {
        self.t.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.t.nrows() == 0
    }
}

/// `TestInputs` — held-out timestamps with optional observations and
/// covariates.
///
/// Rows whose primary timestamp is NaN are accepted here and dropped during
/// the merge. Narrower `t`/`r` arrays than on the training side are padded
/// with NaN by [`crate::timeline::input_admin`].
#[derive(Debug, Clone, PartialEq)]
pub struct TestInputs {
    t: Array2<f64>,
    y: Option<Array2<f64>>,
    r: Option<Array2<f64>>,
}

impl TestInputs {
    /// Construct validated test inputs.
    ///
    /// Errors
    /// ------
    /// - `TimelineError::ColumnCountMismatch` when `t` has no columns.
    /// - `TimelineError::RowCountMismatch` when `y` or `r` disagree with `t`.
    /// - `TimelineError::NonFiniteValue` for any infinite entry.
    pub fn new(t: Array2<f64>, y: Option<Array2<f64>>, r: Option<Array2<f64>>) -> TimelineResult<Self> {
        validate_has_columns("test inputs t", t.ncols())?;
        validate_no_infinite("test inputs t", t.view())?;
        if let Some(y) = &y {
            validate_rows("test observations y vs t", t.nrows(), y.nrows())?;
            validate_no_infinite("test observations y", y.view())?;
        }
        if let Some(r) = &r {
            validate_rows("test covariates r vs t", t.nrows(), r.nrows())?;
            validate_no_infinite("test covariates r", r.view())?;
        }
        Ok(TestInputs { t, y, r })
    }

    pub fn from_columns(t: Array1<f64>, y: Option<Array1<f64>>) -> TimelineResult<Self> {
        Self::new(column(t), y.map(column), None)
    }

    pub fn t(&self) -> &Array2<f64> {
        &self.t
    }

    pub fn y(&self) -> Option<&Array2<f64>> {
        self.y.as_ref()
    }

    pub fn r(&self) -> Option<&Array2<f64>> {
        self.r.as_ref()
    }

    pub fn len(&self) -> usize {
        self.t.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.t.nrows() == 0
    }
}

/// `Timeline` — the merged, sorted and deduplicated sequence of time points.
///
/// Fields
/// ------
/// - `t_all`: `n_all × d_t` merged inputs, strictly increasing in column 0.
/// - `y_all`: `n_all × d_y` observations; `Missing` where nothing was
///   observed.
/// - `r_all`: `n_all × d_r` covariates, NaN where absent (`d_r = 0` when no
///   covariates were supplied).
/// - `t_train`, `y_train`, `r_train`: training rows in stable sorted order.
/// - `dt_all`, `dt_train`: consecutive differences of the primary
///   coordinate of `t_all` / `t_train`, with a leading 0.
/// - `train_id`: for each sorted training row, its slot in `t_all`.
/// - `test_id`: for each kept sorted test row, its slot in `t_all`.
/// - `mask`: `true` at slots that hold no training observation.
///
/// Invariants
/// ----------
/// - `train_id.len()` equals the number of training rows and `test_id.len()`
///   the number of test rows with a non-NaN timestamp.
/// - Every slot is referenced by `train_id` or `test_id`; duplicated
///   timestamps share a slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    pub t_all: Array2<f64>,
    pub y_all: Array2<Observation>,
    pub r_all: Array2<f64>,
    pub t_train: Array2<f64>,
    pub y_train: Array2<Observation>,
    pub r_train: Array2<f64>,
    pub dt_all: Array1<f64>,
    pub dt_train: Array1<f64>,
    pub train_id: Array1<usize>,
    pub test_id: Array1<usize>,
    pub mask: Array1<bool>,
}

impl Timeline {
    /// Number of merged slots.
    pub fn len(&self) -> usize {
        self.t_all.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.t_all.nrows() == 0
    }

    /// Primary coordinate of every slot.
    pub fn times(&self) -> ArrayView1<'_, f64> {
        self.t_all.column(0)
    }

    pub fn is_train_slot(&self, slot: usize) -> bool {
        !self.mask[slot]
    }

    /// Observations of output column `col`, one per slot, ready for
    /// [`crate::likelihoods::moment_match_batch`].
    pub fn observations(&self, col: usize) -> Vec<Observation> {
        self.y_all.column(col).to_vec()
    }

    /// Like [`Timeline::observations`] with test slots forced to `Missing`,
    /// for a training-only sweep.
    pub fn training_observations(&self, col: usize) -> Vec<Observation> {
        self.y_all
            .column(col)
            .iter()
            .zip(self.mask.iter())
            .map(|(&obs, &held_out)| if held_out { Observation::Missing } else { obs })
            .collect()
    }
}
