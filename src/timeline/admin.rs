//! Merge training and test inputs into the single timeline the recursive
//! filter walks.
//!
//! Purpose
//! -------
//! Order, deduplicate and index heterogeneous training/test time points so a
//! forward/backward sweep can iterate over one strictly increasing sequence
//! while still knowing which slots carry training data.
//!
//! Key behaviors
//! -------------
//! - Training and test rows are stably sorted by their primary coordinate,
//!   independently of each other.
//! - Test rows with a NaN timestamp are dropped (logged at `warn!`).
//! - Narrower test `t`/`r` arrays are padded with NaN up to the training
//!   width.
//! - Equal timestamps share one slot. A slot holding any training row takes
//!   its inputs and observations from the first such row; test rows landing
//!   on it never overwrite it.
//!
//! Invariants & assumptions
//! ------------------------
//! - `t_all[:, 0]` is strictly increasing.
//! - `len(t_all) = #distinct train timestamps + #distinct kept test
//!   timestamps not present on the training side`.
//! - `train_id` / `test_id` have one entry per (kept) sorted row and jointly
//!   cover every slot.
//! - `dt_all[0] = dt_train[0] = 0`.
//!
//! Conventions
//! -----------
//! - `-0.0` and `0.0` are the same timestamp.
//! - Collapsed duplicates are reported with a single `warn!`; the merged
//!   size is logged at `debug!`.
use crate::timeline::{
    data::{Observation, TestInputs, Timeline, TrainInputs},
    errors::TimelineResult,
    validation::{validate_columns, validate_columns_at_most},
};
use log::{debug, warn};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, ArrayViewMut1};

#[derive(Debug, Clone, Copy)]
enum Source {
    Train(usize),
    Test(usize),
}

#[derive(Debug, Clone, Copy, Default)]
struct Slot {
    time: f64,
    first_train: Option<usize>,
    first_test: Option<usize>,
}

/// Row indices sorted by column 0; stable, so equal timestamps keep input
/// order.
fn argsort_primary(t: ArrayView2<f64>) -> Vec<usize> {
    let mut order: Vec<usize> = (0..t.nrows()).collect();
    order.sort_by(|&a, &b| t[[a, 0]].total_cmp(&t[[b, 0]]));
    order
}

/// Copy `src` into the leading columns of `dst`, leaving the rest untouched.
fn write_padded(mut dst: ArrayViewMut1<f64>, src: ArrayView1<f64>) {
    for (d, &s) in dst.iter_mut().zip(src.iter()) {
        *d = s;
    }
}

/// Leading zero followed by consecutive differences.
fn step_sizes(times: ArrayView1<f64>) -> Array1<f64> {
    let mut dt = Array1::<f64>::zeros(times.len());
    for i in 1..times.len() {
        dt[i] = times[i] - times[i - 1];
    }
    dt
}

fn gather_rows(a: &Array2<f64>, order: &[usize]) -> Array2<f64> {
    let mut out = Array2::<f64>::zeros((order.len(), a.ncols()));
    for (mut row, &src) in out.rows_mut().into_iter().zip(order.iter()) {
        row.assign(&a.row(src));
    }
    out
}

fn check_test_widths(train: &TrainInputs, test: &TestInputs) -> TimelineResult<()> {
    validate_columns_at_most("test inputs t vs training t", train.t().ncols(), test.t().ncols())?;
    if let Some(y) = test.y() {
        validate_columns("test observations y vs training y", train.y().ncols(), y.ncols())?;
    }
    if let Some(r) = test.r() {
        let train_r_cols = train.r().map_or(0, |r| r.ncols());
        validate_columns_at_most("test covariates r vs training r", train_r_cols, r.ncols())?;
    }
    Ok(())
}

/// input_admin — build the merged train/test [`Timeline`].
///
/// Parameters
/// ----------
/// - `train`: [`TrainInputs`]
///   Training timestamps `t` (`n × d_t`), observations `y` (`n × d_y`) and
///   optional covariates `r` (`n × d_r`).
/// - `test`: `Option<&TestInputs>`
///   Held-out timestamps with optional observations/covariates. `t` and `r`
///   may be narrower than their training counterparts; `y` must have the
///   same number of columns as the training `y`.
///
/// Returns
/// -------
/// `TimelineResult<Timeline>`
///   The merged arrays, step sizes, index maps and held-out mask. See
///   [`Timeline`] for the field layout.
///
/// Errors
/// ------
/// - `TimelineError::ColumnCountMismatch` when a test `t`/`r` array is wider
///   than its training counterpart, or the test `y` column count differs
///   from the training `y`.
///
/// Notes
/// -----
/// - Runs in `O((n + n*) log(n + n*))` for the two sorts and the merge.
/// - A test row colliding with a training timestamp is indexed by `test_id`
///   but contributes neither inputs nor observations to that slot.
///
/// Examples
/// --------
/// ```rust
/// # use ndarray::array;
/// # use rust_sde_gp::timeline::{input_admin, TestInputs, TrainInputs};
/// let train = TrainInputs::from_columns(array![3.0, 1.0, 2.0], array![0.3, 0.1, 0.2]).unwrap();
/// let test = TestInputs::from_columns(array![2.5, 0.5], None).unwrap();
/// let timeline = input_admin(&train, Some(&test)).unwrap();
/// assert_eq!(timeline.times().to_vec(), vec![0.5, 1.0, 2.0, 2.5, 3.0]);
/// assert_eq!(timeline.train_id.to_vec(), vec![1, 2, 4]);
/// assert_eq!(timeline.test_id.to_vec(), vec![0, 3]);
/// assert_eq!(timeline.dt_all[0], 0.0);
/// ```
pub fn input_admin(train: &TrainInputs, test: Option<&TestInputs>) -> TimelineResult<Timeline> {
    if let Some(test) = test {
        check_test_widths(train, test)?;
    }

    let d_t = train.t().ncols();
    let d_y = train.y().ncols();
    let d_r = train.r().map_or(0, |r| r.ncols());

    // ---- Sort each side ----
    let train_order = argsort_primary(train.t().view());
    let t_train = gather_rows(train.t(), &train_order);
    let y_train_raw = gather_rows(train.y(), &train_order);
    let r_train = match train.r() {
        Some(r) => gather_rows(r, &train_order),
        None => Array2::<f64>::zeros((train.len(), 0)),
    };

    let test_order: Vec<usize> = match test {
        Some(test) => {
            let sorted = argsort_primary(test.t().view());
            let kept: Vec<usize> =
                sorted.into_iter().filter(|&row| !test.t()[[row, 0]].is_nan()).collect();
            let dropped = test.len() - kept.len();
            if dropped > 0 {
                warn!("input_admin: dropped {dropped} test row(s) with a missing timestamp");
            }
            kept
        }
        None => Vec::new(),
    };

    // ---- Merge ----
    // Training entries precede test entries, so the stable sort puts them
    // first among equal timestamps.
    let mut entries: Vec<(f64, Source)> = Vec::with_capacity(train_order.len() + test_order.len());
    entries.extend(t_train.column(0).iter().enumerate().map(|(k, &time)| (time + 0.0, Source::Train(k))));
    if let Some(test) = test {
        entries.extend(
            test_order.iter().enumerate().map(|(k, &row)| (test.t()[[row, 0]] + 0.0, Source::Test(k))),
        );
    }
    entries.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut slots: Vec<Slot> = Vec::with_capacity(entries.len());
    let mut train_id = Array1::<usize>::zeros(train_order.len());
    let mut test_id = Array1::<usize>::zeros(test_order.len());
    for &(time, source) in &entries {
        if slots.last().map_or(true, |slot| slot.time != time) {
            slots.push(Slot { time, ..Slot::default() });
        }
        let index = slots.len() - 1;
        let slot = &mut slots[index];
        match source {
            Source::Train(k) => {
                slot.first_train.get_or_insert(k);
                train_id[k] = index;
            }
            Source::Test(k) => {
                slot.first_test.get_or_insert(k);
                test_id[k] = index;
            }
        }
    }

    let collapsed = entries.len() - slots.len();
    if collapsed > 0 {
        warn!("input_admin: collapsed {collapsed} row(s) with duplicate timestamps onto shared slots");
    }

    // ---- Scatter ----
    let n_all = slots.len();
    let mut t_all = Array2::<f64>::from_elem((n_all, d_t), f64::NAN);
    let mut y_all = Array2::<Observation>::from_elem((n_all, d_y), Observation::Missing);
    let mut r_all = Array2::<f64>::from_elem((n_all, d_r), f64::NAN);
    let mut mask = Array1::<bool>::from_elem(n_all, true);
    let y_train = y_train_raw.mapv(Observation::from);

    for (index, slot) in slots.iter().enumerate() {
        match (slot.first_train, slot.first_test, test) {
            (Some(k), _, _) => {
                t_all.row_mut(index).assign(&t_train.row(k));
                y_all.row_mut(index).assign(&y_train.row(k));
                r_all.row_mut(index).assign(&r_train.row(k));
                mask[index] = false;
            }
            (None, Some(k), Some(test)) => {
                let row = test_order[k];
                write_padded(t_all.row_mut(index), test.t().row(row));
                if let Some(y) = test.y() {
                    y_all.row_mut(index).assign(&y.row(row).mapv(Observation::from));
                }
                if let Some(r) = test.r() {
                    write_padded(r_all.row_mut(index), r.row(row));
                }
            }
            _ => {}
        }
    }

    let dt_all = step_sizes(t_all.column(0));
    let dt_train = step_sizes(t_train.column(0));
    debug!(
        "input_admin: {n_all} slot(s) from {} training and {} test row(s)",
        train.len(),
        test_order.len()
    );

    Ok(Timeline { t_all, y_all, r_all, t_train, y_train, r_train, dt_all, dt_train, train_id, test_id, mask })
}
