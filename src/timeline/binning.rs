//! Discretise point events onto regular grids for count likelihoods.
//!
//! Log-Gaussian Cox process models are fit as a Poisson likelihood on binned
//! counts. [`bin_events`] does this on a 1-D time axis, [`discrete_grid`] on
//! a 2-D spatial window. NaN events are treated as missing and skipped;
//! infinite events are rejected.
use crate::timeline::{
    errors::{TimelineError, TimelineResult},
    validation::{validate_bin_count, validate_columns, validate_window},
};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

/// Bin centres and event counts on a 1-D grid.
#[derive(Debug, Clone, PartialEq)]
pub struct EventBins {
    /// `num_bins` evenly spaced grid points from `lower` to `upper`.
    pub centers: Array1<f64>,
    /// Number of events per bin.
    pub counts: Array1<f64>,
}

/// Cell corners and point counts on a 2-D grid.
#[derive(Debug, Clone, PartialEq)]
pub struct GridCounts {
    /// `nx × ny`; `x[[i, j]]` is the lower x edge of cell `(i, j)`.
    pub x: Array2<f64>,
    /// `nx × ny`; `y[[i, j]]` is the lower y edge of cell `(i, j)`.
    pub y: Array2<f64>,
    /// `nx × ny` point counts.
    pub counts: Array2<f64>,
}

/// `n` evenly spaced points on `[lower, upper]` (just `lower` when `n = 1`).
fn grid(lower: f64, upper: f64, n: usize) -> Array1<f64> {
    if n == 1 {
        return Array1::from_elem(1, lower);
    }
    let step = (upper - lower) / (n - 1) as f64;
    Array1::from_shape_fn(n, |i| if i == n - 1 { upper } else { lower + step * i as f64 })
}

fn reject_infinite(context: &'static str, values: impl Iterator<Item = (usize, usize, f64)>) -> TimelineResult<()> {
    for (row, col, value) in values {
        if value.is_infinite() {
            return Err(TimelineError::NonFiniteValue { context, row, col, value });
        }
    }
    Ok(())
}

/// bin_events — histogram of event times on an evenly spaced grid.
///
/// Parameters
/// ----------
/// - `events`: `ArrayView1<f64>`
///   Event times; NaN entries are skipped.
/// - `num_bins`: `usize`
///   Number of grid points / bins (≥ 1).
/// - `window`: `Option<(f64, f64)>`
///   Grid range; defaults to the smallest and largest event.
///
/// Returns
/// -------
/// `TimelineResult<EventBins>`
///   Grid points `x₀ … x_{n−1}` and counts. Bin `i` spans from the midpoint
///   between `x_{i−1}` and `x_i` (inclusive) to the midpoint between `x_i`
///   and `x_{i+1}` (exclusive); the outermost bins extend to ±∞, so every
///   finite event is counted exactly once.
///
/// Errors
/// ------
/// - `TimelineError::InvalidBinCount` when `num_bins = 0`.
/// - `TimelineError::InvalidWindow` when the range is not finite, or when
///   `num_bins > 1` and it is empty (`lower ≥ upper`). An empty event set
///   without an explicit window has no range.
/// - `TimelineError::NonFiniteValue` for an infinite event.
pub fn bin_events(
    events: ArrayView1<f64>, num_bins: usize, window: Option<(f64, f64)>,
) -> TimelineResult<EventBins> {
    let num_bins = validate_bin_count(num_bins)?;
    reject_infinite("event times", events.iter().enumerate().map(|(i, &e)| (i, 0, e)))?;

    let (lower, upper) = match window {
        Some(bounds) => bounds,
        None => events
            .iter()
            .filter(|e| !e.is_nan())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &e| (lo.min(e), hi.max(e))),
    };
    if num_bins > 1 {
        validate_window(lower, upper)?;
    } else if !(lower.is_finite() && upper.is_finite() && lower <= upper) {
        return Err(TimelineError::InvalidWindow { lower, upper });
    }

    let centers = grid(lower, upper, num_bins);
    let midpoints: Vec<f64> = centers.windows(2).into_iter().map(|w| w[0] + (w[1] - w[0]) / 2.0).collect();
    let mut counts = Array1::<f64>::zeros(num_bins);
    for &e in events.iter().filter(|e| !e.is_nan()) {
        counts[midpoints.partition_point(|&edge| edge <= e)] += 1.0;
    }
    Ok(EventBins { centers, counts })
}

/// discrete_grid — count 2-D points per cell of a regular grid.
///
/// Parameters
/// ----------
/// - `xy`: `ArrayView2<f64>`
///   `n × 2` point locations; rows with a NaN coordinate are skipped.
/// - `window`: `[x_min, x_max, y_min, y_max]`.
/// - `bins`: `(nx, ny)` cells per axis.
///
/// Returns
/// -------
/// `TimelineResult<GridCounts>`
///   Lower-left cell corners and counts, indexed `[[i, j]]` for the `i`-th
///   x cell and `j`-th y cell. Cells are half-open `[lo, hi)` on both axes,
///   so points on the upper window edges and outside the window are not
///   counted.
///
/// Errors
/// ------
/// - `TimelineError::ColumnCountMismatch` when `xy` is not two columns wide.
/// - `TimelineError::InvalidBinCount` for a zero bin count.
/// - `TimelineError::InvalidWindow` for an empty or non-finite axis range.
/// - `TimelineError::NonFiniteValue` for an infinite coordinate.
pub fn discrete_grid(xy: ArrayView2<f64>, window: [f64; 4], bins: (usize, usize)) -> TimelineResult<GridCounts> {
    validate_columns("point locations xy", 2, xy.ncols())?;
    let nx = validate_bin_count(bins.0)?;
    let ny = validate_bin_count(bins.1)?;
    let (x_lo, x_hi) = validate_window(window[0], window[1])?;
    let (y_lo, y_hi) = validate_window(window[2], window[3])?;
    reject_infinite("point locations xy", xy.indexed_iter().map(|((r, c), &v)| (r, c, v)))?;

    let x_edges = grid(x_lo, x_hi, nx + 1);
    let y_edges = grid(y_lo, y_hi, ny + 1);
    let cell = |edges: &Array1<f64>, v: f64| -> Option<usize> {
        let n = edges.len() - 1;
        if !(v >= edges[0] && v < edges[n]) {
            return None;
        }
        let above = edges.iter().take_while(|&&e| e <= v).count();
        Some(above - 1)
    };

    let mut counts = Array2::<f64>::zeros((nx, ny));
    for row in xy.rows() {
        if let (Some(i), Some(j)) = (cell(&x_edges, row[0]), cell(&y_edges, row[1])) {
            counts[[i, j]] += 1.0;
        }
    }
    let x = Array2::from_shape_fn((nx, ny), |(i, _)| x_edges[i]);
    let y = Array2::from_shape_fn((nx, ny), |(_, j)| y_edges[j]);
    Ok(GridCounts { x, y, counts })
}
