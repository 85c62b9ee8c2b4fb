//! timeline — the merged time axis consumed by the recursive filter.
//!
//! Purpose
//! -------
//! Turn raw training/test arrays into one sorted, deduplicated sequence of
//! time points with index maps back to the original rows, and discretise
//! point events into counts for Poisson-type likelihoods.
//!
//! Key behaviors
//! -------------
//! - [`input_admin`]: sort, merge, deduplicate and index train/test inputs,
//!   producing a [`Timeline`].
//! - [`bin_events`] / [`discrete_grid`]: 1-D and 2-D event counting.
//!
//! Invariants & assumptions
//! ------------------------
//! - Missing values are NaN at the array boundary and
//!   [`Observation::Missing`] inside a [`Timeline`].
//! - Merged timestamps are strictly increasing; `dt_all[0] = 0`.
//!
//! Conventions
//! -----------
//! - Errors are reported as [`TimelineError`].
//! - Dropped test rows and collapsed duplicates are logged at `warn!`; the
//!   merged size at `debug!`.
//!
//! Downstream usage
//! ----------------
//! - Filtering runs forward over `t_all` using `dt_all`; smoothing runs
//!   backward. [`Timeline::observations`] feeds
//!   [`crate::likelihoods::moment_match_batch`] directly.
//!
//! Testing notes
//! -------------
//! - Unit tests cover each merge rule; `tests/integration_timeline.rs` checks
//!   the merge invariants on generated inputs.

pub mod admin;
pub mod binning;
pub mod data;
pub mod errors;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::admin::input_admin;
pub use self::binning::{EventBins, GridCounts, bin_events, discrete_grid};
pub use self::data::{Observation, TestInputs, Timeline, TrainInputs};
pub use self::errors::{TimelineError, TimelineResult};

// ---- Optional convenience prelude for downstream crates -------------------

pub mod prelude {
    pub use super::admin::input_admin;
    pub use super::data::{Observation, TestInputs, Timeline, TrainInputs};
    pub use super::errors::{TimelineError, TimelineResult};
}
