//! numerics — numerically robust transforms, special functions and PSD solves.
//!
//! Purpose
//! -------
//! Collect the small numerical building blocks that the quadrature engine,
//! the likelihood moment matching and the external state-space filter share:
//! positivity transforms for hyperparameters, the log Gaussian CDF, the
//! oscillator rotation matrix and Cholesky-based solves.
//!
//! Key behaviors
//! -------------
//! - Provide stable scalar transforms (`softplus`, its inverse, `sigmoid`)
//!   that map unconstrained reals into strictly positive values and back.
//! - Evaluate `log Φ(z)` with its derivative from one intermediate
//!   (`log_phi`) for the closed-form Probit moment match.
//! - Solve `P X = Q` and invert `P` for symmetric positive-definite `P`
//!   through a single Cholesky factorization.
//! - Centralize the numeric floors (`LOG_FLOOR`, `LOG_EPS`) so the
//!   likelihood layer applies the same guards everywhere.
//!
//! Invariants & assumptions
//! ------------------------
//! - Transforms assume finite inputs; `softplus_inv` rejects non-positive
//!   values explicitly.
//! - Linear-algebra helpers never return NaNs in place of an error: a
//!   matrix that is not positive definite yields
//!   [`NumericsError::NotPositiveDefinite`].
//!
//! Conventions
//! -----------
//! - Public signatures use `ndarray` types; `nalgebra` is confined to
//!   [`linalg`].
//! - This module never logs and holds no state; every function is pure.
//!
//! Downstream usage
//! ----------------
//! - Likelihoods call [`softplus_vec`] to turn stored hyperparameters into
//!   model-space values before each evaluation.
//! - Noise sampling calls [`cholesky_lower`] on a likelihood covariance.
//! - The external filter uses [`solve`] / [`inv`] and [`rotation_matrix`].
//!
//! Testing notes
//! -------------
//! - Unit tests in [`transformations`] cover softplus round-trips and tails.
//! - Unit tests in [`special`] cover `log_phi` values, derivatives and the
//!   tail branch switch.
//! - Unit tests in [`linalg`] cover solve/inverse identities and every
//!   validation error path.

pub mod errors;
pub mod linalg;
pub mod special;
pub mod transformations;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::errors::{NumericsError, NumericsResult};
pub use self::linalg::{cholesky_lower, inv, solve, solve_vec};
pub use self::special::{log_phi, std_normal_cdf, std_normal_pdf};
pub use self::transformations::{
    LOG_EPS, LOG_FLOOR, rotation_matrix, sigmoid, softplus, softplus_inv, softplus_inv_opt,
    softplus_inv_vec, softplus_vec,
};

// ---- Optional convenience prelude for downstream crates -------------------

pub mod prelude {
    pub use super::errors::{NumericsError, NumericsResult};
    pub use super::linalg::{inv, solve};
    pub use super::special::log_phi;
    pub use super::transformations::{rotation_matrix, softplus, softplus_inv};
}
