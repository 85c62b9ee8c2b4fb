//! quadrature — weighted point sets for expectations under a Gaussian.
//!
//! Purpose
//! -------
//! Generate `(sigma_points, weights)` pairs that approximate
//! `E_{z~N(0,I)}[f(z)]` as `Σ wᵢ f(xᵢ)`. The scalar Gauss–Hermite rule drives
//! quadrature moment matching in [`crate::likelihoods`]; the multivariate and
//! cubature rules serve sigma-point state updates in the external filter.
//!
//! Key behaviors
//! -------------
//! - [`gauss_hermite`]: 1-D Golub–Welsch rule and its full tensor product,
//!   normalized to the standard Gaussian.
//! - [`cubature`]: symmetric degree-3 (cross layout, parameter κ) and
//!   degree-5 (McNamee–Stenger) rules for any dimension.
//! - [`rule`]: the shared [`SigmaPoints`] value type and a process-wide
//!   memo keyed by [`RuleSpec`].
//!
//! Invariants & assumptions
//! ------------------------
//! - `sigma_points` is `dim × n`, one column per node; weights sum to one.
//! - Rules are pure functions of `(kind, dim, order/κ)`; cached rules are
//!   immutable and shared via `Arc`.
//!
//! Conventions
//! -----------
//! - Construction errors are reported through [`QuadratureError`].
//! - Only cache misses are logged (`debug!`).
//!
//! Testing notes
//! -------------
//! - Gauss–Hermite tests check Gaussian moments up to the rule's degree.
//! - Cubature tests enumerate every monomial up to degree 3 or 5 in
//!   dimensions 1 through 6.

pub mod cubature;
pub mod errors;
pub mod gauss_hermite;
pub mod rule;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::cubature::{symmetric_cubature_fifth_order, symmetric_cubature_third_order};
pub use self::errors::{QuadResult, QuadratureError};
pub use self::gauss_hermite::{MAX_NODES, MAX_NUM_POINTS, gauss_hermite, hermgauss, mv_hermgauss};
pub use self::rule::{MAX_CACHED_POINTS, RuleSpec, SigmaPoints, sigma_points};

// ---- Optional convenience prelude for downstream crates -------------------

pub mod prelude {
    pub use super::errors::{QuadResult, QuadratureError};
    pub use super::gauss_hermite::gauss_hermite;
    pub use super::rule::{RuleSpec, SigmaPoints, sigma_points};
}
