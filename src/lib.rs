//! rust_sde_gp — numerical core for state-space Gaussian process inference.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and, with the `python-bindings`
//! feature, as the PyO3 bridge exposing the same routines through the
//! `_rust_sde_gp` extension module. The recursive filter/smoother itself
//! lives outside this crate; this crate supplies the per-step building
//! blocks it needs.
//!
//! Key behaviors
//! -------------
//! - [`numerics`]: softplus transforms, `log Φ` and Cholesky-based solves.
//! - [`quadrature`]: Gauss–Hermite and symmetric cubature sigma-point rules.
//! - [`likelihoods`]: Gaussian, Probit and Poisson likelihoods with closed
//!   form or quadrature moment matching (`logZ` and its derivatives with
//!   respect to the cavity mean).
//! - [`timeline`]: merging train/test inputs into one sorted, indexed time
//!   axis and binning point events.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every routine is a pure function of its inputs, apart from the
//!   process-wide quadrature-rule cache and the hyperparameters a likelihood
//!   owns.
//! - Numerical failures are returned as typed errors, never as NaN/Inf.
//!
//! Conventions
//! -----------
//! - Each module has its own error enum and result alias; lower-level errors
//!   convert upward with `?` and map to `ValueError` at the PyO3 boundary.
//! - Logging goes through the `log` facade; the library never installs a
//!   logger.
//!
//! Downstream usage
//! ----------------
//! - Rust callers depend on the modules directly (each has a `prelude`
//!   where useful).
//! - Python callers import `rust_sde_gp.likelihoods`, `.quadrature` and
//!   `.timeline` from the extension module.
//!
//! Testing notes
//! -------------
//! - Unit tests live next to the code; `tests/` holds end-to-end checks of
//!   moment matching, quadrature exactness and timeline construction.

pub mod likelihoods;
pub mod numerics;
pub mod quadrature;
pub mod timeline;

#[cfg(feature = "python-bindings")]
mod python;
