//! likelihoods — observation models and Gaussian-cavity moment matching.
//!
//! Purpose
//! -------
//! Provide the observation side of an EP / posterior-linearisation loop: for
//! a cavity `N(m, v)` and an observation `y`, compute
//! `logZ = log ∫ p(y | f)^a N(f | m, v) df` together with its first and
//! second derivatives in `m`.
//!
//! Key behaviors
//! -------------
//! - [`Likelihood`] trait: pointwise evaluation is required; moment matching
//!   defaults to Gauss–Hermite quadrature ([`moment_match_quadrature`] or its
//!   max-shifted log-space twin).
//! - Closed forms for [`Gaussian`] and [`Probit`]; [`Poisson`] uses
//!   quadrature with an `exp` or `logistic` link.
//! - [`LikelihoodKind`] selects a variant by name at run time.
//! - [`moment_match_batch`] sweeps a whole timeline, optionally on `rayon`.
//! - [`sample_noise`] adds observation noise with an explicit RNG.
//!
//! Invariants & assumptions
//! ------------------------
//! - Cavity variances are strictly positive and finite; means are finite.
//! - Stored hyperparameters are unconstrained; model-space values are
//!   `softplus(θ)`. Per-call overrides are already model-space.
//! - Closed-form variants only support standard EP (`ep_fraction = 1`);
//!   their quadrature path remains available for power EP.
//! - A non-finite or non-positive partition function is an error, never a
//!   silent NaN.
//!
//! Conventions
//! -----------
//! - Errors are reported as [`LikelihoodError`]; numerics and quadrature
//!   failures are wrapped transparently.
//! - The only logging in this module is the `warn!` emitted when a Gaussian
//!   likelihood falls back to its default noise level.
//!
//! Downstream usage
//! ----------------
//! - The external filter calls `moment_match` per time step (or
//!   [`moment_match_batch`] per sweep) and turns the derivatives into site
//!   parameters.
//!
//! Testing notes
//! -------------
//! - Closed forms are checked against quadrature and `finitediff` central
//!   differences; Poisson derivatives are checked against central
//!   differences of the quadrature logZ itself.

pub mod errors;
pub mod gaussian;
pub mod hyperparams;
pub mod kind;
pub mod moments;
pub mod options;
pub mod poisson;
pub mod probit;
pub mod sampling;
pub mod traits;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::errors::{LikResult, LikelihoodError};
pub use self::gaussian::{DEFAULT_NOISE_THETA, Gaussian, GaussianSite, gaussian_site};
pub use self::hyperparams::Hyperparameters;
pub use self::kind::LikelihoodKind;
pub use self::moments::{
    LogZDerivatives, MomentMatch, moment_match_batch, moment_match_quadrature,
    moment_match_quadrature_log,
};
pub use self::options::{DEFAULT_NUM_QUAD_POINTS, MomentMatchOptions};
pub use self::poisson::{Poisson, PoissonLink};
pub use self::probit::{Erf, Probit, ProbitPrediction};
pub use self::sampling::{DEFAULT_NOISE_SEED, sample_gaussian_noise, sample_noise, seeded_rng};
pub use self::traits::Likelihood;

// ---- Optional convenience prelude for downstream crates -------------------

pub mod prelude {
    pub use super::errors::{LikResult, LikelihoodError};
    pub use super::kind::LikelihoodKind;
    pub use super::moments::MomentMatch;
    pub use super::options::MomentMatchOptions;
    pub use super::traits::Likelihood;
    pub use super::{Gaussian, Poisson, Probit};
}
