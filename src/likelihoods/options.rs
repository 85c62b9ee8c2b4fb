//! Moment-matching options.
//!
//! [`MomentMatchOptions`] bundles the knobs of a single moment-matching call:
//! whether derivatives are wanted, the EP power `a`, the Gauss–Hermite order
//! used by the quadrature path, and whether that path accumulates in log
//! space. Fields are public like other option carriers in this crate; every
//! entry point re-validates them through [`MomentMatchOptions::validate`].
use crate::likelihoods::{
    errors::LikResult,
    validation::{validate_ep_fraction, validate_num_quad_points},
};

/// Default Gauss–Hermite order for quadrature moment matching.
pub const DEFAULT_NUM_QUAD_POINTS: usize = 20;

/// MomentMatchOptions — configuration of one moment-matching call.
///
/// Fields
/// ------
/// - `derivatives`: `bool`
///   Return `dlogZ/dm` and `d²logZ/dm²` alongside `logZ`.
/// - `ep_fraction`: `f64`
///   EP power `a > 0`; `1` is standard EP.
/// - `num_quad_points`: `usize`
///   Gauss–Hermite order for the quadrature path, in `[1, 200]`.
/// - `log_space`: `bool`
///   Evaluate the log-likelihood at the nodes and shift by its maximum
///   before exponentiating. Slower but robust when `Z` would underflow.
///
/// Default
/// -------
/// `derivatives = true`, `ep_fraction = 1.0`, `num_quad_points = 20`,
/// `log_space = false`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MomentMatchOptions {
    pub derivatives: bool,
    pub ep_fraction: f64,
    pub num_quad_points: usize,
    pub log_space: bool,
}

impl MomentMatchOptions {
    /// Build validated options.
    ///
    /// # Errors
    /// - `LikelihoodError::InvalidEpFraction` if `ep_fraction` is not finite
    ///   or `≤ 0`.
    /// - `LikelihoodError::InvalidNumQuadPoints` if `num_quad_points` is 0 or
    ///   above 200.
    pub fn new(
        derivatives: bool, ep_fraction: f64, num_quad_points: usize, log_space: bool,
    ) -> LikResult<Self> {
        let opts = MomentMatchOptions { derivatives, ep_fraction, num_quad_points, log_space };
        opts.validate()?;
        Ok(opts)
    }

    /// Default options with derivatives switched off.
    pub fn value_only() -> Self {
        MomentMatchOptions { derivatives: false, ..Self::default() }
    }

    /// Copy of `self` with a different EP power.
    pub fn with_ep_fraction(self, ep_fraction: f64) -> LikResult<Self> {
        let opts = MomentMatchOptions { ep_fraction, ..self };
        opts.validate()?;
        Ok(opts)
    }

    /// Re-check the field invariants.
    pub fn validate(&self) -> LikResult<()> {
        validate_ep_fraction(self.ep_fraction)?;
        validate_num_quad_points(self.num_quad_points)?;
        Ok(())
    }

    /// `true` for standard (non-power) EP.
    pub fn is_standard_ep(&self) -> bool {
        self.ep_fraction == 1.0
    }
}

impl Default for MomentMatchOptions {
    fn default() -> Self {
        MomentMatchOptions {
            derivatives: true,
            ep_fraction: 1.0,
            num_quad_points: DEFAULT_NUM_QUAD_POINTS,
            log_space: false,
        }
    }
}
