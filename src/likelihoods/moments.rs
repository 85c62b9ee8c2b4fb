//! likelihoods::moments — log partition function and its cavity-mean
//! derivatives by Gauss–Hermite quadrature.
//!
//! Purpose
//! -------
//! Compute
//!
//! ```text
//! logZ = log ∫ pᵃ(y | f) N(f | m, v) df
//! ```
//!
//! together with `dlogZ/dm` and `d²logZ/dm²` for any likelihood that can be
//! evaluated pointwise. The likelihood enters as an injected closure, so
//! variants with a closed form simply do not call into this module.
//!
//! Key behaviors
//! -------------
//! - Nodes come from the memoized 1-D Gauss–Hermite rule, mapped onto the
//!   cavity as `√v · x + m` (the rule already carries the `√2`).
//! - Derivatives differentiate the quadrature sum through the Gaussian
//!   weight: `dZ/dm = Σ (fᵢ − m)/v · wᵢ pᵢᵃ` and
//!   `d²Z/dm² = Σ ((fᵢ − m)²/v² − 1/v) · wᵢ pᵢᵃ`.
//! - [`moment_match_quadrature_log`] accumulates `exp(a(ℓᵢ − ℓ_max))` and adds
//!   `a·ℓ_max` back to `logZ`; derivative ratios are unaffected by the shift.
//! - [`moment_match_batch`] maps a likelihood over a whole timeline,
//!   skipping missing slots, sequentially or with `rayon`.
//!
//! Invariants & assumptions
//! ------------------------
//! - `m` finite, `v` finite and `> 0`; checked on entry.
//! - A zero, negative or non-finite `Z` is reported as
//!   [`LikelihoodError::DegeneratePartition`] rather than producing `-∞`.
//! - Results of the batch call do not depend on `parallel`.
use crate::{
    likelihoods::{
        errors::{LikResult, LikelihoodError},
        options::MomentMatchOptions,
        traits::Likelihood,
        validation::validate_cavity,
    },
    quadrature::rule::{RuleSpec, sigma_points},
    timeline::data::Observation,
};
use ndarray::{Array1, ArrayView1};
use rayon::prelude::*;

/// First and second derivatives of `logZ` with respect to the cavity mean.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogZDerivatives {
    /// `dlogZ/dm`.
    pub dlog_z: f64,
    /// `d²logZ/dm²`.
    pub d2log_z: f64,
}

/// MomentMatch — output of one moment-matching call.
///
/// Fields
/// ------
/// - `log_z`: log partition function of the tilted distribution.
/// - `derivatives`: present iff derivatives were requested.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MomentMatch {
    pub log_z: f64,
    pub derivatives: Option<LogZDerivatives>,
}

impl MomentMatch {
    pub fn value_only(log_z: f64) -> Self {
        MomentMatch { log_z, derivatives: None }
    }

    pub fn with_derivatives(log_z: f64, dlog_z: f64, d2log_z: f64) -> Self {
        MomentMatch { log_z, derivatives: Some(LogZDerivatives { dlog_z, d2log_z }) }
    }

    pub fn dlog_z(&self) -> Option<f64> {
        self.derivatives.map(|d| d.dlog_z)
    }

    pub fn d2log_z(&self) -> Option<f64> {
        self.derivatives.map(|d| d.d2log_z)
    }
}

/// Cavity-scaled nodes and the matching weights for an order-`n` rule.
fn cavity_nodes(m: f64, v: f64, num_points: usize) -> LikResult<(Array1<f64>, Array1<f64>)> {
    let rule = sigma_points(RuleSpec::GaussHermite { dim: 1, num_points })?;
    Ok((rule.scaled_nodes_1d(m, v), rule.weights().to_owned()))
}

fn check_len(values: &Array1<f64>, nodes: &Array1<f64>) -> LikResult<()> {
    if values.len() != nodes.len() {
        return Err(LikelihoodError::ShapeMismatch {
            context: "likelihood evaluations at quadrature nodes",
            expected: nodes.len(),
            actual: values.len(),
        });
    }
    Ok(())
}

/// Sum the weighted terms into `logZ` (plus `shift`) and, if requested, its
/// derivatives.
fn accumulate(
    nodes: &Array1<f64>, weighted: &Array1<f64>, m: f64, v: f64, shift: f64, derivatives: bool,
) -> LikResult<MomentMatch> {
    let z: f64 = weighted.sum();
    if !z.is_finite() || z <= 0.0 {
        return Err(LikelihoodError::DegeneratePartition { value: z });
    }
    let log_z = shift + z.ln();
    if !derivatives {
        return Ok(MomentMatch::value_only(log_z));
    }

    let v_inv = 1.0 / v;
    let (dz, d2z) = nodes.iter().zip(weighted.iter()).fold((0.0, 0.0), |(dz, d2z), (&f, &wp)| {
        let c = (f - m) * v_inv;
        (dz + c * wp, d2z + (c * c - v_inv) * wp)
    });
    let z_inv = 1.0 / z;
    let dlog_z = z_inv * dz;
    let d2log_z = z_inv * d2z - dlog_z * dlog_z;
    Ok(MomentMatch::with_derivatives(log_z, dlog_z, d2log_z))
}

/// moment_match_quadrature — quadrature moment matching from likelihood
/// values.
///
/// Parameters
/// ----------
/// - `eval_likelihood`: `Fn(ArrayView1<f64>) -> LikResult<Array1<f64>>`
///   Returns `p(y | fᵢ)` at every node `fᵢ` (observation and hyperparameters
///   bound by the caller).
/// - `m`, `v`: cavity mean and variance.
/// - `opts`: `derivatives`, `ep_fraction` and `num_quad_points` are used;
///   `log_space` is ignored here (see [`moment_match_quadrature_log`]).
///
/// Returns
/// -------
/// `LikResult<MomentMatch>`
///
/// Errors
/// ------
/// - Option and cavity validation errors.
/// - `LikelihoodError::ShapeMismatch` if `eval_likelihood` returns the wrong
///   number of values.
/// - `LikelihoodError::DegeneratePartition` if `Z` is not finite and positive.
/// - Any error raised by `eval_likelihood` or the rule construction.
pub fn moment_match_quadrature<F>(
    eval_likelihood: F, m: f64, v: f64, opts: &MomentMatchOptions,
) -> LikResult<MomentMatch>
where
    F: Fn(ArrayView1<f64>) -> LikResult<Array1<f64>>,
{
    opts.validate()?;
    validate_cavity(m, v)?;
    let (nodes, weights) = cavity_nodes(m, v, opts.num_quad_points)?;
    let lik = eval_likelihood(nodes.view())?;
    check_len(&lik, &nodes)?;

    let a = opts.ep_fraction;
    let powered = if opts.is_standard_ep() { lik } else { lik.mapv(|p| p.powf(a)) };
    let weighted = &weights * &powered;
    accumulate(&nodes, &weighted, m, v, 0.0, opts.derivatives)
}

/// moment_match_quadrature_log — max-shifted quadrature from log-likelihood
/// values.
///
/// Same contract as [`moment_match_quadrature`], except that
/// `eval_log_likelihood` returns `log p(y | fᵢ)` and the sum is formed as
/// `exp(a·ℓ_max) Σ wᵢ exp(a(ℓᵢ − ℓ_max))`.
///
/// Errors
/// ------
/// - `LikelihoodError::DegeneratePartition` when every log-likelihood is
///   `-∞` or the maximum is `+∞`/NaN.
pub fn moment_match_quadrature_log<F>(
    eval_log_likelihood: F, m: f64, v: f64, opts: &MomentMatchOptions,
) -> LikResult<MomentMatch>
where
    F: Fn(ArrayView1<f64>) -> LikResult<Array1<f64>>,
{
    opts.validate()?;
    validate_cavity(m, v)?;
    let (nodes, weights) = cavity_nodes(m, v, opts.num_quad_points)?;
    let log_lik = eval_log_likelihood(nodes.view())?;
    check_len(&log_lik, &nodes)?;

    let l_max = log_lik.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !l_max.is_finite() {
        return Err(LikelihoodError::DegeneratePartition { value: l_max.exp() });
    }
    let a = opts.ep_fraction;
    let weighted = &weights * &log_lik.mapv(|l| (a * (l - l_max)).exp());
    accumulate(&nodes, &weighted, m, v, a * l_max, opts.derivatives)
}

/// moment_match_batch — moment matching over every slot of a timeline.
///
/// Parameters
/// ----------
/// - `likelihood`: any [`Likelihood`]; its stored hyperparameters are used.
/// - `y`: observations per slot; [`Observation::Missing`] slots yield `None`.
/// - `m`, `v`: cavity means and variances per slot.
/// - `opts`: shared options.
/// - `parallel`: evaluate slots on the `rayon` thread pool.
///
/// Errors
/// ------
/// - `LikelihoodError::ShapeMismatch` when `m` or `v` differ in length from
///   `y`.
/// - The first error of any slot (in index order when sequential).
pub fn moment_match_batch<L>(
    likelihood: &L, y: &[Observation], m: ArrayView1<f64>, v: ArrayView1<f64>,
    opts: &MomentMatchOptions, parallel: bool,
) -> LikResult<Vec<Option<MomentMatch>>>
where
    L: Likelihood + Sync + ?Sized,
{
    let n = y.len();
    for (context, len) in [("cavity means", m.len()), ("cavity variances", v.len())] {
        if len != n {
            return Err(LikelihoodError::ShapeMismatch { context, expected: n, actual: len });
        }
    }

    let one = |i: usize| -> LikResult<Option<MomentMatch>> {
        match y[i] {
            Observation::Missing => Ok(None),
            Observation::Observed(yi) => likelihood.moment_match(yi, m[i], v[i], None, opts).map(Some),
        }
    };
    if parallel {
        (0..n).into_par_iter().map(one).collect()
    } else {
        (0..n).map(one).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - The quadrature engine on an injected Gaussian likelihood, where the
    //   exact answer is known.
    // - Agreement of the linear and log-space paths, with and without power EP.
    // - Error paths: degenerate partition, wrong output length, bad cavity.
    //
    // Per-likelihood behavior and batch evaluation are tested next to the
    // likelihoods and in the integration tests.
    // -------------------------------------------------------------------------

    fn gaussian_lik(y: f64, s2: f64) -> impl Fn(ArrayView1<f64>) -> LikResult<Array1<f64>> {
        move |f| Ok(f.mapv(|fi| (-(y - fi).powi(2) / (2.0 * s2)).exp() / (2.0 * PI * s2).sqrt()))
    }

    fn gaussian_log_lik(y: f64, s2: f64) -> impl Fn(ArrayView1<f64>) -> LikResult<Array1<f64>> {
        move |f| Ok(f.mapv(|fi| -(y - fi).powi(2) / (2.0 * s2) - 0.5 * (2.0 * PI * s2).ln()))
    }

    #[test]
    // Purpose
    // -------
    // Quadrature on a Gaussian likelihood recovers log N(y | m, σ² + v).
    //
    // Given
    // -----
    // - y = 2, m = 1, v = 0.5, σ² = 0.3, default options.
    //
    // Expect
    // ------
    // - logZ, dlogZ/dm = (y − m)/(σ² + v), d²logZ/dm² = −1/(σ² + v) to 1e-5.
    fn gaussian_integrand_matches_closed_form() {
        // Arrange
        let (y, m, v, s2) = (2.0, 1.0, 0.5, 0.3);
        let s = s2 + v;

        // Act
        let mm = moment_match_quadrature(gaussian_lik(y, s2), m, v, &MomentMatchOptions::default())
            .unwrap();

        // Assert
        let expected = -0.5 * (y - m) * (y - m) / s - 0.5 * (2.0 * PI * s).ln();
        assert_abs_diff_eq!(mm.log_z, expected, epsilon = 1e-5);
        assert_abs_diff_eq!(mm.dlog_z().unwrap(), (y - m) / s, epsilon = 1e-5);
        assert_abs_diff_eq!(mm.d2log_z().unwrap(), -1.0 / s, epsilon = 1e-5);
    }

    #[test]
    // Purpose
    // -------
    // The log-space path agrees with the linear path, including power EP.
    //
    // Given
    // -----
    // - ep_fraction ∈ {1, 0.5}; y = -0.4, m = 0.3, v = 1.2, σ² = 0.7.
    //
    // Expect
    // ------
    // - logZ and both derivatives agree to 1e-10.
    fn log_space_path_agrees_with_linear_path() {
        for a in [1.0, 0.5] {
            // Arrange
            let opts = MomentMatchOptions::default().with_ep_fraction(a).unwrap();
            let log_opts = MomentMatchOptions { log_space: true, ..opts };

            // Act
            let lin = moment_match_quadrature(gaussian_lik(-0.4, 0.7), 0.3, 1.2, &opts).unwrap();
            let log =
                moment_match_quadrature_log(gaussian_log_lik(-0.4, 0.7), 0.3, 1.2, &log_opts)
                    .unwrap();

            // Assert
            assert_abs_diff_eq!(lin.log_z, log.log_z, epsilon = 1e-10);
            assert_abs_diff_eq!(lin.dlog_z().unwrap(), log.dlog_z().unwrap(), epsilon = 1e-10);
            assert_abs_diff_eq!(lin.d2log_z().unwrap(), log.d2log_z().unwrap(), epsilon = 1e-10);
        }
    }

    #[test]
    // Purpose
    // -------
    // Power EP on a Gaussian: Nᵃ(y | f, σ²) is an unnormalized Gaussian in f
    // with variance σ²/a, so logZ is known in closed form.
    fn power_ep_on_gaussian_integrand_is_exact() {
        // Arrange
        let (y, m, v, s2, a) = (0.5, -0.2, 0.8, 0.4, 0.5);
        let opts = MomentMatchOptions::default().with_ep_fraction(a).unwrap();

        // Act
        let mm = moment_match_quadrature(gaussian_lik(y, s2), m, v, &opts).unwrap();

        // Assert
        let s_eff = s2 / a + v;
        let norm = a * (-0.5 * (2.0 * PI * s2).ln()) + 0.5 * (2.0 * PI * s2 / a).ln();
        let expected = norm - 0.5 * (y - m) * (y - m) / s_eff - 0.5 * (2.0 * PI * s_eff).ln();
        assert_abs_diff_eq!(mm.log_z, expected, epsilon = 1e-6);
        assert_abs_diff_eq!(mm.dlog_z().unwrap(), (y - m) / s_eff, epsilon = 1e-6);
    }

    #[test]
    fn value_only_omits_derivatives() {
        let mm = moment_match_quadrature(gaussian_lik(0.0, 1.0), 0.0, 1.0, &MomentMatchOptions::value_only())
            .unwrap();
        assert!(mm.derivatives.is_none());
        assert_eq!(mm.dlog_z(), None);
    }

    #[test]
    // Purpose
    // -------
    // An underflowing likelihood is an error on the linear path and still
    // finite on the log-space path.
    fn underflow_is_reported_and_log_space_recovers() {
        // Arrange: σ² tiny, y far from the cavity.
        let (y, s2) = (40.0, 1e-3);

        // Act
        let lin = moment_match_quadrature(gaussian_lik(y, s2), 0.0, 1.0, &MomentMatchOptions::default());
        let log = moment_match_quadrature_log(
            gaussian_log_lik(y, s2),
            0.0,
            1.0,
            &MomentMatchOptions { log_space: true, ..Default::default() },
        );

        // Assert
        assert!(matches!(lin, Err(LikelihoodError::DegeneratePartition { .. })));
        let log = log.unwrap();
        assert!(log.log_z.is_finite());
        assert!(log.dlog_z().unwrap().is_finite());
    }

    #[test]
    fn invalid_inputs_are_rejected() {
        let opts = MomentMatchOptions::default();
        assert!(matches!(
            moment_match_quadrature(gaussian_lik(0.0, 1.0), 0.0, 0.0, &opts),
            Err(LikelihoodError::NonPositiveCavityVariance { .. })
        ));
        assert!(matches!(
            moment_match_quadrature(|_| Ok(Array1::zeros(3)), 0.0, 1.0, &opts),
            Err(LikelihoodError::ShapeMismatch { expected: 20, actual: 3, .. })
        ));
        assert!(matches!(
            moment_match_quadrature(|f| Ok(Array1::zeros(f.len())), 0.0, 1.0, &opts),
            Err(LikelihoodError::DegeneratePartition { .. })
        ));
        let bad = MomentMatchOptions { num_quad_points: 0, ..opts };
        assert!(matches!(
            moment_match_quadrature(gaussian_lik(0.0, 1.0), 0.0, 1.0, &bad),
            Err(LikelihoodError::InvalidNumQuadPoints { .. })
        ));
    }
}
