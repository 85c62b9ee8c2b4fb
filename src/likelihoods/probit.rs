//! Probit (error-function) binary classification likelihood.
//!
//! `p(y | f) = Φ(y f)` with labels forced to `{-1, +1}`: any `y > 0` is `+1`,
//! everything else (including 0) is `-1`. There are no hyperparameters.
//!
//! Moment matching is closed form (Rasmussen & Williams, §3.6):
//!
//! ```text
//! z           = y m / √(1 + v)
//! logZ        = log Φ(z)
//! dlogZ/dm    = y · dlogΦ(z) / √(1 + v)
//! d²logZ/dm²  = −dlogΦ(z) · (z + dlogΦ(z)) / (1 + v)
//! ```
use crate::{
    likelihoods::{
        errors::{LikResult, LikelihoodError},
        hyperparams::Hyperparameters,
        moments::MomentMatch,
        options::MomentMatchOptions,
        traits::Likelihood,
        validation::{validate_cavity, validate_observation},
    },
    numerics::{
        special::{error_fn, error_fn_c, log_phi},
        transformations::LOG_EPS,
    },
};
use ndarray::{Array1, ArrayView1};
use std::f64::consts::{LN_2, SQRT_2};

const NAME: &str = "Probit";

/// Probit likelihood `Φ(y f)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Probit {
    hyp: Hyperparameters,
}

/// The error-function likelihood is the Probit likelihood.
pub type Erf = Probit;

/// Predictive summary of a binary label under `f ~ N(m, v)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbitPrediction {
    /// `log p(y = +1)`.
    pub log_p: f64,
    /// `E[y] = 2p − 1`.
    pub mean: f64,
    /// `Var[y] = 4p(1 − p)`.
    pub var: f64,
}

/// Map any finite observation onto `{-1, +1}`.
fn label(y: f64) -> LikResult<f64> {
    let y = validate_observation(y)?;
    Ok(if y > 0.0 { 1.0 } else { -1.0 })
}

impl Probit {
    pub fn new() -> Self {
        Probit { hyp: Hyperparameters::empty() }
    }

    /// Predictive label moments for the latent marginal `N(m, v)`.
    ///
    /// # Errors
    /// Cavity validation errors.
    pub fn predict(&self, m: f64, v: f64) -> LikResult<ProbitPrediction> {
        validate_cavity(m, v)?;
        let (log_p, _) = log_phi(m / (1.0 + v).sqrt());
        let p = log_p.exp();
        Ok(ProbitPrediction { log_p, mean: 2.0 * p - 1.0, var: 4.0 * p * (1.0 - p) })
    }
}

impl Default for Probit {
    fn default() -> Self {
        Self::new()
    }
}

impl Likelihood for Probit {
    fn name(&self) -> &'static str {
        NAME
    }

    fn hyperparameters(&self) -> &Hyperparameters {
        &self.hyp
    }

    fn hyperparameters_mut(&mut self) -> &mut Hyperparameters {
        &mut self.hyp
    }

    /// `erfc(−f/√2) − 1 = 2Φ(f) − 1`, the expected label.
    fn link_fn(&self, latent: f64) -> f64 {
        error_fn_c(-latent / SQRT_2) - 1.0
    }

    fn evaluate_likelihood(
        &self, y: f64, f: ArrayView1<f64>, hyp: Option<&[f64]>,
    ) -> LikResult<Array1<f64>> {
        self.resolve_hyp(hyp)?;
        let y = label(y)?;
        Ok(f.mapv(|fi| (1.0 + error_fn(y * fi / SQRT_2)) / 2.0))
    }

    /// `log Φ(y f)` with [`LOG_EPS`] added inside the logarithm.
    fn evaluate_log_likelihood(
        &self, y: f64, f: ArrayView1<f64>, hyp: Option<&[f64]>,
    ) -> LikResult<Array1<f64>> {
        self.resolve_hyp(hyp)?;
        let y = label(y)?;
        Ok(f.mapv(|fi| (1.0 + error_fn(y * fi / SQRT_2) + LOG_EPS).ln() - LN_2))
    }

    /// Closed form; `ep_fraction ≠ 1` is rejected with
    /// `LikelihoodError::UnsupportedEpFraction`.
    fn moment_match(
        &self, y: f64, m: f64, v: f64, hyp: Option<&[f64]>, opts: &MomentMatchOptions,
    ) -> LikResult<MomentMatch> {
        opts.validate()?;
        if !opts.is_standard_ep() {
            return Err(LikelihoodError::UnsupportedEpFraction {
                likelihood: NAME,
                ep_fraction: opts.ep_fraction,
            });
        }
        self.resolve_hyp(hyp)?;
        let y = label(y)?;
        validate_cavity(m, v)?;

        let scale = (1.0 + v).sqrt();
        let z = y * m / scale;
        let (log_z, dlp) = log_phi(z);
        if !opts.derivatives {
            return Ok(MomentMatch::value_only(log_z));
        }
        let dlog_z = y * dlp / scale;
        let d2log_z = -dlp * (z + dlp) / (1.0 + v);
        Ok(MomentMatch::with_derivatives(log_z, dlog_z, d2log_z))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use finitediff::FiniteDiff;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - The reference example logZ(y=+1, m=0, v=1) = log ½.
    // - Label forcing, link function and predictive moments.
    // - Closed form vs quadrature, and derivatives vs finite differences.
    // - Rejection of hyperparameters and of power EP on the closed form.
    // -------------------------------------------------------------------------

    #[test]
    fn reference_example_is_log_half() {
        let mm = Probit::new().moment_match(1.0, 0.0, 1.0, None, &MomentMatchOptions::default()).unwrap();
        assert_abs_diff_eq!(mm.log_z, 0.5f64.ln(), epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Labels are forced to ±1: 0 behaves like −1 and 0.3 like +1.
    fn labels_are_forced_to_plus_minus_one() {
        // Arrange
        let lik = Probit::new();
        let f = array![-0.5, 0.0, 1.2];

        // Act / Assert
        assert_eq!(
            lik.evaluate_likelihood(0.0, f.view(), None).unwrap(),
            lik.evaluate_likelihood(-1.0, f.view(), None).unwrap()
        );
        assert_eq!(
            lik.evaluate_likelihood(0.3, f.view(), None).unwrap(),
            lik.evaluate_likelihood(1.0, f.view(), None).unwrap()
        );
        let p = lik.evaluate_likelihood(1.0, f.view(), None).unwrap();
        let q = lik.evaluate_likelihood(-1.0, f.view(), None).unwrap();
        for i in 0..3 {
            assert_abs_diff_eq!(p[i] + q[i], 1.0, epsilon = 1e-14);
        }
    }

    #[test]
    fn log_likelihood_matches_log_of_likelihood() {
        let lik = Probit::new();
        let f = array![-2.0, 0.0, 0.8, 3.0];
        let p = lik.evaluate_likelihood(1.0, f.view(), None).unwrap();
        let lp = lik.evaluate_log_likelihood(1.0, f.view(), None).unwrap();
        for i in 0..4 {
            assert_abs_diff_eq!(lp[i], p[i].ln(), epsilon = 1e-8);
        }
        let deep = lik.evaluate_log_likelihood(1.0, array![-40.0].view(), None).unwrap();
        assert!(deep[0].is_finite());
    }

    #[test]
    fn link_is_expected_label() {
        let lik = Probit::new();
        assert_abs_diff_eq!(lik.link_fn(0.0), 0.0, epsilon = 1e-15);
        assert_abs_diff_eq!(lik.link_fn(8.0), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(lik.link_fn(-8.0), -1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(lik.link_fn(0.7), -lik.link_fn(-0.7), epsilon = 1e-14);
    }

    #[test]
    // Purpose
    // -------
    // `predict` returns p = Φ(m/√(1+v)) with E[y] = 2p − 1 and
    // Var[y] = 4p(1 − p) = 1 − E[y]².
    fn predict_returns_label_moments() {
        let pred = Probit::new().predict(0.0, 1.0).unwrap();
        assert_abs_diff_eq!(pred.log_p, 0.5f64.ln(), epsilon = 1e-12);
        assert_abs_diff_eq!(pred.mean, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(pred.var, 1.0, epsilon = 1e-12);

        let pred = Probit::new().predict(1.3, 0.4).unwrap();
        assert_abs_diff_eq!(pred.var, 1.0 - pred.mean * pred.mean, epsilon = 1e-12);
        assert!(pred.mean > 0.0);
    }

    #[test]
    // Purpose
    // -------
    // The closed form agrees with quadrature over a grid of cavities.
    //
    // Given
    // -----
    // - y ∈ {±1}, m ∈ {-1.5, 0, 0.7, 2}, v ∈ {0.1, 0.5, 1, 2}.
    //
    // Expect
    // ------
    // - logZ agrees to 1e-5.
    fn closed_form_agrees_with_quadrature() {
        let lik = Probit::new();
        let opts = MomentMatchOptions::default();
        for &y in &[1.0, -1.0] {
            for &m in &[-1.5, 0.0, 0.7, 2.0] {
                for &v in &[0.1, 0.5, 1.0, 2.0] {
                    let exact = lik.moment_match(y, m, v, None, &opts).unwrap();
                    let quad = lik.moment_match_quadrature(y, m, v, None, &opts).unwrap();
                    assert_abs_diff_eq!(exact.log_z, quad.log_z, epsilon = 1e-5);
                }
            }
        }
    }

    #[test]
    fn derivatives_match_finite_differences() {
        let lik = Probit::new();
        let opts = MomentMatchOptions::default();
        for &(y, v) in &[(1.0, 0.5), (-1.0, 2.0)] {
            let log_z = |m: &Array1<f64>| lik.moment_match(y, m[0], v, None, &opts).unwrap().log_z;
            let dlog_z = |m: &Array1<f64>| {
                lik.moment_match(y, m[0], v, None, &opts).unwrap().dlog_z().unwrap()
            };
            for &m in &[-3.0, -0.4, 0.0, 1.1] {
                let at = array![m];
                let mm = lik.moment_match(y, m, v, None, &opts).unwrap();
                assert_abs_diff_eq!(mm.dlog_z().unwrap(), at.central_diff(&log_z)[0], epsilon = 1e-6);
                assert_abs_diff_eq!(mm.d2log_z().unwrap(), at.central_diff(&dlog_z)[0], epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn far_tail_stays_finite() {
        let mm = Probit::new().moment_match(-1.0, 200.0, 0.5, None, &MomentMatchOptions::default()).unwrap();
        assert!(mm.log_z.is_finite());
        assert!(mm.dlog_z().unwrap().is_finite());
        assert!(mm.d2log_z().unwrap().is_finite());
    }

    #[test]
    fn configuration_errors() {
        let lik = Probit::new();
        let opts = MomentMatchOptions::default();
        assert!(matches!(
            lik.moment_match(1.0, 0.0, 1.0, Some(&[0.5]), &opts),
            Err(LikelihoodError::HyperparameterArity { expected: 0, actual: 1, .. })
        ));
        let power = opts.with_ep_fraction(0.5).unwrap();
        assert!(matches!(
            lik.moment_match(1.0, 0.0, 1.0, None, &power),
            Err(LikelihoodError::UnsupportedEpFraction { likelihood: "Probit", .. })
        ));
        assert!(lik.moment_match_quadrature(1.0, 0.0, 1.0, None, &power).is_ok());
        let erf: Erf = Erf::default();
        assert_eq!(erf.name(), "Probit");
    }
}
