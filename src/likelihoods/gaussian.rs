//! Gaussian observation model `p(y | f) = N(y | f, σ²)`.
//!
//! The single hyperparameter is the noise variance σ², stored as
//! `softplus⁻¹(σ²)`. Moment matching is closed form:
//!
//! ```text
//! logZ        = log N(y | m, σ² + v)
//! dlogZ/dm    = (y − m) / (σ² + v)
//! d²logZ/dm²  = −1 / (σ² + v)
//! ```
//!
//! with `2π(σ² + v)` floored at [`LOG_FLOOR`] inside the logarithm.
use crate::{
    likelihoods::{
        errors::{LikResult, LikelihoodError},
        hyperparams::Hyperparameters,
        moments::MomentMatch,
        options::MomentMatchOptions,
        traits::Likelihood,
        validation::{validate_cavity, validate_observation, validate_positive_hyp},
    },
    numerics::transformations::LOG_FLOOR,
};
use ndarray::{Array1, ArrayView1, array};
use std::f64::consts::PI;

/// Unconstrained noise hyperparameter used when none is supplied;
/// `softplus(-2.25) ≈ 0.1`.
pub const DEFAULT_NOISE_THETA: f64 = -2.25;

const NAME: &str = "Gaussian";

/// Gaussian likelihood with learnable noise variance.
#[derive(Debug, Clone, PartialEq)]
pub struct Gaussian {
    hyp: Hyperparameters,
}

impl Gaussian {
    /// Build from an unconstrained noise parameter θ (σ² = softplus(θ)).
    ///
    /// `None` falls back to [`DEFAULT_NOISE_THETA`] and logs a warning.
    ///
    /// # Errors
    /// `LikelihoodError::InvalidHyperparameter` when θ is not finite.
    pub fn new(theta: Option<f64>) -> LikResult<Self> {
        let theta = match theta {
            Some(t) => t,
            None => {
                log::warn!(
                    "Gaussian likelihood: no noise hyperparameter supplied, using default {DEFAULT_NOISE_THETA} (variance ~0.1)"
                );
                DEFAULT_NOISE_THETA
            }
        };
        Ok(Gaussian { hyp: Hyperparameters::new(array![theta])? })
    }

    /// Build from a model-space noise variance σ² > 0.
    pub fn from_variance(variance: f64) -> LikResult<Self> {
        Ok(Gaussian { hyp: Hyperparameters::from_constrained(&[variance])? })
    }

    /// Current noise variance σ².
    pub fn variance(&self) -> f64 {
        self.hyp.constrained()[0]
    }

    fn noise_var(&self, hyp: Option<&[f64]>) -> LikResult<f64> {
        Ok(self.resolve_hyp(hyp)?[0])
    }
}

impl Likelihood for Gaussian {
    fn name(&self) -> &'static str {
        NAME
    }

    fn hyperparameters(&self) -> &Hyperparameters {
        &self.hyp
    }

    fn hyperparameters_mut(&mut self) -> &mut Hyperparameters {
        &mut self.hyp
    }

    fn evaluate_likelihood(
        &self, y: f64, f: ArrayView1<f64>, hyp: Option<&[f64]>,
    ) -> LikResult<Array1<f64>> {
        let y = validate_observation(y)?;
        let s2 = self.noise_var(hyp)?;
        let norm = (2.0 * PI * s2).powf(-0.5);
        Ok(f.mapv(|fi| norm * (-0.5 * (y - fi) * (y - fi) / s2).exp()))
    }

    fn evaluate_log_likelihood(
        &self, y: f64, f: ArrayView1<f64>, hyp: Option<&[f64]>,
    ) -> LikResult<Array1<f64>> {
        let y = validate_observation(y)?;
        let s2 = self.noise_var(hyp)?;
        let log_norm = -0.5 * (2.0 * PI * s2).ln();
        Ok(f.mapv(|fi| log_norm - 0.5 * (y - fi) * (y - fi) / s2))
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
        let y = validate_observation(y)?;
        validate_cavity(m, v)?;
        let s2 = self.noise_var(hyp)?;
        Ok(gaussian_log_partition(y, m, v, s2, opts.derivatives))
    }
}

fn gaussian_log_partition(y: f64, m: f64, v: f64, s2: f64, derivatives: bool) -> MomentMatch {
    let s = s2 + v;
    let log_z = -(y - m) * (y - m) / s / 2.0 - (2.0 * PI * s).max(LOG_FLOOR).ln() / 2.0;
    if derivatives {
        MomentMatch::with_derivatives(log_z, (y - m) / s, -1.0 / s)
    } else {
        MomentMatch::value_only(log_z)
    }
}

/// Gaussian site parameters from one closed-form moment match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianSite {
    /// `log N(y | m, σ² + v)`.
    pub log_z: f64,
    /// Site mean, the observation itself.
    pub site_mean: f64,
    /// Site variance, the noise variance σ².
    pub site_var: f64,
}

/// gaussian_site — closed-form Gaussian update returning the site directly.
///
/// For a Gaussian likelihood the EP site equals the likelihood itself, so
/// the host can skip the derivative-based site construction.
///
/// # Errors
/// Observation, cavity or noise-variance validation errors.
pub fn gaussian_site(y: f64, m: f64, v: f64, noise_var: f64) -> LikResult<GaussianSite> {
    let y = validate_observation(y)?;
    validate_cavity(m, v)?;
    validate_positive_hyp(&[noise_var])?;
    let log_z = gaussian_log_partition(y, m, v, noise_var, false).log_z;
    Ok(GaussianSite { log_z, site_mean: y, site_var: noise_var })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use finitediff::FiniteDiff;
    use statrs::distribution::{Continuous, Normal};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Pointwise density against `statrs::Normal`.
    // - The closed-form logZ on the reference example and against quadrature
    //   over a grid of (y, m, v, σ²).
    // - Derivative consistency via central finite differences.
    // - Default hyperparameter, power-EP rejection and the site helper.
    // -------------------------------------------------------------------------

    #[test]
    fn density_matches_statrs_normal() {
        let lik = Gaussian::from_variance(0.3).unwrap();
        let f = array![-1.0, 0.0, 2.5];
        let p = lik.evaluate_likelihood(0.7, f.view(), None).unwrap();
        let lp = lik.evaluate_log_likelihood(0.7, f.view(), None).unwrap();
        for i in 0..3 {
            let normal = Normal::new(f[i], 0.3f64.sqrt()).unwrap();
            assert_abs_diff_eq!(p[i], normal.pdf(0.7), epsilon = 1e-12);
            assert_abs_diff_eq!(lp[i], normal.ln_pdf(0.7), epsilon = 1e-12);
        }
    }

    #[test]
    // Purpose
    // -------
    // Reference example: y = 2, m = 1, v = 0.5, σ² = 0.3 gives
    // logZ = log N(2 | 1, 0.8).
    fn closed_form_matches_reference_example() {
        // Arrange
        let lik = Gaussian::from_variance(0.3).unwrap();

        // Act
        let mm = lik.moment_match(2.0, 1.0, 0.5, None, &MomentMatchOptions::default()).unwrap();

        // Assert
        let expected = Normal::new(1.0, 0.8f64.sqrt()).unwrap().ln_pdf(2.0);
        assert_abs_diff_eq!(mm.log_z, expected, epsilon = 1e-12);
        assert_abs_diff_eq!(mm.dlog_z().unwrap(), 1.0 / 0.8, epsilon = 1e-12);
        assert_abs_diff_eq!(mm.d2log_z().unwrap(), -1.0 / 0.8, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Quadrature moment matching reproduces the closed form.
    //
    // Given
    // -----
    // - y ∈ {-1.5, 0, 2}, m ∈ {-1, 0.5}, v ∈ {0.1, 0.5, 1}, σ² ∈ {0.5, 1};
    //   the cavity is never much wider than the noise, where a 20-point rule
    //   resolves the integrand.
    //
    // Expect
    // ------
    // - logZ and both derivatives agree to 1e-4.
    fn quadrature_agrees_with_closed_form_on_grid() {
        let opts = MomentMatchOptions::default();
        for &s2 in &[0.5, 1.0] {
            let lik = Gaussian::from_variance(s2).unwrap();
            for &y in &[-1.5, 0.0, 2.0] {
                for &m in &[-1.0, 0.5] {
                    for &v in &[0.1, 0.5, 1.0] {
                        let exact = lik.moment_match(y, m, v, None, &opts).unwrap();
                        let quad = lik.moment_match_quadrature(y, m, v, None, &opts).unwrap();
                        assert_abs_diff_eq!(exact.log_z, quad.log_z, epsilon = 1e-4);
                        assert_abs_diff_eq!(
                            exact.dlog_z().unwrap(),
                            quad.dlog_z().unwrap(),
                            epsilon = 1e-4
                        );
                        assert_abs_diff_eq!(
                            exact.d2log_z().unwrap(),
                            quad.d2log_z().unwrap(),
                            epsilon = 1e-4
                        );
                    }
                }
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // Reported derivatives match central differences of logZ in m.
    fn derivatives_match_finite_differences() {
        // Arrange
        let lik = Gaussian::from_variance(0.4).unwrap();
        let opts = MomentMatchOptions::default();
        let (y, v) = (0.3, 0.9);
        let log_z = |m: &Array1<f64>| lik.moment_match(y, m[0], v, None, &opts).unwrap().log_z;
        let dlog_z =
            |m: &Array1<f64>| array![lik.moment_match(y, m[0], v, None, &opts).unwrap().dlog_z().unwrap()];

        for &m in &[-2.0, 0.0, 1.7] {
            // Act
            let at = array![m];
            let mm = lik.moment_match(y, m, v, None, &opts).unwrap();
            let fd1 = at.central_diff(&log_z);
            let fd2 = at.central_diff(&|x: &Array1<f64>| dlog_z(x)[0]);

            // Assert
            assert_abs_diff_eq!(mm.dlog_z().unwrap(), fd1[0], epsilon = 1e-6);
            assert_abs_diff_eq!(mm.d2log_z().unwrap(), fd2[0], epsilon = 1e-6);
        }
    }

    #[test]
    fn explicit_hyperparameters_override_stored_ones() {
        let lik = Gaussian::new(None).unwrap();
        assert_abs_diff_eq!(lik.variance(), 0.1, epsilon = 2e-3);
        let opts = MomentMatchOptions::default();
        let stored = lik.moment_match(0.0, 0.0, 1.0, None, &opts).unwrap();
        let explicit = lik.moment_match(0.0, 0.0, 1.0, Some(&[lik.variance()]), &opts).unwrap();
        assert_abs_diff_eq!(stored.log_z, explicit.log_z, epsilon = 1e-14);
        assert!(matches!(
            lik.moment_match(0.0, 0.0, 1.0, Some(&[0.1, 0.2]), &opts),
            Err(LikelihoodError::HyperparameterArity { expected: 1, actual: 2, .. })
        ));
        assert!(matches!(
            lik.moment_match(0.0, 0.0, 1.0, Some(&[-0.1]), &opts),
            Err(LikelihoodError::InvalidHyperparameter { .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Power EP is refused by the closed form but available via quadrature.
    fn power_ep_requires_quadrature() {
        let lik = Gaussian::from_variance(0.5).unwrap();
        let opts = MomentMatchOptions::default().with_ep_fraction(0.5).unwrap();
        assert_eq!(
            lik.moment_match(0.0, 0.0, 1.0, None, &opts).unwrap_err(),
            LikelihoodError::UnsupportedEpFraction { likelihood: "Gaussian", ep_fraction: 0.5 }
        );
        assert!(lik.moment_match_quadrature(0.0, 0.0, 1.0, None, &opts).is_ok());
    }

    #[test]
    fn log_floor_keeps_log_z_finite() {
        let mm = gaussian_log_partition(0.0, 0.0, 1e-300, 1e-300, true);
        assert!(mm.log_z.is_finite());
        assert_abs_diff_eq!(mm.log_z, -0.5 * LOG_FLOOR.ln(), epsilon = 1e-12);
    }

    #[test]
    fn site_returns_observation_and_noise() {
        let site = gaussian_site(2.0, 1.0, 0.5, 0.3).unwrap();
        assert_eq!(site.site_mean, 2.0);
        assert_eq!(site.site_var, 0.3);
        let expected = Normal::new(1.0, 0.8f64.sqrt()).unwrap().ln_pdf(2.0);
        assert_abs_diff_eq!(site.log_z, expected, epsilon = 1e-12);
        assert!(gaussian_site(2.0, 1.0, 0.5, 0.0).is_err());
    }

    #[test]
    fn set_hyperparameters_updates_variance() {
        let mut lik = Gaussian::new(Some(0.0)).unwrap();
        lik.set_hyperparameters(array![1.0].view()).unwrap();
        assert_abs_diff_eq!(lik.variance(), (1.0f64.exp()).ln_1p(), epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // A noise parameter whose softplus underflows to a zero variance is an
    // error, never a NaN density.
    fn zero_variance_noise_parameter_is_rejected() {
        // Arrange
        let mut lik = Gaussian::new(Some(0.0)).unwrap();

        // Act & Assert
        assert!(matches!(
            Gaussian::new(Some(-800.0)),
            Err(LikelihoodError::InvalidHyperparameter { value, .. }) if value == -800.0
        ));
        assert!(lik.set_hyperparameters(array![-800.0].view()).is_err());
        let p = lik.evaluate_likelihood(1.0, array![0.0, 1.0].view(), None).unwrap();
        assert!(p.iter().all(|v| v.is_finite()));
        assert_abs_diff_eq!(lik.variance(), 2f64.ln(), epsilon = 1e-12);
    }
}
