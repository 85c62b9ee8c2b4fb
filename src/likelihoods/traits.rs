//! The [`Likelihood`] capability trait.
//!
//! Implementors provide pointwise evaluation of `p(y | f)` and
//! `log p(y | f)`; moment matching falls back to Gauss–Hermite quadrature
//! over those evaluations unless a variant binds a closed form.
//!
//! Convention: `hyp` arguments are model-space (constrained) values. `None`
//! means "use softplus of the stored unconstrained vector".
use crate::likelihoods::{
    errors::LikResult,
    hyperparams::Hyperparameters,
    moments::{MomentMatch, moment_match_quadrature, moment_match_quadrature_log},
    options::MomentMatchOptions,
    sampling,
    validation::{validate_arity, validate_positive_hyp},
};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use rand::RngCore;

/// Observation model `p(y | f)` with moment matching against a Gaussian
/// cavity.
///
/// Required:
/// - `name`, `hyperparameters`, `hyperparameters_mut`: identity and
///   parameter storage.
/// - `evaluate_likelihood` / `evaluate_log_likelihood`: values at every
///   latent node in `f`.
///
/// Optional:
/// - `link_fn`: latent to observation-scale map (identity by default).
/// - `moment_match`: defaults to [`Likelihood::moment_match_quadrature`].
/// - `sample_noise`: additive Gaussian noise with an explicit RNG.
pub trait Likelihood {
    // Required methods
    fn name(&self) -> &'static str;
    fn hyperparameters(&self) -> &Hyperparameters;
    fn hyperparameters_mut(&mut self) -> &mut Hyperparameters;
    fn evaluate_likelihood(
        &self, y: f64, f: ArrayView1<f64>, hyp: Option<&[f64]>,
    ) -> LikResult<Array1<f64>>;
    fn evaluate_log_likelihood(
        &self, y: f64, f: ArrayView1<f64>, hyp: Option<&[f64]>,
    ) -> LikResult<Array1<f64>>;

    // Optional methods
    fn link_fn(&self, latent: f64) -> f64 {
        latent
    }

    /// Replace the stored unconstrained hyperparameters (optimizer update).
    ///
    /// # Errors
    /// Arity or finiteness violations, see [`Hyperparameters::set_unconstrained`].
    fn set_hyperparameters(&mut self, theta: ArrayView1<f64>) -> LikResult<()> {
        let name = self.name();
        self.hyperparameters_mut().set_unconstrained(name, theta)
    }

    /// Model-space hyperparameters for one call.
    ///
    /// # Errors
    /// - `LikelihoodError::HyperparameterArity` if `hyp` has the wrong length.
    /// - `LikelihoodError::InvalidHyperparameter` for non-positive entries,
    ///   supplied or stored.
    fn resolve_hyp(&self, hyp: Option<&[f64]>) -> LikResult<Array1<f64>> {
        match hyp {
            Some(values) => {
                validate_arity(self.name(), self.hyperparameters().len(), values.len())?;
                validate_positive_hyp(values)?;
                Ok(Array1::from(values.to_vec()))
            }
            None => {
                let values = self.hyperparameters().constrained();
                validate_positive_hyp(&values.to_vec())?;
                Ok(values)
            }
        }
    }

    /// Gauss–Hermite moment matching over this likelihood's pointwise
    /// evaluation, honoring `opts.ep_fraction` and `opts.log_space`.
    fn moment_match_quadrature(
        &self, y: f64, m: f64, v: f64, hyp: Option<&[f64]>, opts: &MomentMatchOptions,
    ) -> LikResult<MomentMatch> {
        if opts.log_space {
            moment_match_quadrature_log(|f| self.evaluate_log_likelihood(y, f, hyp), m, v, opts)
        } else {
            moment_match_quadrature(|f| self.evaluate_likelihood(y, f, hyp), m, v, opts)
        }
    }

    /// `(logZ, dlogZ/dm, d²logZ/dm²)` for the cavity `N(m, v)`.
    fn moment_match(
        &self, y: f64, m: f64, v: f64, hyp: Option<&[f64]>, opts: &MomentMatchOptions,
    ) -> LikResult<MomentMatch> {
        self.moment_match_quadrature(y, m, v, hyp, opts)
    }

    /// Add observation noise with per-row variance to `latent_mean`.
    fn sample_noise(
        &self, latent_mean: ArrayView2<f64>, likelihood_var: ArrayView1<f64>, rng: &mut dyn RngCore,
    ) -> LikResult<Array2<f64>> {
        sampling::sample_noise(latent_mean, likelihood_var, rng)
    }
}
