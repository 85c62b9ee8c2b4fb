//! Closed set of likelihood variants behind one value type.
//!
//! [`LikelihoodKind`] lets hosts pick a likelihood by name at run time while
//! keeping static dispatch. Every trait method delegates to the wrapped
//! variant, so closed-form overrides survive the wrapping.
use crate::likelihoods::{
    errors::{LikResult, LikelihoodError},
    gaussian::Gaussian,
    hyperparams::Hyperparameters,
    moments::MomentMatch,
    options::MomentMatchOptions,
    poisson::{Poisson, PoissonLink},
    probit::Probit,
    traits::Likelihood,
};
use ndarray::{Array1, ArrayView1};

/// One of the supported observation models.
#[derive(Debug, Clone, PartialEq)]
pub enum LikelihoodKind {
    Gaussian(Gaussian),
    Probit(Probit),
    Poisson(Poisson),
}

impl LikelihoodKind {
    /// Build a default-configured variant from its name.
    ///
    /// Accepted (case-insensitive): `gaussian`, `probit`, `erf`, `poisson`
    /// (exp link), `poisson-exp`, `poisson-logistic`, `poisson-softplus`.
    /// The Gaussian variant starts at the default noise level.
    ///
    /// # Errors
    /// `LikelihoodError::UnsupportedLikelihood` for any other name.
    pub fn from_name(name: &str) -> LikResult<Self> {
        let lowered = name.to_lowercase();
        match lowered.as_str() {
            "gaussian" => Ok(LikelihoodKind::Gaussian(Gaussian::new(None)?)),
            "probit" | "erf" => Ok(LikelihoodKind::Probit(Probit::new())),
            "poisson" => Ok(LikelihoodKind::Poisson(Poisson::new(PoissonLink::Exp))),
            _ => match lowered.strip_prefix("poisson-") {
                Some(link) => Ok(LikelihoodKind::Poisson(Poisson::with_link_name(link)?)),
                None => Err(LikelihoodError::UnsupportedLikelihood { name: name.to_string() }),
            },
        }
    }

    fn inner(&self) -> &dyn Likelihood {
        match self {
            LikelihoodKind::Gaussian(l) => l,
            LikelihoodKind::Probit(l) => l,
            LikelihoodKind::Poisson(l) => l,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Likelihood {
        match self {
            LikelihoodKind::Gaussian(l) => l,
            LikelihoodKind::Probit(l) => l,
            LikelihoodKind::Poisson(l) => l,
        }
    }
}

impl From<Gaussian> for LikelihoodKind {
    fn from(value: Gaussian) -> Self {
        LikelihoodKind::Gaussian(value)
    }
}

impl From<Probit> for LikelihoodKind {
    fn from(value: Probit) -> Self {
        LikelihoodKind::Probit(value)
    }
}

impl From<Poisson> for LikelihoodKind {
    fn from(value: Poisson) -> Self {
        LikelihoodKind::Poisson(value)
    }
}

impl Likelihood for LikelihoodKind {
    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn hyperparameters(&self) -> &Hyperparameters {
        self.inner().hyperparameters()
    }

    fn hyperparameters_mut(&mut self) -> &mut Hyperparameters {
        self.inner_mut().hyperparameters_mut()
    }

    fn evaluate_likelihood(
        &self, y: f64, f: ArrayView1<f64>, hyp: Option<&[f64]>,
    ) -> LikResult<Array1<f64>> {
        self.inner().evaluate_likelihood(y, f, hyp)
    }

    fn evaluate_log_likelihood(
        &self, y: f64, f: ArrayView1<f64>, hyp: Option<&[f64]>,
    ) -> LikResult<Array1<f64>> {
        self.inner().evaluate_log_likelihood(y, f, hyp)
    }

    fn link_fn(&self, latent: f64) -> f64 {
        self.inner().link_fn(latent)
    }

    fn moment_match_quadrature(
        &self, y: f64, m: f64, v: f64, hyp: Option<&[f64]>, opts: &MomentMatchOptions,
    ) -> LikResult<MomentMatch> {
        self.inner().moment_match_quadrature(y, m, v, hyp, opts)
    }

    fn moment_match(
        &self, y: f64, m: f64, v: f64, hyp: Option<&[f64]>, opts: &MomentMatchOptions,
    ) -> LikResult<MomentMatch> {
        self.inner().moment_match(y, m, v, hyp, opts)
    }
}
