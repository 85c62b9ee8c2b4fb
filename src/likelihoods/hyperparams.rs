//! Unconstrained likelihood hyperparameters.
//!
//! A [`Hyperparameters`] value stores the raw vector θ that the external
//! optimizer updates. θ may take any finite real value for which softplus
//! stays representable (about `θ > −745`); consumers see the model-space
//! values through [`Hyperparameters::constrained`], which applies softplus
//! element-wise, so positivity never depends on clamping.
use crate::{
    likelihoods::{
        errors::{LikResult, LikelihoodError},
        validation::{validate_arity, validate_finite_hyp, validate_positive_hyp},
    },
    numerics::transformations::{softplus_inv_vec, softplus_vec},
};
use ndarray::{Array1, ArrayView1};

/// Hyperparameters — unconstrained (softplus-preimage) parameter vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Hyperparameters {
    theta: Array1<f64>,
}

impl Hyperparameters {
    /// Wrap an unconstrained vector.
    ///
    /// # Errors
    /// `LikelihoodError::InvalidHyperparameter` if any entry is NaN/±inf or
    /// so negative that softplus underflows to 0.
    pub fn new(theta: Array1<f64>) -> LikResult<Self> {
        validate_theta(theta.view())?;
        Ok(Hyperparameters { theta })
    }

    /// The empty vector of a likelihood without hyperparameters.
    pub fn empty() -> Self {
        Hyperparameters { theta: Array1::zeros(0) }
    }

    /// Build from model-space values by inverting softplus.
    ///
    /// # Errors
    /// - `LikelihoodError::InvalidHyperparameter` for non-positive values.
    /// - `LikelihoodError::Numerics` if the inverse transform fails.
    pub fn from_constrained(values: &[f64]) -> LikResult<Self> {
        validate_positive_hyp(values)?;
        let theta = softplus_inv_vec(ArrayView1::from(values))?;
        Ok(Hyperparameters { theta })
    }

    pub fn len(&self) -> usize {
        self.theta.len()
    }

    pub fn is_empty(&self) -> bool {
        self.theta.is_empty()
    }

    /// Raw θ.
    pub fn unconstrained(&self) -> ArrayView1<'_, f64> {
        self.theta.view()
    }

    /// softplus(θ), element-wise.
    pub fn constrained(&self) -> Array1<f64> {
        softplus_vec(self.theta.view())
    }

    /// Replace θ in place, keeping the arity.
    ///
    /// # Errors
    /// - `LikelihoodError::HyperparameterArity` when the length changes.
    /// - `LikelihoodError::InvalidHyperparameter` for non-finite entries or
    ///   entries whose softplus underflows.
    pub fn set_unconstrained(&mut self, likelihood: &'static str, theta: ArrayView1<f64>) -> LikResult<()> {
        validate_arity(likelihood, self.theta.len(), theta.len())?;
        validate_theta(theta)?;
        self.theta.assign(&theta);
        Ok(())
    }
}

/// Finite θ whose softplus image is strictly positive.
fn validate_theta(theta: ArrayView1<f64>) -> LikResult<()> {
    validate_finite_hyp(&theta.to_vec())?;
    match softplus_vec(theta).iter().position(|&s| s <= 0.0) {
        Some(index) => Err(LikelihoodError::InvalidHyperparameter {
            index,
            value: theta[index],
            reason: "softplus underflows to zero",
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::likelihoods::errors::LikelihoodError;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn constrained_values_round_trip() {
        let hyp = Hyperparameters::from_constrained(&[0.3, 2.5]).unwrap();
        let back = hyp.constrained();
        assert_eq!(hyp.len(), 2);
        assert_abs_diff_eq!(back[0], 0.3, epsilon = 1e-12);
        assert_abs_diff_eq!(back[1], 2.5, epsilon = 1e-12);
    }

    #[test]
    fn any_finite_theta_maps_to_positive_values() {
        let hyp = Hyperparameters::new(array![-40.0, 0.0, 40.0]).unwrap();
        assert!(hyp.constrained().iter().all(|&v| v > 0.0));
        assert!(Hyperparameters::new(array![f64::NAN]).is_err());
        assert!(Hyperparameters::empty().is_empty());
        assert_eq!(Hyperparameters::empty().constrained().len(), 0);
    }

    #[test]
    fn set_unconstrained_checks_arity() {
        let mut hyp = Hyperparameters::new(array![-2.25]).unwrap();
        hyp.set_unconstrained("Gaussian", array![1.0].view()).unwrap();
        assert_eq!(hyp.unconstrained()[0], 1.0);
        assert_eq!(
            hyp.set_unconstrained("Gaussian", array![1.0, 2.0].view()).unwrap_err(),
            LikelihoodError::HyperparameterArity { likelihood: "Gaussian", expected: 1, actual: 2 }
        );
    }

    #[test]
    // Purpose
    // -------
    // θ far enough below zero that softplus(θ) underflows to exactly 0 is
    // rejected on construction and on update, and the stored value survives
    // a rejected update.
    fn underflowing_theta_is_rejected() {
        // Arrange
        let underflow = LikelihoodError::InvalidHyperparameter {
            index: 1,
            value: -800.0,
            reason: "softplus underflows to zero",
        };
        let mut hyp = Hyperparameters::new(array![0.5, -2.0]).unwrap();

        // Act & Assert
        assert_eq!(Hyperparameters::new(array![0.5, -800.0]).unwrap_err(), underflow);
        assert_eq!(hyp.set_unconstrained("Test", array![0.5, -800.0].view()).unwrap_err(), underflow);
        assert_eq!(hyp.unconstrained()[1], -2.0);
        assert!(Hyperparameters::new(array![-700.0]).unwrap().constrained()[0] > 0.0);
    }
}
