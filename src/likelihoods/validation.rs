//! Likelihood validation helpers — reusable checks for cavity moments,
//! observations, options and hyperparameter vectors.
//!
//! Purpose
//! -------
//! Centralize the small input checks shared by every likelihood so that
//! constructors and moment-matching entry points fail fast with structured
//! [`LikelihoodError`]s instead of returning NaN.
//!
//! Conventions
//! -----------
//! - Every helper returns [`LikResult`] and never panics on invalid inputs.
//! - No I/O and no logging.
use crate::{
    likelihoods::errors::{LikResult, LikelihoodError},
    quadrature::gauss_hermite::MAX_NUM_POINTS,
};

/// Validate a scalar cavity `(m, v)`: `m` finite, `v` finite and `> 0`.
pub fn validate_cavity(m: f64, v: f64) -> LikResult<()> {
    if !m.is_finite() {
        return Err(LikelihoodError::NonFiniteCavityMean { value: m });
    }
    if !v.is_finite() || v <= 0.0 {
        return Err(LikelihoodError::NonPositiveCavityVariance { value: v });
    }
    Ok(())
}

/// Validate that an observation is finite.
pub fn validate_observation(y: f64) -> LikResult<f64> {
    if !y.is_finite() {
        return Err(LikelihoodError::NonFiniteObservation { value: y });
    }
    Ok(y)
}

/// Validate a count observation: finite and `≥ 0`.
pub fn validate_count(y: f64) -> LikResult<f64> {
    let y = validate_observation(y)?;
    if y < 0.0 {
        return Err(LikelihoodError::NegativeCount { value: y });
    }
    Ok(y)
}

/// Validate the EP power: finite and `> 0`.
pub fn validate_ep_fraction(value: f64) -> LikResult<f64> {
    if !value.is_finite() || value <= 0.0 {
        return Err(LikelihoodError::InvalidEpFraction { value });
    }
    Ok(value)
}

/// Validate the Gauss–Hermite order: `1 ≤ n ≤ MAX_NUM_POINTS`.
pub fn validate_num_quad_points(value: usize) -> LikResult<usize> {
    if value == 0 || value > MAX_NUM_POINTS {
        return Err(LikelihoodError::InvalidNumQuadPoints { value, max: MAX_NUM_POINTS });
    }
    Ok(value)
}

/// Validate the length of a hyperparameter vector.
pub fn validate_arity(likelihood: &'static str, expected: usize, actual: usize) -> LikResult<()> {
    if expected != actual {
        return Err(LikelihoodError::HyperparameterArity { likelihood, expected, actual });
    }
    Ok(())
}

/// Validate that every entry is finite (unconstrained space).
pub fn validate_finite_hyp(values: &[f64]) -> LikResult<()> {
    for (index, &value) in values.iter().enumerate() {
        if !value.is_finite() {
            return Err(LikelihoodError::InvalidHyperparameter {
                index,
                value,
                reason: "must be finite",
            });
        }
    }
    Ok(())
}

/// Validate that every entry is finite and strictly positive (model space).
pub fn validate_positive_hyp(values: &[f64]) -> LikResult<()> {
    validate_finite_hyp(values)?;
    for (index, &value) in values.iter().enumerate() {
        if value <= 0.0 {
            return Err(LikelihoodError::InvalidHyperparameter {
                index,
                value,
                reason: "must be strictly positive",
            });
        }
    }
    Ok(())
}
