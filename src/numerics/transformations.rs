//! Numerical stability utilities.
//!
//! Provides safe implementations of the positivity transforms used to store
//! likelihood and prior hyperparameters in unconstrained form, plus the
//! small closed-form helpers shared by state-space priors.
//!
//! # Provided items
//! - [`LOG_FLOOR`]: floor applied to normalizing terms before taking logs.
//! - [`LOG_EPS`]: epsilon added inside log-CDF evaluations.
//! - [`softplus(x)`]: `log(1 + exp(-|x|)) + max(x, 0)`, mapping ℝ → (0, ∞)
//!   without overflow.
//! - [`softplus_inv(y)`]: inverse of softplus on `(0, ∞)`, written as
//!   `y + log(-expm1(-y))` so that neither tail cancels catastrophically.
//! - [`softplus_vec`] / [`softplus_inv_vec`]: element-wise versions over
//!   hyperparameter vectors (an empty vector maps to an empty vector).
//! - [`sigmoid(x)`]: logistic function evaluated on the stable branch.
//! - [`rotation_matrix(dt, omega)`]: 2×2 rotation used by oscillatory priors.
//!
//! # Rationale
//! Hyperparameters live in softplus-preimage space so that any real vector
//! handed over by an optimizer maps to valid (strictly positive) variances
//! and rates without clamping.
use crate::numerics::errors::{NumericsError, NumericsResult};
use ndarray::{Array1, Array2, ArrayView1, array};

/// Floor applied to a normalizing term before taking its logarithm.
///
/// Used by the closed-form Gaussian moment match, where `2π(σ² + v)` could
/// underflow to zero and turn `log Z` into `-∞`.
pub const LOG_FLOOR: f64 = 1e-10;

/// Small epsilon added inside `log(1 + erf(·))` for the Probit log-likelihood.
pub const LOG_EPS: f64 = 1e-10;

/// Numerically stable softplus: `softplus(x) = ln(1 + exp(x))`.
///
/// Evaluated as `ln1p(exp(-|x|)) + max(x, 0)`: the exponential argument is
/// never positive, so large `x` cannot overflow and large negative `x`
/// returns a value that approaches 0 from above.
///
/// # Parameters
/// - `x`: real input.
///
/// # Returns
/// - `softplus(x) > 0` for every finite `x` representable without
///   underflow of `exp(x)`, i.e. `x > −745`; below that the result is
///   exactly 0 and callers that need positivity must reject the input
///   (see `likelihoods::Hyperparameters`). NaN propagates.
pub fn softplus(x: f64) -> f64 {
    (-x.abs()).exp().ln_1p() + x.max(0.0)
}

/// Stable inverse of softplus on `(0, ∞)`: solves `softplus(t) = y` for `t`.
///
/// Computes `t = y + ln(1 - exp(-y)) = y + ln(-expm1(-y))`. For large `y`
/// the correction term vanishes; for tiny `y` the expression reduces to
/// `ln(y)` without forming `exp(y) - 1` explicitly.
///
/// # Errors
/// - [`NumericsError::NonPositiveSoftplusInput`] if `y` is not finite or
///   `y <= 0`.
pub fn softplus_inv(y: f64) -> NumericsResult<f64> {
    if !y.is_finite() || y <= 0.0 {
        return Err(NumericsError::NonPositiveSoftplusInput { value: y });
    }
    Ok(y + (-(-y).exp_m1()).ln())
}

/// Inverse softplus that passes through the "no hyperparameter" sentinel.
///
/// `None` is returned unchanged; `Some(y)` is mapped through
/// [`softplus_inv`].
pub fn softplus_inv_opt(y: Option<f64>) -> NumericsResult<Option<f64>> {
    y.map(softplus_inv).transpose()
}

/// Element-wise [`softplus`] over a hyperparameter vector.
pub fn softplus_vec(x: ArrayView1<f64>) -> Array1<f64> {
    x.mapv(softplus)
}

/// Element-wise [`softplus_inv`] over a vector of positive values.
///
/// # Errors
/// Returns the first [`NumericsError::NonPositiveSoftplusInput`] found.
pub fn softplus_inv_vec(y: ArrayView1<f64>) -> NumericsResult<Array1<f64>> {
    let values = y.iter().map(|&v| softplus_inv(v)).collect::<NumericsResult<Vec<f64>>>()?;
    Ok(Array1::from(values))
}

/// Logistic sigmoid `1 / (1 + exp(-x))`, evaluated on the branch whose
/// exponential cannot overflow.
pub fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// Discrete-time rotation matrix
/// `[[cos(ω Δt), -sin(ω Δt)], [sin(ω Δt), cos(ω Δt)]]`.
///
/// # Parameters
/// - `dt`: step size `Δt`.
/// - `omega`: angular frequency `ω`.
pub fn rotation_matrix(dt: f64, omega: f64) -> Array2<f64> {
    let (sin, cos) = (omega * dt).sin_cos();
    array![[cos, -sin], [sin, cos]]
}
