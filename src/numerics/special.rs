//! Special functions for the Gaussian CDF family.
//!
//! `log_phi` is the single entry point used by the closed-form Probit
//! moment match: it returns `log Φ(z)` together with `d log Φ(z) / dz`
//! computed from the same intermediate, so that the ratio `N(z) / Φ(z)` is
//! never formed from two separately rounded quantities.
use statrs::function::erf::{erf, erfc};
use std::f64::consts::{PI, SQRT_2};

/// Below this argument `erfc(-z/√2)` approaches the subnormal range and the
/// asymptotic expansion of the Mills ratio takes over.
const LOWER_TAIL_SWITCH: f64 = -37.0;

/// Standard normal density `N(z | 0, 1)`.
pub fn std_normal_pdf(z: f64) -> f64 {
    (-0.5 * z * z).exp() / (2.0 * PI).sqrt()
}

/// Standard normal CDF `Φ(z) = erfc(-z / √2) / 2`.
pub fn std_normal_cdf(z: f64) -> f64 {
    0.5 * erfc(-z / SQRT_2)
}

/// Error function re-exported for the Probit likelihood.
pub fn error_fn(x: f64) -> f64 {
    erf(x)
}

/// Complementary error function re-exported for the Probit link.
pub fn error_fn_c(x: f64) -> f64 {
    erfc(x)
}

/// log_phi — log Gaussian CDF and its derivative.
///
/// Purpose
/// -------
/// Evaluate `log Φ(z) = log(erfc(-z/√2) / 2)` and
/// `d log Φ(z) / dz = N(z | 0, 1) / Φ(z)`.
///
/// Parameters
/// ----------
/// - `z`: `f64`
///   Argument, typically `y m / √(1 + v)` in the Probit moment match.
///
/// Returns
/// -------
/// `(f64, f64)`
///   `(log Φ(z), d log Φ(z)/dz)`.
///
/// Notes
/// -----
/// - For `z < -37` the lower-tail expansion
///   `Φ(z) ≈ N(z) / (-z) · (1 - z⁻² + 3z⁻⁴ - 15z⁻⁶ + 105z⁻⁸)` is used, so the
///   result stays finite well past the point where `erfc` underflows.
/// - The derivative in the regular branch is `exp(-z²/2 - log Φ(z)) / √(2π)`,
///   which keeps the ratio accurate when `Φ(z)` is small.
pub fn log_phi(z: f64) -> (f64, f64) {
    if z < LOWER_TAIL_SWITCH {
        let w = 1.0 / (z * z);
        let series = 1.0 - w + 3.0 * w * w - 15.0 * w * w * w + 105.0 * w * w * w * w;
        let lp = -0.5 * z * z - (-z).ln() - 0.5 * (2.0 * PI).ln() + series.ln();
        let dlp = -z / series;
        return (lp, dlp);
    }
    let lp = (erfc(-z / SQRT_2) / 2.0).ln();
    let dlp = (-z * z / 2.0 - lp).exp() / (2.0 * PI).sqrt();
    (lp, dlp)
}
