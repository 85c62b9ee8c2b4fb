//! quadrature::cubature — fully symmetric cubature rules of degree 3 and 5.
//!
//! Purpose
//! -------
//! Provide sigma-point sets for the standard Gaussian measure whose node
//! count grows linearly (degree 3) or quadratically (degree 5) in the
//! dimension, for sigma-point style state updates where a tensor-product
//! Gauss–Hermite rule would be too expensive.
//!
//! Key behaviors
//! -------------
//! - [`symmetric_cubature_third_order`]: the cross ("unscented") layout
//!   `√(d+κ)·[0, I, −I]` with `w₀ = κ/(d+κ)` and `1/(2(d+κ))` elsewhere.
//! - [`symmetric_cubature_fifth_order`]: the McNamee–Stenger rule with
//!   generator `u = √3`, built in closed form for any dimension.
//!
//! Invariants & assumptions
//! ------------------------
//! - Both rules are fully symmetric, so odd moments vanish exactly.
//! - Weights sum to one; the fifth-order centre weight may exceed one and the
//!   axis weights turn negative for `d > 4`, which is inherent to the rule.
//!
//! Conventions
//! -----------
//! - Node columns are ordered centre, `+` axis points, `−` axis points for
//!   the third-order rule; the fifth-order rule appends the pair points
//!   `(+,+), (−,−), (+,−), (−,+)` for every axis pair `i < j`.
use crate::quadrature::{
    errors::{QuadResult, QuadratureError},
    rule::SigmaPoints,
};
use ndarray::{Array1, Array2};

fn check_dim(dim: usize) -> QuadResult<()> {
    if dim == 0 {
        return Err(QuadratureError::InvalidDimension {
            dim,
            reason: "dimension must be at least 1",
        });
    }
    Ok(())
}

/// symmetric_cubature_third_order — degree-3 cross rule with parameter κ.
///
/// Parameters
/// ----------
/// - `dim`: `usize`
///   Dimension `d ≥ 1`.
/// - `kappa`: `Option<f64>`
///   Spread parameter κ; `None` means 0, which gives the classic cubature
///   Kalman filter rule (the centre node keeps a zero weight).
///
/// Returns
/// -------
/// `QuadResult<SigmaPoints>`
///   `d × (2d + 1)` nodes and their weights.
///
/// Errors
/// ------
/// - `QuadratureError::InvalidDimension` when `dim == 0`.
/// - `QuadratureError::InvalidKappa` when κ is not finite or `d + κ ≤ 0`.
pub fn symmetric_cubature_third_order(dim: usize, kappa: Option<f64>) -> QuadResult<SigmaPoints> {
    check_dim(dim)?;
    let kappa = kappa.unwrap_or(0.0);
    if !kappa.is_finite() {
        return Err(QuadratureError::InvalidKappa { kappa, reason: "kappa must be finite" });
    }
    let spread = dim as f64 + kappa;
    if spread <= 0.0 {
        return Err(QuadratureError::InvalidKappa { kappa, reason: "dim + kappa must be positive" });
    }

    let scale = spread.sqrt();
    let mut points = Array2::<f64>::zeros((dim, 2 * dim + 1));
    for i in 0..dim {
        points[[i, 1 + i]] = scale;
        points[[i, 1 + dim + i]] = -scale;
    }
    let mut weights = Array1::from_elem(2 * dim + 1, 0.5 / spread);
    weights[0] = kappa / spread;
    SigmaPoints::new(points, weights)
}

/// symmetric_cubature_fifth_order — McNamee–Stenger degree-5 rule.
///
/// Parameters
/// ----------
/// - `dim`: `usize`
///   Dimension `d ≥ 1`.
///
/// Returns
/// -------
/// `QuadResult<SigmaPoints>`
///   `d × (2d² + 1)` nodes: the centre, `±√3 eᵢ` and `√3(±eᵢ ± eⱼ)`.
///
/// Errors
/// ------
/// - `QuadratureError::InvalidDimension` when `dim == 0`.
///
/// Notes
/// -----
/// - Weights are `A₀ = 1 − d(7 − d)/18`, `A₁ = (4 − d)/18` on the axis
///   points and `A₁₁ = 1/36` on the pair points. For `d = 1` this is the
///   three-point Gauss–Hermite rule.
pub fn symmetric_cubature_fifth_order(dim: usize) -> QuadResult<SigmaPoints> {
    check_dim(dim)?;
    let d = dim as f64;
    let u = 3f64.sqrt();
    let a0 = 1.0 - d * (7.0 - d) / 18.0;
    let a1 = (4.0 - d) / 18.0;
    let a11 = 1.0 / 36.0;

    let num_pairs = dim * (dim - 1) / 2;
    let n = 1 + 2 * dim + 4 * num_pairs;
    let mut points = Array2::<f64>::zeros((dim, n));
    let mut weights = Array1::<f64>::zeros(n);
    weights[0] = a0;

    let mut col = 1;
    for i in 0..dim {
        points[[i, col]] = u;
        points[[i, col + 1]] = -u;
        weights[col] = a1;
        weights[col + 1] = a1;
        col += 2;
    }
    for i in 0..dim {
        for j in (i + 1)..dim {
            for (si, sj) in [(1.0, 1.0), (-1.0, -1.0), (1.0, -1.0), (-1.0, 1.0)] {
                points[[i, col]] = si * u;
                points[[j, col]] = sj * u;
                weights[col] = a11;
                col += 1;
            }
        }
    }
    SigmaPoints::new(points, weights)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Exactness of both rules on every monomial up to their degree in
    //   dimensions 1 through 6.
    // - The degree-5 rule reducing to 3-point Gauss–Hermite in 1-D.
    // - Parameter validation.
    // -------------------------------------------------------------------------

    /// E[z^k] for z ~ N(0, 1).
    fn gaussian_moment(k: usize) -> f64 {
        if k % 2 == 1 {
            return 0.0;
        }
        (1..k).step_by(2).map(|j| j as f64).product()
    }

    /// All exponent vectors of length `dim` with total degree ≤ `max_degree`.
    fn exponents(dim: usize, max_degree: usize) -> Vec<Vec<usize>> {
        let mut out = vec![vec![]];
        for _ in 0..dim {
            let mut next = Vec::new();
            for prefix in &out {
                let used: usize = prefix.iter().sum();
                for e in 0..=(max_degree - used) {
                    let mut v = prefix.clone();
                    v.push(e);
                    next.push(v);
                }
            }
            out = next;
        }
        out
    }

    fn assert_exact(rule: &SigmaPoints, degree: usize) {
        for alpha in exponents(rule.dim(), degree) {
            let expected: f64 = alpha.iter().map(|&k| gaussian_moment(k)).product();
            let got = rule.integrate(|z| {
                alpha.iter().enumerate().map(|(i, &k)| z[i].powi(k as i32)).product()
            });
            assert!(
                (got - expected).abs() < 1e-12,
                "dim {} monomial {alpha:?}: got {got}, expected {expected}",
                rule.dim()
            );
        }
    }

    #[test]
    // Purpose
    // -------
    // The third-order rule is exact on every monomial of degree ≤ 3.
    //
    // Given
    // -----
    // - Dimensions 1..=6 and κ ∈ {default, 0.5, 3 − d}.
    //
    // Expect
    // ------
    // - All moments reproduced to 1e-12; 2d + 1 nodes.
    fn third_order_rule_is_exact_to_degree_three() {
        for dim in 1..=6 {
            for kappa in [None, Some(0.5), Some(3.0 - dim as f64 + 0.25)] {
                // Act
                let rule = symmetric_cubature_third_order(dim, kappa).unwrap();

                // Assert
                assert_eq!(rule.len(), 2 * dim + 1);
                assert_exact(&rule, 3);
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // The fifth-order rule is exact on every monomial of degree ≤ 5.
    //
    // Given
    // -----
    // - Dimensions 1..=6.
    //
    // Expect
    // ------
    // - All moments reproduced to 1e-12; 2d² + 1 nodes.
    fn fifth_order_rule_is_exact_to_degree_five() {
        for dim in 1..=6 {
            // Act
            let rule = symmetric_cubature_fifth_order(dim).unwrap();

            // Assert
            assert_eq!(rule.len(), 2 * dim * dim + 1);
            assert_exact(&rule, 5);
        }
    }

    #[test]
    fn fifth_order_rule_in_one_dimension_is_three_point_hermite() {
        let rule = symmetric_cubature_fifth_order(1).unwrap();
        let s3 = 3f64.sqrt();
        assert_eq!(rule.points()[[0, 0]], 0.0);
        assert_abs_diff_eq!(rule.points()[[0, 1]], s3, epsilon = 1e-15);
        assert_abs_diff_eq!(rule.points()[[0, 2]], -s3, epsilon = 1e-15);
        assert_abs_diff_eq!(rule.weights()[0], 2.0 / 3.0, epsilon = 1e-15);
        assert_abs_diff_eq!(rule.weights()[1], 1.0 / 6.0, epsilon = 1e-15);
    }

    #[test]
    fn third_order_default_matches_unscented_layout() {
        let rule = symmetric_cubature_third_order(2, None).unwrap();
        let s2 = 2f64.sqrt();
        assert_eq!(rule.weights()[0], 0.0);
        assert_abs_diff_eq!(rule.weights()[1], 0.25, epsilon = 1e-15);
        assert_abs_diff_eq!(rule.points()[[0, 1]], s2, epsilon = 1e-15);
        assert_abs_diff_eq!(rule.points()[[1, 4]], -s2, epsilon = 1e-15);
        assert_eq!(rule.points()[[1, 1]], 0.0);
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        assert!(matches!(
            symmetric_cubature_third_order(0, None),
            Err(QuadratureError::InvalidDimension { .. })
        ));
        assert!(matches!(
            symmetric_cubature_third_order(2, Some(-2.0)),
            Err(QuadratureError::InvalidKappa { .. })
        ));
        assert!(matches!(
            symmetric_cubature_third_order(2, Some(f64::NAN)),
            Err(QuadratureError::InvalidKappa { .. })
        ));
        assert!(matches!(
            symmetric_cubature_fifth_order(0),
            Err(QuadratureError::InvalidDimension { .. })
        ));
    }
}
