//! quadrature::gauss_hermite — one-dimensional and tensor-product
//! Gauss–Hermite rules.
//!
//! Purpose
//! -------
//! Build Gauss–Hermite nodes and weights for the weight function `exp(-x²)`
//! and rescale them into rules for the standard Gaussian measure, in one
//! dimension or as a full tensor product in `dim` dimensions.
//!
//! Key behaviors
//! -------------
//! - [`hermgauss`] solves the Golub–Welsch eigenproblem of the symmetric
//!   tridiagonal Jacobi matrix (off-diagonal `√(k/2)`) with
//!   `nalgebra::SymmetricEigen`, then polishes every node with Newton steps
//!   on the orthonormal Hermite recurrence. Weights come from the polished
//!   derivative, `2 / p'ₙ(x)²`, which keeps tail weights accurate in
//!   relative terms.
//! - [`mv_hermgauss`] forms the tensor product of `dim` copies of the 1-D
//!   rule (last coordinate varying fastest).
//! - [`gauss_hermite`] rescales nodes by `√2` and weights by `π^{-dim/2}`
//!   so that `Σ wᵢ f(xᵢ) ≈ E_{z~N(0,I)}[f(z)]`.
//!
//! Invariants & assumptions
//! ------------------------
//! - `1 ≤ num_points ≤ MAX_NUM_POINTS` and `num_points^dim ≤ MAX_NODES`.
//! - Nodes are returned in ascending order and are exactly symmetric about
//!   the origin (odd rules contain an exact zero).
//!
//! Performance
//! -----------
//! - The node count grows as `num_points^dim`; only low-dimensional
//!   marginals are practical. The scalar case (`dim = 1`) is the common path
//!   and is memoized through [`crate::quadrature::sigma_points`].
use crate::quadrature::{
    errors::{QuadResult, QuadratureError},
    rule::SigmaPoints,
};
use nalgebra::{DMatrix, SymmetricEigen};
use ndarray::{Array1, Array2};
use std::f64::consts::{PI, SQRT_2};

/// Largest supported number of 1-D nodes.
pub const MAX_NUM_POINTS: usize = 200;

/// Largest supported number of tensor-product nodes.
pub const MAX_NODES: usize = 1_000_000;

const NEWTON_MAX_ITER: usize = 10;
const NEWTON_TOL: f64 = 1e-14;

/// Orthonormal Hermite polynomial `pₙ(x)` and `pₙ₋₁(x)` via the three-term
/// recurrence, starting from `p₀ = π^{-1/4}`.
fn hermite_pair(n: usize, x: f64) -> (f64, f64) {
    let mut p_curr = PI.powf(-0.25);
    let mut p_prev = 0.0;
    for j in 1..=n {
        let jf = j as f64;
        let p_next = x * (2.0 / jf).sqrt() * p_curr - ((jf - 1.0) / jf).sqrt() * p_prev;
        p_prev = p_curr;
        p_curr = p_next;
    }
    (p_curr, p_prev)
}

/// hermgauss — physicists' Gauss–Hermite nodes and weights.
///
/// Parameters
/// ----------
/// - `num_points`: `usize`
///   Number of nodes `n`; the rule is exact for polynomials of degree
///   `≤ 2n − 1` against `exp(-x²)`.
///
/// Returns
/// -------
/// `QuadResult<(Array1<f64>, Array1<f64>)>`
///   Ascending nodes `x` and weights `w` with `Σ w = √π`.
///
/// Errors
/// ------
/// - `QuadratureError::InvalidNumPoints` when `num_points` is 0 or exceeds
///   [`MAX_NUM_POINTS`].
/// - `QuadratureError::EigenDecompositionFailed` if any node or weight
///   comes out non-finite.
pub fn hermgauss(num_points: usize) -> QuadResult<(Array1<f64>, Array1<f64>)> {
    if num_points == 0 {
        return Err(QuadratureError::InvalidNumPoints {
            num_points,
            reason: "at least one node is required",
        });
    }
    if num_points > MAX_NUM_POINTS {
        return Err(QuadratureError::InvalidNumPoints {
            num_points,
            reason: "exceeds the supported maximum of 200 nodes",
        });
    }
    let n = num_points;

    let jacobi = DMatrix::<f64>::from_fn(n, n, |i, j| {
        if j == i + 1 || i == j + 1 { ((i.max(j)) as f64 / 2.0).sqrt() } else { 0.0 }
    });
    let mut nodes: Vec<f64> = SymmetricEigen::new(jacobi).eigenvalues.iter().copied().collect();
    nodes.sort_by(f64::total_cmp);

    let mut weights = vec![0.0; n];
    for (x, w) in nodes.iter_mut().zip(weights.iter_mut()) {
        let mut deriv = 0.0;
        for _ in 0..NEWTON_MAX_ITER {
            let (p_n, p_nm1) = hermite_pair(n, *x);
            deriv = (2.0 * n as f64).sqrt() * p_nm1;
            let step = p_n / deriv;
            *x -= step;
            if step.abs() <= NEWTON_TOL * x.abs().max(1.0) {
                break;
            }
        }
        let (_, p_nm1) = hermite_pair(n, *x);
        if p_nm1 != 0.0 {
            deriv = (2.0 * n as f64).sqrt() * p_nm1;
        }
        *w = 2.0 / (deriv * deriv);
    }

    // Enforce exact symmetry about the origin.
    for i in 0..n / 2 {
        let j = n - 1 - i;
        let half_gap = 0.5 * (nodes[j] - nodes[i]);
        let mean_w = 0.5 * (weights[i] + weights[j]);
        nodes[i] = -half_gap;
        nodes[j] = half_gap;
        weights[i] = mean_w;
        weights[j] = mean_w;
    }
    if n % 2 == 1 {
        nodes[n / 2] = 0.0;
    }

    if nodes.iter().chain(weights.iter()).any(|v| !v.is_finite()) {
        return Err(QuadratureError::EigenDecompositionFailed { num_points });
    }
    Ok((Array1::from(nodes), Array1::from(weights)))
}

/// mv_hermgauss — tensor-product Gauss–Hermite in raw (`exp(-‖x‖²)`) scaling.
///
/// Parameters
/// ----------
/// - `num_points`: nodes per axis `H`.
/// - `dim`: number of axes `D`.
///
/// Returns
/// -------
/// `QuadResult<(Array2<f64>, Array1<f64>)>`
///   Locations `x` of shape `H^D × D` and weights of length `H^D`, each weight
///   being the product of the per-axis weights. The last coordinate varies
///   fastest.
///
/// Errors
/// ------
/// - `QuadratureError::InvalidDimension` when `dim == 0`.
/// - `QuadratureError::TooManyNodes` when `H^D` exceeds [`MAX_NODES`].
/// - Any error from [`hermgauss`].
pub fn mv_hermgauss(num_points: usize, dim: usize) -> QuadResult<(Array2<f64>, Array1<f64>)> {
    if dim == 0 {
        return Err(QuadratureError::InvalidDimension {
            dim,
            reason: "dimension must be at least 1",
        });
    }
    let (x, w) = hermgauss(num_points)?;
    let total = u32::try_from(dim)
        .ok()
        .and_then(|d| num_points.checked_pow(d))
        .filter(|&t| t <= MAX_NODES)
        .ok_or(QuadratureError::TooManyNodes { num_points, dim, limit: MAX_NODES })?;

    let mut locations = Array2::<f64>::zeros((total, dim));
    let mut weights = Array1::<f64>::ones(total);
    for k in 0..total {
        let mut rem = k;
        for axis in (0..dim).rev() {
            let digit = rem % num_points;
            rem /= num_points;
            locations[[k, axis]] = x[digit];
            weights[k] *= w[digit];
        }
    }
    Ok((locations, weights))
}

/// gauss_hermite — Gauss–Hermite rule for the standard Gaussian measure.
///
/// Purpose
/// -------
/// Return sigma points (`dim × num_points^dim`) and weights such that
/// `Σ wᵢ f(xᵢ)` approximates `E_{z~N(0, I_dim)}[f(z)]`.
///
/// Parameters
/// ----------
/// - `dim`: `usize`
///   Dimension of the latent marginal (1 for scalar moment matching).
/// - `num_points`: `usize`
///   Nodes per axis.
///
/// Errors
/// ------
/// - Any error from [`mv_hermgauss`].
///
/// Notes
/// -----
/// - Nodes are scaled by `√2` and weights by `π^{-dim/2}`, so the weights
///   sum to one in every dimension.
///
/// Examples
/// --------
/// ```rust
/// # use rust_sde_gp::quadrature::gauss_hermite::gauss_hermite;
/// let rule = gauss_hermite(1, 20).unwrap();
/// let second_moment = rule.integrate(|z| z[0] * z[0]);
/// assert!((second_moment - 1.0).abs() < 1e-12);
/// ```
pub fn gauss_hermite(dim: usize, num_points: usize) -> QuadResult<SigmaPoints> {
    let (x, w) = mv_hermgauss(num_points, dim)?;
    let weight_scale = PI.powf(-(dim as f64) / 2.0);
    let points = x.t().mapv(|v| SQRT_2 * v);
    let weights = w.mapv(|v| v * weight_scale);
    SigmaPoints::new(points, weights)
}
