//! numerics::linalg — Cholesky-based solves for symmetric positive-definite
//! matrices.
//!
//! Purpose
//! -------
//! Provide `P⁻¹Q` and `P⁻¹` for symmetric positive-definite `P` by factoring
//! once and back/forward-substituting. Public signatures take and return
//! `ndarray` containers; the factorization itself is delegated to
//! `nalgebra::Cholesky`.
//!
//! Key behaviors
//! -------------
//! - Validate shape, finiteness and symmetry of `P` before factoring.
//! - Surface a failed factorization as
//!   [`NumericsError::NotPositiveDefinite`] instead of returning NaNs.
//! - Copy between `ndarray::Array2` and `nalgebra::DMatrix` with
//!   [`to_dmatrix`] / [`from_dmatrix`].
//!
//! Invariants & assumptions
//! ------------------------
//! - Symmetry is checked with a relative tolerance of [`SYMMETRY_TOL`]; the
//!   factorization reads only the lower triangle.
//! - Matrices are small (state dimensions of a few units up to a few dozen),
//!   so copying into `DMatrix` is negligible next to the factorization.
//!
//! Conventions
//! -----------
//! - Right-hand sides are `n×k` with `n = P.nrows()`.
//! - Errors are reported via [`NumericsResult<T>`].
//!
//! Testing notes
//! -------------
//! - Unit tests check `P · solve(P, Q) = Q`, `P · inv(P) = I` on seeded random
//!   PD matrices and the `NotPositiveDefinite` path on an indefinite matrix.
use crate::numerics::errors::{NumericsError, NumericsResult};
use nalgebra::{Cholesky, DMatrix, Dyn};
use ndarray::{Array1, Array2};

/// Relative tolerance for the symmetry check on `P`.
pub const SYMMETRY_TOL: f64 = 1e-10;

/// Copy an `ndarray` matrix into a column-major `nalgebra::DMatrix`.
pub fn to_dmatrix(a: &Array2<f64>) -> DMatrix<f64> {
    DMatrix::from_fn(a.nrows(), a.ncols(), |i, j| a[[i, j]])
}

/// Copy a `nalgebra::DMatrix` back into an `ndarray` matrix.
pub fn from_dmatrix(m: &DMatrix<f64>) -> Array2<f64> {
    Array2::from_shape_fn((m.nrows(), m.ncols()), |(i, j)| m[(i, j)])
}

/// validate_spd_input — shape, finiteness and symmetry checks for `P`.
///
/// Errors
/// ------
/// - `NumericsError::NotSquare` when `P` is not `n×n`.
/// - `NumericsError::NonFiniteMatrix` for the first NaN/±inf entry.
/// - `NumericsError::NotSymmetric` when `|P[i,j] - P[j,i]|` exceeds
///   `SYMMETRY_TOL · max(1, |P[i,j]|, |P[j,i]|)`.
fn validate_spd_input(p: &Array2<f64>) -> NumericsResult<()> {
    let (rows, cols) = p.dim();
    if rows != cols {
        return Err(NumericsError::NotSquare { shape: (rows, cols) });
    }
    for ((row, col), &value) in p.indexed_iter() {
        if !value.is_finite() {
            return Err(NumericsError::NonFiniteMatrix { row, col, value });
        }
    }
    for i in 0..rows {
        for j in (i + 1)..cols {
            let (a, b) = (p[[i, j]], p[[j, i]]);
            let gap = (a - b).abs();
            if gap > SYMMETRY_TOL * a.abs().max(b.abs()).max(1.0) {
                return Err(NumericsError::NotSymmetric { row: i, col: j, gap });
            }
        }
    }
    Ok(())
}

/// Factor `P = L Lᵀ`, mapping a failed factorization to an error.
fn factor(p: &Array2<f64>) -> NumericsResult<Cholesky<f64, Dyn>> {
    validate_spd_input(p)?;
    Cholesky::new(to_dmatrix(p)).ok_or(NumericsError::NotPositiveDefinite { dim: p.nrows() })
}

/// cholesky_lower — lower-triangular Cholesky factor of a PD matrix.
///
/// Returns
/// -------
/// `NumericsResult<Array2<f64>>`
///   `L` with `L Lᵀ = P` and zeros above the diagonal.
///
/// Errors
/// ------
/// - Any error from the input validation, or
///   `NumericsError::NotPositiveDefinite` if the factorization fails.
pub fn cholesky_lower(p: &Array2<f64>) -> NumericsResult<Array2<f64>> {
    let chol = factor(p)?;
    Ok(from_dmatrix(&chol.l()))
}

/// solve — compute `P⁻¹ Q` for symmetric positive-definite `P`.
///
/// Parameters
/// ----------
/// - `p`: `&Array2<f64>`
///   Symmetric positive-definite `n×n` matrix.
/// - `q`: `&Array2<f64>`
///   Right-hand side with `n` rows.
///
/// Returns
/// -------
/// `NumericsResult<Array2<f64>>`
///   The `n×k` solution `X` with `P X = Q`.
///
/// Errors
/// ------
/// - `NumericsError::DimensionMismatch` when `q.nrows() != n`.
/// - `NumericsError::NonFiniteMatrix` when `q` holds NaN/±inf entries.
/// - Any error from validating or factoring `p`.
///
/// Examples
/// --------
/// ```rust
/// # use ndarray::array;
/// # use rust_sde_gp::numerics::linalg::solve;
/// let p = array![[4.0, 1.0], [1.0, 3.0]];
/// let q = array![[1.0], [2.0]];
/// let x = solve(&p, &q).unwrap();
/// let back = p.dot(&x);
/// assert!((back[[0, 0]] - 1.0).abs() < 1e-12);
/// assert!((back[[1, 0]] - 2.0).abs() < 1e-12);
/// ```
pub fn solve(p: &Array2<f64>, q: &Array2<f64>) -> NumericsResult<Array2<f64>> {
    let n = p.nrows();
    if q.nrows() != n {
        return Err(NumericsError::DimensionMismatch { expected: n, actual: q.nrows() });
    }
    for ((row, col), &value) in q.indexed_iter() {
        if !value.is_finite() {
            return Err(NumericsError::NonFiniteMatrix { row, col, value });
        }
    }
    let chol = factor(p)?;
    Ok(from_dmatrix(&chol.solve(&to_dmatrix(q))))
}

/// Vector right-hand-side form of [`solve`].
pub fn solve_vec(p: &Array2<f64>, q: &Array1<f64>) -> NumericsResult<Array1<f64>> {
    let n = q.len();
    let column = q.clone().into_shape((n, 1)).map_err(|_| NumericsError::DimensionMismatch {
        expected: p.nrows(),
        actual: n,
    })?;
    let x = solve(p, &column)?;
    Ok(x.column(0).to_owned())
}

/// inv — inverse of a symmetric positive-definite matrix via Cholesky.
///
/// Errors
/// ------
/// - Any error from validating or factoring `p`.
pub fn inv(p: &Array2<f64>) -> NumericsResult<Array2<f64>> {
    let chol = factor(p)?;
    Ok(from_dmatrix(&chol.inverse()))
}
