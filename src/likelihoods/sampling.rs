//! Observation-noise sampling with an explicit random generator.
//!
//! Sampling only serves posterior visualization, so reproducibility matters
//! more than fresh randomness. The generator is always passed in by the
//! caller; [`seeded_rng`] with `None` reproduces the fixed seed
//! [`DEFAULT_NOISE_SEED`] that earlier versions of this pipeline hard-coded.
use crate::{
    likelihoods::errors::{LikResult, LikelihoodError},
    numerics::linalg::cholesky_lower,
};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use rand::{Rng, SeedableRng, rngs::StdRng};
use rand_distr::{Distribution, StandardNormal};

/// Seed used when the caller does not choose one.
pub const DEFAULT_NOISE_SEED: u64 = 123;

/// `StdRng` seeded with `seed`, or with [`DEFAULT_NOISE_SEED`].
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    StdRng::seed_from_u64(seed.unwrap_or(DEFAULT_NOISE_SEED))
}

/// sample_noise — `latent_mean + √var ⊙ ε` with `ε ~ N(0, I)`.
///
/// Parameters
/// ----------
/// - `latent_mean`: `ArrayView2<f64>`
///   `n × s` array (one row per time step, one column per sample).
/// - `likelihood_var`: `ArrayView1<f64>`
///   Length-`n` noise variances, broadcast along each row.
/// - `rng`: the generator to draw from.
///
/// Errors
/// ------
/// - `LikelihoodError::ShapeMismatch` when `likelihood_var.len() != n`.
/// - `LikelihoodError::InvalidNoiseVariance` for a negative or non-finite
///   variance.
pub fn sample_noise<R>(
    latent_mean: ArrayView2<f64>, likelihood_var: ArrayView1<f64>, rng: &mut R,
) -> LikResult<Array2<f64>>
where
    R: Rng + ?Sized,
{
    let rows = latent_mean.nrows();
    if likelihood_var.len() != rows {
        return Err(LikelihoodError::ShapeMismatch {
            context: "noise variances vs latent mean rows",
            expected: rows,
            actual: likelihood_var.len(),
        });
    }
    for (index, &value) in likelihood_var.iter().enumerate() {
        if !value.is_finite() || value < 0.0 {
            return Err(LikelihoodError::InvalidNoiseVariance { index, value });
        }
    }

    let mut out = latent_mean.to_owned();
    for (mut row, &var) in out.rows_mut().into_iter().zip(likelihood_var.iter()) {
        let sd = var.sqrt();
        for x in row.iter_mut() {
            let eps: f64 = StandardNormal.sample(rng);
            *x += sd * eps;
        }
    }
    Ok(out)
}

/// sample_gaussian_noise — one draw from `N(mean, cov)` via `mean + L ε`.
///
/// Errors
/// ------
/// - `LikelihoodError::ShapeMismatch` when `cov` is not `n × n` for
///   `n = mean.len()`.
/// - `LikelihoodError::Numerics` when `cov` is not symmetric positive
///   definite.
pub fn sample_gaussian_noise<R>(
    mean: ArrayView1<f64>, cov: &Array2<f64>, rng: &mut R,
) -> LikResult<Array1<f64>>
where
    R: Rng + ?Sized,
{
    let n = mean.len();
    if cov.nrows() != n {
        return Err(LikelihoodError::ShapeMismatch {
            context: "covariance rows vs mean length",
            expected: n,
            actual: cov.nrows(),
        });
    }
    let l = cholesky_lower(cov)?;
    let eps = Array1::<f64>::from_shape_fn(n, |_| StandardNormal.sample(rng));
    Ok(&mean + &l.dot(&eps))
}
