//! quadrature::rule — weighted point sets and their process-wide cache.
//!
//! Purpose
//! -------
//! Define [`SigmaPoints`], the immutable `(sigma_points, weights)` pair that
//! every rule in this crate produces, and [`RuleSpec`], the key that
//! identifies a rule by kind, dimension and order/κ. Rules are pure
//! functions of their key, so [`sigma_points`] memoizes them behind an
//! `Arc` for the lifetime of the process.
//!
//! Invariants & assumptions
//! ------------------------
//! - `points` is `dim × n` (one column per node) and `weights` has length
//!   `n`.
//! - Rules built here target the standard Gaussian measure, so weights sum
//!   to one (up to rounding).
//! - Cached rules are never mutated; callers receive shared `Arc`s.
use crate::quadrature::{
    cubature::{symmetric_cubature_fifth_order, symmetric_cubature_third_order},
    errors::{QuadResult, QuadratureError},
    gauss_hermite::gauss_hermite,
};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use std::{
    collections::HashMap,
    sync::{Arc, OnceLock, RwLock},
};

/// SigmaPoints — evaluation nodes and weights for `E_{z~N(0,I)}[f(z)]`.
///
/// Fields
/// ------
/// - `points`: `Array2<f64>`
///   `dim × n` matrix of nodes, one column per node.
/// - `weights`: `Array1<f64>`
///   Length-`n` weights; `Σ wᵢ f(xᵢ) ≈ E[f(z)]`.
#[derive(Debug, Clone, PartialEq)]
pub struct SigmaPoints {
    points: Array2<f64>,
    weights: Array1<f64>,
}

impl SigmaPoints {
    /// Build a rule from a `dim × n` node matrix and `n` weights.
    ///
    /// # Errors
    /// [`QuadratureError::ShapeMismatch`] when `points.ncols() != weights.len()`.
    pub fn new(points: Array2<f64>, weights: Array1<f64>) -> QuadResult<Self> {
        if points.ncols() != weights.len() {
            return Err(QuadratureError::ShapeMismatch {
                point_cols: points.ncols(),
                weight_len: weights.len(),
            });
        }
        Ok(SigmaPoints { points, weights })
    }

    /// Dimension of the integration domain.
    pub fn dim(&self) -> usize {
        self.points.nrows()
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// `true` when the rule has no nodes.
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// `dim × n` node matrix.
    pub fn points(&self) -> ArrayView2<'_, f64> {
        self.points.view()
    }

    /// Length-`n` weights.
    pub fn weights(&self) -> ArrayView1<'_, f64> {
        self.weights.view()
    }

    /// Nodes of a one-dimensional rule as a vector view (first row).
    pub fn nodes_1d(&self) -> ArrayView1<'_, f64> {
        self.points.row(0)
    }

    /// Approximate `E_{z~N(0,I)}[f(z)]` as `Σ wᵢ f(xᵢ)`.
    pub fn integrate<F>(&self, f: F) -> f64
    where
        F: Fn(ArrayView1<f64>) -> f64,
    {
        self.points.columns().into_iter().zip(self.weights.iter()).map(|(x, w)| w * f(x)).sum()
    }

    /// Map one-dimensional nodes onto `N(mean, var)`: `√var · x + mean`.
    pub fn scaled_nodes_1d(&self, mean: f64, var: f64) -> Array1<f64> {
        let sd = var.sqrt();
        self.nodes_1d().mapv(|x| sd * x + mean)
    }
}

/// RuleSpec — identifies a rule by kind, dimension and order/κ.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RuleSpec {
    /// Tensor-product Gauss–Hermite with `num_points` nodes per axis.
    GaussHermite { dim: usize, num_points: usize },
    /// Symmetric third-order cubature (cross layout) with parameter κ.
    ThirdOrder { dim: usize, kappa: f64 },
    /// Symmetric fifth-order (McNamee–Stenger) cubature.
    FifthOrder { dim: usize },
}

/// Hashable form of [`RuleSpec`]; κ is keyed by its bit pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum RuleKey {
    GaussHermite(usize, usize),
    ThirdOrder(usize, u64),
    FifthOrder(usize),
}

impl RuleSpec {
    fn key(&self) -> RuleKey {
        match *self {
            RuleSpec::GaussHermite { dim, num_points } => RuleKey::GaussHermite(dim, num_points),
            // -0.0 and 0.0 describe the same rule.
            RuleSpec::ThirdOrder { dim, kappa } => RuleKey::ThirdOrder(dim, (kappa + 0.0).to_bits()),
            RuleSpec::FifthOrder { dim } => RuleKey::FifthOrder(dim),
        }
    }

    /// Whether the cache may keep this rule. κ is a continuous parameter, so
    /// only the default κ = 0 is kept, and rules above
    /// [`MAX_CACHED_POINTS`] are rebuilt on every call.
    fn is_cacheable(&self, num_points: usize) -> bool {
        let bounded_key = match *self {
            RuleSpec::ThirdOrder { kappa, .. } => kappa == 0.0,
            RuleSpec::GaussHermite { .. } | RuleSpec::FifthOrder { .. } => true,
        };
        bounded_key && num_points <= MAX_CACHED_POINTS
    }

    /// Construct the rule without consulting the cache.
    pub fn build(&self) -> QuadResult<SigmaPoints> {
        match *self {
            RuleSpec::GaussHermite { dim, num_points } => gauss_hermite(dim, num_points),
            RuleSpec::ThirdOrder { dim, kappa } => symmetric_cubature_third_order(dim, Some(kappa)),
            RuleSpec::FifthOrder { dim } => symmetric_cubature_fifth_order(dim),
        }
    }
}

/// Largest rule, in points, that [`sigma_points`] retains.
pub const MAX_CACHED_POINTS: usize = 4096;

type RuleCache = RwLock<HashMap<RuleKey, Arc<SigmaPoints>>>;

fn cache() -> &'static RuleCache {
    static CACHE: OnceLock<RuleCache> = OnceLock::new();
    CACHE.get_or_init(|| RwLock::new(HashMap::new()))
}

/// sigma_points — memoized rule lookup.
///
/// Purpose
/// -------
/// Return the rule described by `spec`, building it on first use and
/// sharing the same `Arc` afterwards.
///
/// Retention
/// ---------
/// Entries live for the rest of the process. Only rules with a bounded key
/// space are kept: third-order rules with κ = 0 and any rule of at most
/// [`MAX_CACHED_POINTS`] points. Other rules are built fresh on each call.
///
/// Errors
/// ------
/// - Any [`QuadratureError`] raised while building the rule; failures are
///   not cached.
///
/// Notes
/// -----
/// - A poisoned lock is recovered rather than propagated: the map only
///   ever holds fully built rules, so its contents stay valid.
pub fn sigma_points(spec: RuleSpec) -> QuadResult<Arc<SigmaPoints>> {
    let key = spec.key();
    {
        let guard = cache().read().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(rule) = guard.get(&key) {
            return Ok(Arc::clone(rule));
        }
    }
    log::debug!("building quadrature rule {spec:?}");
    let rule = Arc::new(spec.build()?);
    if !spec.is_cacheable(rule.len()) {
        return Ok(rule);
    }
    let mut guard = cache().write().unwrap_or_else(|poisoned| poisoned.into_inner());
    Ok(Arc::clone(guard.entry(key).or_insert(rule)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - `SigmaPoints` shape validation and accessors.
    // - `integrate` and `scaled_nodes_1d` on a hand-built rule.
    // - Memoization through `sigma_points`.
    // -------------------------------------------------------------------------

    #[test]
    fn new_rejects_mismatched_shapes() {
        let err = SigmaPoints::new(Array2::zeros((1, 3)), Array1::zeros(2)).unwrap_err();
        assert_eq!(err, QuadratureError::ShapeMismatch { point_cols: 3, weight_len: 2 });
    }

    #[test]
    // Purpose
    // -------
    // A three-point rule [0, ±√3] with weights [2/3, 1/6, 1/6] integrates
    // z² to 1 and z⁴ to 3.
    fn integrate_and_scale_on_hand_built_rule() {
        // Arrange
        let s3 = 3f64.sqrt();
        let rule =
            SigmaPoints::new(array![[0.0, s3, -s3]], array![2.0 / 3.0, 1.0 / 6.0, 1.0 / 6.0])
                .unwrap();

        // Act
        let m2 = rule.integrate(|x| x[0].powi(2));
        let m4 = rule.integrate(|x| x[0].powi(4));
        let scaled = rule.scaled_nodes_1d(1.0, 4.0);

        // Assert
        assert_eq!(rule.dim(), 1);
        assert_eq!(rule.len(), 3);
        assert!(!rule.is_empty());
        assert_abs_diff_eq!(m2, 1.0, epsilon = 1e-14);
        assert_abs_diff_eq!(m4, 3.0, epsilon = 1e-14);
        assert_abs_diff_eq!(scaled[1], 1.0 + 2.0 * s3, epsilon = 1e-14);
    }

    #[test]
    // Purpose
    // -------
    // Repeated lookups return the same shared rule.
    fn sigma_points_memoizes_rules() {
        // Act
        let a = sigma_points(RuleSpec::GaussHermite { dim: 1, num_points: 11 }).unwrap();
        let b = sigma_points(RuleSpec::GaussHermite { dim: 1, num_points: 11 }).unwrap();
        let c = sigma_points(RuleSpec::ThirdOrder { dim: 2, kappa: 0.0 }).unwrap();
        let d = sigma_points(RuleSpec::ThirdOrder { dim: 2, kappa: -0.0 }).unwrap();

        // Assert
        assert!(Arc::ptr_eq(&a, &b));
        assert!(Arc::ptr_eq(&c, &d));
        assert_eq!(a.len(), 11);
    }

    #[test]
    // Purpose
    // -------
    // Rules keyed by a nonzero κ and rules above the size bound are returned
    // but not retained, so each lookup builds a fresh instance.
    fn sigma_points_skips_unbounded_keys_and_large_rules() {
        // Act
        let k1 = sigma_points(RuleSpec::ThirdOrder { dim: 2, kappa: 0.5 }).unwrap();
        let k2 = sigma_points(RuleSpec::ThirdOrder { dim: 2, kappa: 0.5 }).unwrap();
        let big1 = sigma_points(RuleSpec::GaussHermite { dim: 3, num_points: 20 }).unwrap();
        let big2 = sigma_points(RuleSpec::GaussHermite { dim: 3, num_points: 20 }).unwrap();

        // Assert
        assert!(!Arc::ptr_eq(&k1, &k2));
        assert!(!Arc::ptr_eq(&big1, &big2));
        assert_eq!(big1.len(), 8000);
        assert_eq!(*k1, *k2);
    }

    #[test]
    fn sigma_points_does_not_cache_failures() {
        assert!(sigma_points(RuleSpec::FifthOrder { dim: 0 }).is_err());
        assert!(sigma_points(RuleSpec::FifthOrder { dim: 0 }).is_err());
    }
}
