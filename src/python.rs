//! PyO3 bindings for the `_rust_sde_gp` extension module.
//!
//! Purpose
//! -------
//! Expose likelihood moment matching, quadrature rules and timeline
//! construction to the Python state-space GP code that runs the filter.
//!
//! Key behaviors
//! -------------
//! - `likelihoods.Likelihood`: a named likelihood (`"gaussian"`, `"probit"`,
//!   `"poisson"`, ...) with scalar and batched moment matching, pointwise
//!   evaluation, hyperparameter access and noise sampling.
//! - `quadrature`: Gauss–Hermite and symmetric cubature rules as
//!   `(points, weights)` NumPy pairs.
//! - `timeline.input_admin`: the merged timeline as a `dict` of NumPy arrays.
//!
//! Conventions
//! -----------
//! - Inputs accept NumPy arrays, pandas objects (via `to_numpy`) or plain
//!   sequences; 1-D inputs become single-column matrices where a matrix is
//!   expected.
//! - Missing values are NaN on the Python side in both directions.
//! - Rust errors surface as `ValueError`; unusable input types as
//!   `TypeError`.
//! - Submodules are registered in `sys.modules` under `rust_sde_gp.*` so
//!   dotted imports work.
use crate::{
    likelihoods::{
        Gaussian, Likelihood, LikelihoodKind, MomentMatch, MomentMatchOptions, moment_match_batch,
        seeded_rng,
    },
    quadrature::{RuleSpec, SigmaPoints, sigma_points, symmetric_cubature_third_order},
    timeline::{Observation, TestInputs, TrainInputs, input_admin as build_timeline},
};
use ndarray::{Array1, Array2, Axis};
use numpy::{IntoPyArray, PyArray1, PyArray2, PyReadonlyArray1, PyReadonlyArray2};
use pyo3::{
    exceptions::{PyTypeError, PyValueError},
    prelude::*,
    types::{PyAny, PyDict},
};

const SEQUENCE_HINT: &str = "expected a numpy.ndarray, pandas object, or sequence of float64";

/// 1-D float input as an owned array.
fn extract_vector(raw: &Bound<'_, PyAny>) -> PyResult<Array1<f64>> {
    if let Ok(arr) = raw.extract::<PyReadonlyArray1<f64>>() {
        return Ok(arr.as_array().to_owned());
    }
    if let Ok(obj) = raw.call_method1("to_numpy", (false,)) {
        if let Ok(arr) = obj.extract::<PyReadonlyArray1<f64>>() {
            return Ok(arr.as_array().to_owned());
        }
    }
    let values: Vec<f64> = raw.extract().map_err(|_| PyTypeError::new_err(SEQUENCE_HINT))?;
    Ok(Array1::from(values))
}

/// 2-D float input; 1-D input becomes a single column.
fn extract_matrix(raw: &Bound<'_, PyAny>) -> PyResult<Array2<f64>> {
    if let Ok(arr) = raw.extract::<PyReadonlyArray2<f64>>() {
        return Ok(arr.as_array().to_owned());
    }
    if let Ok(obj) = raw.call_method1("to_numpy", (false,)) {
        if let Ok(arr) = obj.extract::<PyReadonlyArray2<f64>>() {
            return Ok(arr.as_array().to_owned());
        }
    }
    if let Ok(rows) = raw.extract::<Vec<Vec<f64>>>() {
        let n = rows.len();
        let d = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|row| row.len() != d) {
            return Err(PyValueError::new_err("rows must all have the same length"));
        }
        let flat: Vec<f64> = rows.into_iter().flatten().collect();
        return Array2::from_shape_vec((n, d), flat).map_err(|e| PyValueError::new_err(e.to_string()));
    }
    Ok(extract_vector(raw)?.insert_axis(Axis(1)))
}

fn optional<T>(
    raw: Option<&Bound<'_, PyAny>>, f: impl Fn(&Bound<'_, PyAny>) -> PyResult<T>,
) -> PyResult<Option<T>> {
    match raw {
        Some(obj) if !obj.is_none() => f(obj).map(Some),
        _ => Ok(None),
    }
}

fn rule_to_numpy<'py>(
    py: Python<'py>, rule: &SigmaPoints,
) -> (Bound<'py, PyArray2<f64>>, Bound<'py, PyArray1<f64>>) {
    (rule.points().to_owned().into_pyarray(py), rule.weights().to_owned().into_pyarray(py))
}

fn observations_to_numpy<'py>(py: Python<'py>, obs: &Array2<Observation>) -> Bound<'py, PyArray2<f64>> {
    obs.mapv(|o| o.to_f64()).into_pyarray(py)
}

fn moment_tuple(mm: MomentMatch) -> (f64, Option<f64>, Option<f64>) {
    (mm.log_z, mm.dlog_z(), mm.d2log_z())
}

/// Likelihood — Python-facing wrapper around [`LikelihoodKind`].
///
/// Constructed as `Likelihood(name, variance=None)`. `variance` only applies
/// to the Gaussian likelihood; omitting it uses the default noise level.
#[pyclass(name = "Likelihood", module = "rust_sde_gp.likelihoods")]
pub struct PyLikelihood {
    inner: LikelihoodKind,
}

#[pymethods]
impl PyLikelihood {
    #[new]
    #[pyo3(signature = (name, variance = None), text_signature = "(name, /, variance=None)")]
    pub fn new(name: &str, variance: Option<f64>) -> PyResult<Self> {
        let inner = match (LikelihoodKind::from_name(name)?, variance) {
            (LikelihoodKind::Gaussian(_), Some(v)) => LikelihoodKind::Gaussian(Gaussian::from_variance(v)?),
            (_, Some(_)) => {
                return Err(PyValueError::new_err("variance only applies to the Gaussian likelihood"));
            }
            (kind, None) => kind,
        };
        Ok(PyLikelihood { inner })
    }

    #[getter]
    pub fn name(&self) -> &'static str {
        self.inner.name()
    }

    /// Stored unconstrained hyperparameters.
    #[getter]
    pub fn hyperparameters(&self) -> Vec<f64> {
        self.inner.hyperparameters().unconstrained().to_vec()
    }

    pub fn set_hyperparameters(&mut self, theta: Vec<f64>) -> PyResult<()> {
        Ok(self.inner.set_hyperparameters(Array1::from(theta).view())?)
    }

    /// `(logZ, dlogZ/dm, d2logZ/dm2)`; derivatives are `None` when not
    /// requested. `quadrature=True` bypasses closed forms.
    #[pyo3(signature = (
        y, m, v, hyp = None, ep_fraction = 1.0, num_quad_points = 20,
        derivatives = true, log_space = false, quadrature = false
    ))]
    #[allow(clippy::too_many_arguments)]
    pub fn moment_match(
        &self, y: f64, m: f64, v: f64, hyp: Option<Vec<f64>>, ep_fraction: f64,
        num_quad_points: usize, derivatives: bool, log_space: bool, quadrature: bool,
    ) -> PyResult<(f64, Option<f64>, Option<f64>)> {
        let opts = MomentMatchOptions::new(derivatives, ep_fraction, num_quad_points, log_space)?;
        let hyp = hyp.as_deref();
        let mm = if quadrature {
            self.inner.moment_match_quadrature(y, m, v, hyp, &opts)?
        } else {
            self.inner.moment_match(y, m, v, hyp, &opts)?
        };
        Ok(moment_tuple(mm))
    }

    /// Moment matching over a whole timeline. NaN observations are skipped
    /// and yield NaN in all three outputs.
    #[pyo3(signature = (y, m, v, ep_fraction = 1.0, num_quad_points = 20, log_space = false, parallel = true))]
    #[allow(clippy::too_many_arguments, clippy::type_complexity)]
    pub fn moment_match_batch<'py>(
        &self, py: Python<'py>, y: &Bound<'py, PyAny>, m: &Bound<'py, PyAny>, v: &Bound<'py, PyAny>,
        ep_fraction: f64, num_quad_points: usize, log_space: bool, parallel: bool,
    ) -> PyResult<(Bound<'py, PyArray1<f64>>, Bound<'py, PyArray1<f64>>, Bound<'py, PyArray1<f64>>)> {
        let opts = MomentMatchOptions::new(true, ep_fraction, num_quad_points, log_space)?;
        let y: Vec<Observation> = extract_vector(y)?.iter().map(|&yi| Observation::from(yi)).collect();
        let m = extract_vector(m)?;
        let v = extract_vector(v)?;
        let results = py.allow_threads(|| moment_match_batch(&self.inner, &y, m.view(), v.view(), &opts, parallel))?;

        let column = |f: fn(&MomentMatch) -> Option<f64>| -> Array1<f64> {
            results.iter().map(|r| r.as_ref().and_then(f).unwrap_or(f64::NAN)).collect()
        };
        Ok((
            column(|mm| Some(mm.log_z)).into_pyarray(py),
            column(MomentMatch::dlog_z).into_pyarray(py),
            column(MomentMatch::d2log_z).into_pyarray(py),
        ))
    }

    #[pyo3(signature = (y, f, hyp = None))]
    pub fn evaluate_likelihood<'py>(
        &self, py: Python<'py>, y: f64, f: &Bound<'py, PyAny>, hyp: Option<Vec<f64>>,
    ) -> PyResult<Bound<'py, PyArray1<f64>>> {
        let f = extract_vector(f)?;
        Ok(self.inner.evaluate_likelihood(y, f.view(), hyp.as_deref())?.into_pyarray(py))
    }

    #[pyo3(signature = (y, f, hyp = None))]
    pub fn evaluate_log_likelihood<'py>(
        &self, py: Python<'py>, y: f64, f: &Bound<'py, PyAny>, hyp: Option<Vec<f64>>,
    ) -> PyResult<Bound<'py, PyArray1<f64>>> {
        let f = extract_vector(f)?;
        Ok(self.inner.evaluate_log_likelihood(y, f.view(), hyp.as_deref())?.into_pyarray(py))
    }

    pub fn link_fn<'py>(&self, py: Python<'py>, f: &Bound<'py, PyAny>) -> PyResult<Bound<'py, PyArray1<f64>>> {
        let f = extract_vector(f)?;
        Ok(f.mapv(|fi| self.inner.link_fn(fi)).into_pyarray(py))
    }

    /// Add noise with per-row variance to an `n × s` latent mean; `seed=None`
    /// uses the fixed default seed.
    #[pyo3(signature = (latent_mean, likelihood_var, seed = None))]
    pub fn sample_noise<'py>(
        &self, py: Python<'py>, latent_mean: &Bound<'py, PyAny>, likelihood_var: &Bound<'py, PyAny>,
        seed: Option<u64>,
    ) -> PyResult<Bound<'py, PyArray2<f64>>> {
        let mean = extract_matrix(latent_mean)?;
        let var = extract_vector(likelihood_var)?;
        let mut rng = seeded_rng(seed);
        Ok(self.inner.sample_noise(mean.view(), var.view(), &mut rng)?.into_pyarray(py))
    }
}

/// Gauss–Hermite rule normalized to `N(0, I)`: `(points d × n, weights)`.
#[pyfunction]
#[pyo3(signature = (dim, num_points = 20))]
fn gauss_hermite<'py>(
    py: Python<'py>, dim: usize, num_points: usize,
) -> PyResult<(Bound<'py, PyArray2<f64>>, Bound<'py, PyArray1<f64>>)> {
    let rule = sigma_points(RuleSpec::GaussHermite { dim, num_points })?;
    Ok(rule_to_numpy(py, &rule))
}

/// Third-order symmetric cubature; `kappa=None` gives the spherical rule.
#[pyfunction]
#[pyo3(signature = (dim, kappa = None))]
fn cubature_third_order<'py>(
    py: Python<'py>, dim: usize, kappa: Option<f64>,
) -> PyResult<(Bound<'py, PyArray2<f64>>, Bound<'py, PyArray1<f64>>)> {
    let rule = match kappa {
        Some(kappa) => sigma_points(RuleSpec::ThirdOrder { dim, kappa })?,
        None => std::sync::Arc::new(symmetric_cubature_third_order(dim, None)?),
    };
    Ok(rule_to_numpy(py, &rule))
}

/// Fifth-order symmetric cubature (McNamee–Stenger).
#[pyfunction]
fn cubature_fifth_order<'py>(
    py: Python<'py>, dim: usize,
) -> PyResult<(Bound<'py, PyArray2<f64>>, Bound<'py, PyArray1<f64>>)> {
    let rule = sigma_points(RuleSpec::FifthOrder { dim })?;
    Ok(rule_to_numpy(py, &rule))
}

/// Merged train/test timeline as a `dict` of NumPy arrays.
///
/// Keys: `t_all`, `y_all`, `r_all`, `t_train`, `y_train`, `r_train`,
/// `dt_all`, `dt_train`, `train_id`, `test_id`, `mask`.
#[pyfunction]
#[pyo3(signature = (t, y, r = None, t_test = None, y_test = None, r_test = None))]
fn input_admin<'py>(
    py: Python<'py>, t: &Bound<'py, PyAny>, y: &Bound<'py, PyAny>, r: Option<&Bound<'py, PyAny>>,
    t_test: Option<&Bound<'py, PyAny>>, y_test: Option<&Bound<'py, PyAny>>,
    r_test: Option<&Bound<'py, PyAny>>,
) -> PyResult<Bound<'py, PyDict>> {
    let train = TrainInputs::new(extract_matrix(t)?, extract_matrix(y)?, optional(r, extract_matrix)?)?;
    let test = match optional(t_test, extract_matrix)? {
        Some(t_test) => Some(TestInputs::new(
            t_test,
            optional(y_test, extract_matrix)?,
            optional(r_test, extract_matrix)?,
        )?),
        None => None,
    };
    let tl = build_timeline(&train, test.as_ref())?;

    let out = PyDict::new(py);
    out.set_item("t_all", tl.t_all.into_pyarray(py))?;
    out.set_item("y_all", observations_to_numpy(py, &tl.y_all))?;
    out.set_item("r_all", tl.r_all.into_pyarray(py))?;
    out.set_item("t_train", tl.t_train.into_pyarray(py))?;
    out.set_item("y_train", observations_to_numpy(py, &tl.y_train))?;
    out.set_item("r_train", tl.r_train.into_pyarray(py))?;
    out.set_item("dt_all", tl.dt_all.into_pyarray(py))?;
    out.set_item("dt_train", tl.dt_train.into_pyarray(py))?;
    out.set_item("train_id", tl.train_id.mapv(|i| i as u64).into_pyarray(py))?;
    out.set_item("test_id", tl.test_id.mapv(|i| i as u64).into_pyarray(py))?;
    out.set_item("mask", tl.mask.into_pyarray(py))?;
    Ok(out)
}

/// Entry point of the `_rust_sde_gp` extension.
///
/// Creates the `likelihoods`, `quadrature` and `timeline` submodules and
/// registers them in `sys.modules` under `rust_sde_gp.*`.
#[pymodule]
fn _rust_sde_gp<'py>(py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    let likelihoods_mod = PyModule::new(py, "likelihoods")?;
    likelihoods_mod.add_class::<PyLikelihood>()?;

    let quadrature_mod = PyModule::new(py, "quadrature")?;
    quadrature_mod.add_function(wrap_pyfunction!(gauss_hermite, &quadrature_mod)?)?;
    quadrature_mod.add_function(wrap_pyfunction!(cubature_third_order, &quadrature_mod)?)?;
    quadrature_mod.add_function(wrap_pyfunction!(cubature_fifth_order, &quadrature_mod)?)?;

    let timeline_mod = PyModule::new(py, "timeline")?;
    timeline_mod.add_function(wrap_pyfunction!(input_admin, &timeline_mod)?)?;

    let modules = py.import("sys")?.getattr("modules")?;
    for (name, sub) in [
        ("likelihoods", &likelihoods_mod),
        ("quadrature", &quadrature_mod),
        ("timeline", &timeline_mod),
    ] {
        m.add_submodule(sub)?;
        modules.set_item(format!("rust_sde_gp.{name}"), sub)?;
    }
    Ok(())
}
