use crate::{SSConfig, SSError, SSReport, ScatterSearch};
use ndarray::Array1;

/// Convenience function for a bounded minimization:
/// - `func`: objective function mapping x -> f(x)
/// - `bounds`: vector of (lower, upper) pairs
/// - `config`: SS configuration
pub fn scatter_search<F>(func: &F, bounds: &[(f64, f64)], config: SSConfig) -> Result<SSReport, SSError>
where
	F: Fn(&Array1<f64>) -> f64,
{
	let n = bounds.len();
	let mut lower = Array1::<f64>::zeros(n);
	let mut upper = Array1::<f64>::zeros(n);
	for (i, (lo, hi)) in bounds.iter().enumerate() {
		lower[i] = *lo;
		upper[i] = *hi;
	}
	let mut ss = ScatterSearch::new(func, lower, upper);
	*ss.config_mut() = config;
	ss.solve()
}
