//! Nelder-Mead refinement through NLopt
//!
//! The objective, the evaluation counter and the best point seen are carried
//! in an explicit user-data struct handed to NLopt, so the engine state the
//! callback touches is owned by this call and nothing else.

use ndarray::Array1;
use nlopt::{Algorithm, Nlopt, Target};

struct SimplexData<'e> {
	eval: &'e mut dyn FnMut(&Array1<f64>) -> f64,
	nfev: usize,
	best: Option<(Array1<f64>, f64)>,
}

fn simplex_objective(x: &[f64], _grad: Option<&mut [f64]>, data: &mut &mut SimplexData<'_>) -> f64 {
	let params = Array1::from(x.to_vec());
	let cost = (data.eval)(&params);
	data.nfev += 1;
	let improved = match &data.best {
		Some((_, best)) => cost < *best,
		None => true,
	};
	if improved {
		data.best = Some((params, cost));
	}
	cost
}

/// Bounded Nelder-Mead from `(x0, f0)` with at most `max_evals` objective calls.
///
/// `step` is the initial simplex edge. Returns the best point seen and its
/// cost, or `(x0, f0)` when nothing beat the start.
pub fn nelder_mead(
	eval: &mut dyn FnMut(&Array1<f64>) -> f64,
	x0: &Array1<f64>,
	f0: f64,
	lower: &Array1<f64>,
	upper: &Array1<f64>,
	step: f64,
	max_evals: usize,
) -> (Array1<f64>, f64) {
	// NLopt reads a zero budget as "no limit"
	if max_evals == 0 {
		return (x0.clone(), f0);
	}
	let mut data = SimplexData { eval, nfev: 0, best: None };
	{
		let mut opt = Nlopt::new(Algorithm::Neldermead, x0.len(), simplex_objective, Target::Minimize, &mut data);
		let _ = opt.set_lower_bounds(&lower.to_vec());
		let _ = opt.set_upper_bounds(&upper.to_vec());
		let _ = opt.set_initial_step1(step);
		let _ = opt.set_maxeval(max_evals.min(u32::MAX as usize) as u32);
		let _ = opt.set_ftol_rel(1e-12);
		let _ = opt.set_xtol_rel(1e-10);

		let mut x = x0.to_vec();
		match opt.optimize(&mut x) {
			Ok((status, val)) => log::trace!("nelder-mead: {:?} at {:.6e}", status, val),
			Err((status, val)) => log::debug!("nelder-mead stopped early: {:?} at {:.6e}", status, val),
		}
	}
	log::trace!("nelder-mead used {} of {} evaluations", data.nfev, max_evals);
	match data.best {
		Some((x, cost)) if cost < f0 => (x, cost),
		_ => (x0.clone(), f0),
	}
}
