//! Refinement of reference-set members
//!
//! Two local methods are available: a bounded random hill climber and a
//! bounded Nelder-Mead simplex (through NLopt). Filters decide which members
//! are worth the extra evaluations. A refined point that lands on another
//! member is never written back, so refinement cannot collapse the set.

use ndarray::Array1;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::individual::{Individual, closest_member, is_exist_except, rndreal};
#[cfg(feature = "nlopt")]
use crate::optim_nlopt::nelder_mead;
use crate::sub_regions::SubRegionModel;

/// Local search method used by the refinement step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocalSearch {
	/// Uniform steps of at most `step_size` per coordinate, keep improvements
	#[default]
	HillClimb,
	/// Bounded Nelder-Mead simplex with initial edge `step_size`
	NelderMead,
}

impl FromStr for LocalSearch {
	type Err = String;
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let t = s.to_lowercase();
		match t.as_str() {
			"hillclimb" | "hill_climb" | "hill-climb" | "hc" => Ok(LocalSearch::HillClimb),
			"neldermead" | "nelder_mead" | "nelder-mead" | "nm" => Ok(LocalSearch::NelderMead),
			_ => Err(format!("unknown local search: {}", s)),
		}
	}
}

/// Which members `refine_set` is allowed to touch
#[derive(Debug, Clone, Copy, Default)]
pub struct RefineFilters {
	/// `(sol, margin)`: refine only when `|cost - sol| <= margin`
	pub near_solution: Option<(f64, f64)>,
	/// Skip a member whose cost is within this relative tolerance of its closest neighbour's
	pub flat_neighbour: Option<f64>,
}

impl RefineFilters {
	pub fn admits(&self, set: &[Individual], index: usize) -> bool {
		let cost = set[index].cost;
		if let Some((sol, margin)) = self.near_solution {
			if (cost - sol).abs() > margin {
				return false;
			}
		}
		if let Some(tol) = self.flat_neighbour {
			if let Some(nb) = closest_member(set, index) {
				let nb_cost = set[nb].cost;
				if (cost - nb_cost).abs() <= tol * nb_cost.abs() {
					return false;
				}
			}
		}
		true
	}
}

/// Everything a refinement needs besides the set itself
pub struct RefineContext<'r, R: Rng + ?Sized> {
	pub eval: &'r mut dyn FnMut(&Array1<f64>) -> f64,
	pub lower: &'r Array1<f64>,
	pub upper: &'r Array1<f64>,
	pub method: LocalSearch,
	pub step_size: f64,
	/// Refined points closer than this to another member are rejected
	pub dist_epsilon: f64,
	/// Evaluation budget per refined member
	pub budget: usize,
	pub model: &'r mut SubRegionModel,
	pub rng: &'r mut R,
}

/// Bounded random move of at most `step` per coordinate
pub fn take_step<R: Rng + ?Sized>(
	x: &Array1<f64>,
	step: f64,
	lower: &Array1<f64>,
	upper: &Array1<f64>,
	rng: &mut R,
) -> Array1<f64> {
	Array1::from_shape_fn(x.len(), |i| {
		let lo = lower[i].max(x[i] - step);
		let hi = upper[i].min(x[i] + step);
		rndreal(rng, lo, hi)
	})
}

/// What refining one member did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refinement {
	Improved,
	Unchanged,
	/// Every improvement found was equal to another member; the member is kept
	Duplicate,
}

/// Counts from one `refine_set` pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefineOutcome {
	pub refined: usize,
	pub improved: usize,
	pub duplicates: usize,
}

/// Refine `set[index]` in place.
///
/// Every accepted point is recorded in the sub-region memory. A better point
/// equal to another member (within `dist_epsilon`) is not accepted.
pub fn refine_individual<R: Rng + ?Sized>(
	set: &mut [Individual],
	index: usize,
	ctx: &mut RefineContext<'_, R>,
) -> Refinement {
	let start_cost = set[index].cost;
	let mut collided = false;
	match ctx.method {
		LocalSearch::HillClimb => {
			for _ in 0..ctx.budget {
				let trial = take_step(&set[index].params, ctx.step_size, ctx.lower, ctx.upper, ctx.rng);
				let cost = (ctx.eval)(&trial);
				if cost >= set[index].cost {
					continue;
				}
				if is_exist_except(set, index, &trial, ctx.dist_epsilon).is_some() {
					collided = true;
					continue;
				}
				ctx.model.record_individual(&trial);
				set[index] = Individual::new(trial, cost);
			}
		}
		#[cfg(feature = "nlopt")]
		LocalSearch::NelderMead => {
			let (x, cost) = nelder_mead(
				ctx.eval,
				&set[index].params,
				set[index].cost,
				ctx.lower,
				ctx.upper,
				ctx.step_size,
				ctx.budget,
			);
			if cost < set[index].cost {
				if is_exist_except(set, index, &x, ctx.dist_epsilon).is_some() {
					collided = true;
				} else {
					ctx.model.record_individual(&x);
					set[index] = Individual::new(x, cost);
				}
			}
		}
		#[cfg(not(feature = "nlopt"))]
		LocalSearch::NelderMead => {
			log::warn!("built without the nlopt feature: nelder-mead refinement skipped");
		}
	}
	if set[index].cost < start_cost {
		Refinement::Improved
	} else if collided {
		Refinement::Duplicate
	} else {
		Refinement::Unchanged
	}
}

/// Refine every admitted member, walking from the worst to the best.
///
/// The set is left unsorted; callers re-sort afterwards.
pub fn refine_set<R: Rng + ?Sized>(
	set: &mut [Individual],
	filters: &RefineFilters,
	ctx: &mut RefineContext<'_, R>,
) -> RefineOutcome {
	let mut outcome = RefineOutcome::default();
	for index in (0..set.len()).rev() {
		if !filters.admits(set, index) {
			continue;
		}
		outcome.refined += 1;
		match refine_individual(set, index, ctx) {
			Refinement::Improved => outcome.improved += 1,
			Refinement::Duplicate => outcome.duplicates += 1,
			Refinement::Unchanged => {}
		}
	}
	outcome
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::individual::euclidean_distance;
	use ndarray::array;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	fn ind(p: &[f64], c: f64) -> Individual {
		Individual::new(Array1::from(p.to_vec()), c)
	}

	fn sq(x: &Array1<f64>) -> f64 {
		x.iter().map(|v| v * v).sum()
	}

	#[test]
	fn test_from_str() {
		assert_eq!("nelder-mead".parse::<LocalSearch>().unwrap(), LocalSearch::NelderMead);
		assert_eq!("HillClimb".parse::<LocalSearch>().unwrap(), LocalSearch::HillClimb);
		assert!("bfgs".parse::<LocalSearch>().is_err());
	}

	#[test]
	fn test_take_step_bounded() {
		let mut rng = StdRng::seed_from_u64(4);
		let lower = array![0.0, 0.0];
		let upper = array![1.0, 1.0];
		let x = array![0.0, 0.99];
		for _ in 0..100 {
			let y = take_step(&x, 0.1, &lower, &upper, &mut rng);
			assert!(y[0] >= 0.0 && y[0] <= 0.1);
			assert!(y[1] >= 0.89 && y[1] <= 1.0);
		}
	}

	#[test]
	fn test_filters() {
		let set = vec![ind(&[0.0], 1.0), ind(&[0.1], 1.0), ind(&[5.0], 50.0)];
		let near = RefineFilters { near_solution: Some((0.0, 5.0)), flat_neighbour: None };
		assert!(near.admits(&set, 0));
		assert!(!near.admits(&set, 2));
		let flat = RefineFilters { near_solution: None, flat_neighbour: Some(1e-5) };
		assert!(!flat.admits(&set, 0));
		assert!(flat.admits(&set, 2));
	}

	fn context<'r>(
		eval: &'r mut dyn FnMut(&Array1<f64>) -> f64,
		bounds: &'r (Array1<f64>, Array1<f64>),
		model: &'r mut SubRegionModel,
		rng: &'r mut StdRng,
		method: LocalSearch,
		dist_epsilon: f64,
		budget: usize,
	) -> RefineContext<'r, StdRng> {
		RefineContext {
			eval,
			lower: &bounds.0,
			upper: &bounds.1,
			method,
			step_size: 0.2,
			dist_epsilon,
			budget,
			model,
			rng,
		}
	}

	fn run(method: LocalSearch) -> (Vec<Individual>, usize) {
		let mut set = vec![ind(&[0.5, 0.5], 0.5), ind(&[2.0, -2.0], 8.0)];
		let bounds = (array![-3.0, -3.0], array![3.0, 3.0]);
		let mut model = SubRegionModel::new(&bounds.0, &bounds.1, 4).unwrap();
		let mut rng = StdRng::seed_from_u64(8);
		let mut nfev = 0;
		let mut eval = |x: &Array1<f64>| {
			nfev += 1;
			sq(x)
		};
		let mut ctx = context(&mut eval, &bounds, &mut model, &mut rng, method, 1e-4, 60);
		let outcome = refine_set(&mut set, &RefineFilters::default(), &mut ctx);
		assert_eq!(outcome.refined, 2);
		assert_eq!(outcome.improved, 2);
		(set, nfev)
	}

	#[test]
	fn test_hill_climb_improves_within_budget() {
		let (set, nfev) = run(LocalSearch::HillClimb);
		assert_eq!(nfev, 120);
		assert!(set[0].cost < 0.5);
		assert!(set[1].cost < 8.0);
		for m in &set {
			assert!((sq(&m.params) - m.cost).abs() < 1e-12);
		}
	}

	#[cfg(feature = "nlopt")]
	#[test]
	fn test_nelder_mead_improves_within_budget() {
		let (set, nfev) = run(LocalSearch::NelderMead);
		assert!(nfev <= 120);
		assert!(set[0].cost < 0.05);
		assert!(set[1].cost < 1.0);
	}

	#[cfg(feature = "nlopt")]
	#[test]
	fn test_nelder_mead_never_lands_on_another_member() {
		// the best member already sits on the minimum
		let mut set = vec![ind(&[0.0, 0.0], 0.0), ind(&[0.5, 0.5], 0.5), ind(&[-1.0, 1.0], 2.0)];
		let bounds = (array![-3.0, -3.0], array![3.0, 3.0]);
		let mut model = SubRegionModel::new(&bounds.0, &bounds.1, 4).unwrap();
		let mut rng = StdRng::seed_from_u64(3);
		let mut eval = |x: &Array1<f64>| sq(x);
		let mut ctx = context(&mut eval, &bounds, &mut model, &mut rng, LocalSearch::NelderMead, 1e-4, 500);
		let outcome = refine_set(&mut set, &RefineFilters::default(), &mut ctx);

		assert_eq!(outcome.refined, 3);
		assert_eq!(outcome.duplicates, 2);
		assert_eq!(outcome.improved, 0);
		assert_eq!(set[1], ind(&[0.5, 0.5], 0.5));
		assert_eq!(set[2], ind(&[-1.0, 1.0], 2.0));
	}

	#[test]
	fn test_hill_climb_stays_clear_of_other_members() {
		let mut set = vec![ind(&[0.0, 0.0], 0.0), ind(&[1.0, 1.0], 2.0)];
		let bounds = (array![-3.0, -3.0], array![3.0, 3.0]);
		let mut model = SubRegionModel::new(&bounds.0, &bounds.1, 4).unwrap();
		let mut rng = StdRng::seed_from_u64(21);
		let mut eval = |x: &Array1<f64>| sq(x);
		let mut ctx = context(&mut eval, &bounds, &mut model, &mut rng, LocalSearch::HillClimb, 0.3, 500);
		let outcome = refine_set(&mut set, &RefineFilters::default(), &mut ctx);

		assert_eq!(outcome.refined, 2);
		assert!(set[1].cost < 2.0);
		assert!(euclidean_distance(&set[0].params, &set[1].params) >= 0.3);
		assert_eq!(set[0], ind(&[0.0, 0.0], 0.0));
	}
}
