//! Linear combination of reference-set pairs
//!
//! For a pair with better member `a` and worse member `b` the half step is
//! `d = (a - b) / 2`. Each candidate moves one parent by `r * d`, with `r`
//! drawn uniformly in `[0, 1)` per coordinate:
//!
//! | kind | base | formula |
//! |------|------|---------|
//! | `SharedSubtract` | a | `a - r d` with a single `r` shared by all coordinates |
//! | `Subtract` | a or b | `base - r d` |
//! | `Add` | a | `a + r d` |
//! | `AddOther` | b | `b + r d` |
//!
//! From `a`, subtracting moves toward `b` and adding moves away from it. From
//! `b` it is the other way round.
//!
//! How many candidates a pair yields depends on whether its members are in
//! the elite half of the reference set.

use ndarray::Array1;
use rand::Rng;

use crate::individual::{Individual, clamp_to_bounds};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateKind {
	SharedSubtract,
	Subtract,
	Add,
	AddOther,
}

/// Generate one candidate from `base` and the half step `d`, clamped to bounds
pub fn generate_ind_candidate<R: Rng + ?Sized>(
	base: &Array1<f64>,
	d: &Array1<f64>,
	kind: CandidateKind,
	lower: &Array1<f64>,
	upper: &Array1<f64>,
	rng: &mut R,
) -> Array1<f64> {
	let mut x = base.clone();
	match kind {
		CandidateKind::SharedSubtract => {
			let r = rng.random::<f64>();
			x.scaled_add(-r, d);
		}
		CandidateKind::Subtract => {
			for i in 0..x.len() {
				x[i] -= rng.random::<f64>() * d[i];
			}
		}
		CandidateKind::Add | CandidateKind::AddOther => {
			for i in 0..x.len() {
				x[i] += rng.random::<f64>() * d[i];
			}
		}
	}
	clamp_to_bounds(&mut x, lower, upper);
	x
}

/// Generate the candidates of every selected pair.
///
/// `max_elite` is the size of the elite half; a member is "good" when its cost
/// is below the cost of `ref_set[max_elite]`.
pub fn generate_candidates<R: Rng + ?Sized>(
	ref_set: &[Individual],
	pairs: &[(usize, usize)],
	max_elite: usize,
	lower: &Array1<f64>,
	upper: &Array1<f64>,
	rng: &mut R,
) -> Vec<Array1<f64>> {
	use CandidateKind::*;

	let mut out = Vec::with_capacity(pairs.len() * 4);
	if ref_set.is_empty() {
		return out;
	}
	let median_cost = ref_set[max_elite.min(ref_set.len() - 1)].cost;

	for &(i, j) in pairs {
		let (a, b) = if ref_set[j].cost < ref_set[i].cost {
			(&ref_set[j], &ref_set[i])
		} else {
			(&ref_set[i], &ref_set[j])
		};
		let d = (&a.params - &b.params) * 0.5;
		let a_good = a.cost < median_cost;
		let b_good = b.cost < median_cost;
		let coin = !a_good && rng.random::<bool>();
		let mut push = |base: &Array1<f64>, kind: CandidateKind| {
			out.push(generate_ind_candidate(base, &d, kind, lower, upper, rng));
		};

		if a_good && b_good {
			push(&a.params, Subtract);
			push(&a.params, Add);
			push(&b.params, Subtract);
			push(&b.params, AddOther);
		} else if a_good {
			push(&a.params, SharedSubtract);
			push(&a.params, Add);
			push(&b.params, AddOther);
		} else {
			if coin {
				push(&a.params, Subtract);
			} else {
				push(&b.params, AddOther);
			}
			push(&a.params, Add);
		}
	}
	out
}

#[cfg(test)]
mod tests {
	use super::*;
	use ndarray::array;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	fn ind(p: &[f64], c: f64) -> Individual {
		Individual::new(Array1::from(p.to_vec()), c)
	}

	fn ref_set() -> Vec<Individual> {
		(0..4).map(|i| ind(&[i as f64, -(i as f64)], i as f64)).collect()
	}

	#[test]
	fn test_candidate_counts_per_case() {
		let set = ref_set();
		let lower = array![-10.0, -10.0];
		let upper = array![10.0, 10.0];
		let mut rng = StdRng::seed_from_u64(5);
		// max_elite = 2: members 0 and 1 are good
		assert_eq!(generate_candidates(&set, &[(0, 1)], 2, &lower, &upper, &mut rng).len(), 4);
		assert_eq!(generate_candidates(&set, &[(0, 3)], 2, &lower, &upper, &mut rng).len(), 3);
		assert_eq!(generate_candidates(&set, &[(2, 3)], 2, &lower, &upper, &mut rng).len(), 2);
	}

	#[test]
	fn test_moves_follow_half_step() {
		let a = array![0.0, 0.0];
		let d = array![1.0, -2.0];
		let lower = array![-10.0, -10.0];
		let upper = array![10.0, 10.0];
		let mut rng = StdRng::seed_from_u64(9);
		for _ in 0..50 {
			let x = generate_ind_candidate(&a, &d, CandidateKind::SharedSubtract, &lower, &upper, &mut rng);
			// single r: x = -r d stays on the segment direction
			assert!((x[1] + 2.0 * x[0]).abs() < 1e-12);
			assert!(x[0] <= 0.0 && x[0] >= -1.0);
			let y = generate_ind_candidate(&a, &d, CandidateKind::Add, &lower, &upper, &mut rng);
			assert!(y[0] >= 0.0 && y[0] <= 1.0);
			assert!(y[1] <= 0.0 && y[1] >= -2.0);
		}
	}

	#[test]
	fn test_candidates_clamped() {
		let set = vec![ind(&[0.9], 0.0), ind(&[-0.9], 1.0)];
		let lower = array![-1.0];
		let upper = array![1.0];
		let mut rng = StdRng::seed_from_u64(3);
		for _ in 0..50 {
			for x in generate_candidates(&set, &[(0, 1)], 1, &lower, &upper, &mut rng) {
				assert!(x[0] >= -1.0 && x[0] <= 1.0);
			}
		}
	}
}
