//! Reference-set regeneration
//!
//! When the search stagnates, the non-elite half is refilled with fresh points
//! that open new directions around the best member. Directions are taken
//! relative to the best member and scaled by the box span. For every free
//! slot a diversified pool is drawn from the sub-region memory and the pool
//! point least aligned with the directions already present (smallest maximum
//! absolute cosine against the basis matrix) is evaluated and kept.

use ndarray::{Array1, Array2};
use rand::Rng;

use crate::individual::{Individual, sort_by_cost};
use crate::sub_regions::SubRegionModel;

const MIN_NORM: f64 = 1e-12;

/// Unit direction from `origin` to `x` in span-scaled coordinates
fn scaled_direction(x: &Array1<f64>, origin: &Array1<f64>, span: &Array1<f64>) -> Option<Array1<f64>> {
	let v = (x - origin) / span;
	let norm = v.dot(&v).sqrt();
	if norm > MIN_NORM { Some(v / norm) } else { None }
}

fn basis_matrix(directions: &[Array1<f64>], n: usize) -> Array2<f64> {
	let mut basis = Array2::zeros((directions.len(), n));
	for (mut row, d) in basis.rows_mut().into_iter().zip(directions) {
		row.assign(d);
	}
	basis
}

/// Refill `ref_set[max_elite..]` and re-sort. Returns the number of new members.
///
/// Only the chosen point of each pool is evaluated; it is also the only one
/// recorded in the sub-region memory.
#[allow(clippy::too_many_arguments)]
pub fn regenerate_ref_set<R: Rng + ?Sized>(
	ref_set: &mut [Individual],
	max_elite: usize,
	pool_size: usize,
	model: &mut SubRegionModel,
	eval: &mut dyn FnMut(&Array1<f64>) -> f64,
	lower: &Array1<f64>,
	upper: &Array1<f64>,
	rng: &mut R,
) -> usize {
	let b = ref_set.len();
	if b == 0 || max_elite >= b {
		return 0;
	}
	let n = lower.len();
	let span = (upper - lower).mapv(|s| if s > 0.0 { s } else { 1.0 });
	let best = ref_set[0].params.clone();

	let mut directions: Vec<Array1<f64>> = ref_set[1..max_elite.max(1)]
		.iter()
		.filter_map(|m| scaled_direction(&m.params, &best, &span))
		.collect();

	let pool_size = pool_size.max(1);
	for slot in max_elite..b {
		let basis = basis_matrix(&directions, n);
		let mut chosen: Option<(Array1<f64>, f64)> = None;
		for _ in 0..pool_size {
			let x = model.diversified_point(rng);
			let Some(u) = scaled_direction(&x, &best, &span) else {
				continue;
			};
			let alignment = if basis.nrows() == 0 {
				0.0
			} else {
				basis.dot(&u).iter().fold(0.0_f64, |acc, c| acc.max(c.abs()))
			};
			if chosen.as_ref().is_none_or(|(_, a)| alignment < *a) {
				chosen = Some((x, alignment));
			}
		}
		let x = match chosen {
			Some((x, _)) => x,
			None => model.diversified_point(rng),
		};
		if let Some(u) = scaled_direction(&x, &best, &span) {
			directions.push(u);
		}
		let cost = eval(&x);
		model.record_individual(&x);
		ref_set[slot] = Individual::new(x, cost);
	}

	sort_by_cost(ref_set);
	b - max_elite
}
