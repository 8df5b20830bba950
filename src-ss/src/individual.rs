//! Candidate solutions and the set-level helpers shared by every phase

use ndarray::Array1;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A parameter vector together with its objective cost
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Individual {
	pub params: Array1<f64>,
	pub cost: f64,
}

impl Individual {
	pub fn new(params: Array1<f64>, cost: f64) -> Self {
		Self { params, cost }
	}

	/// Number of parameters
	pub fn dim(&self) -> usize {
		self.params.len()
	}
}

/// Euclidean distance between two parameter vectors
pub fn euclidean_distance(a: &Array1<f64>, b: &Array1<f64>) -> f64 {
	a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum::<f64>().sqrt()
}

/// Two individuals are equal when their parameters lie within `dist_epsilon`
pub fn is_equal(a: &Individual, b: &Individual, dist_epsilon: f64) -> bool {
	euclidean_distance(&a.params, &b.params) < dist_epsilon
}

/// Index of the member of `set` equal to `ind`, if any
pub fn is_exist(set: &[Individual], ind: &Individual, dist_epsilon: f64) -> Option<usize> {
	set.iter().position(|m| is_equal(m, ind, dist_epsilon))
}

/// Index of a member other than `set[skip]` lying within `dist_epsilon` of `x`
pub fn is_exist_except(set: &[Individual], skip: usize, x: &Array1<f64>, dist_epsilon: f64) -> Option<usize> {
	set.iter()
		.enumerate()
		.find(|(i, m)| *i != skip && euclidean_distance(&m.params, x) < dist_epsilon)
		.map(|(i, _)| i)
}

/// Index of the member closest (in parameter space) to `set[index]`
pub fn closest_member(set: &[Individual], index: usize) -> Option<usize> {
	let target = &set.get(index)?.params;
	let mut best: Option<(usize, f64)> = None;
	for (i, m) in set.iter().enumerate() {
		if i == index {
			continue;
		}
		let d = euclidean_distance(target, &m.params);
		if best.is_none_or(|(_, bd)| d < bd) {
			best = Some((i, d));
		}
	}
	best.map(|(i, _)| i)
}

/// True when `cost` falls within a relative `fitness_epsilon` band of any member's cost
pub fn is_in_flatzone(set: &[Individual], cost: f64, fitness_epsilon: f64) -> bool {
	set.iter().any(|m| (cost - m.cost).abs() <= m.cost.abs() * fitness_epsilon)
}

pub(crate) fn cost_order(a: &Individual, b: &Individual) -> Ordering {
	a.cost.total_cmp(&b.cost)
}

/// Sort ascending by cost (stable)
pub fn sort_by_cost(set: &mut [Individual]) {
	set.sort_by(cost_order);
}

/// Move `set[index]` toward the front until the set is sorted again.
///
/// Assumes the rest of the set is already sorted and `set[index]` only improved.
pub fn sift_toward_front(set: &mut [Individual], index: usize) {
	let mut i = index.min(set.len().saturating_sub(1));
	while i > 0 && set[i].cost < set[i - 1].cost {
		set.swap(i, i - 1);
		i -= 1;
	}
}

/// Clamp every coordinate of `x` into `[lower, upper]`
pub fn clamp_to_bounds(x: &mut Array1<f64>, lower: &Array1<f64>, upper: &Array1<f64>) {
	for i in 0..x.len() {
		x[i] = x[i].max(lower[i]).min(upper[i]);
	}
}

/// Uniform real in `[low, high]`; degenerate intervals return `low`
pub(crate) fn rndreal<R: Rng + ?Sized>(rng: &mut R, low: f64, high: f64) -> f64 {
	if high <= low {
		return low;
	}
	low + (high - low) * rng.random::<f64>()
}
