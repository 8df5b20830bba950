use crate::error::SSError;
use crate::individual::{Individual, euclidean_distance, sort_by_cost};

/// Build the reference set from an evaluated scatter set.
///
/// The best `size / 2` members enter first. Each remaining slot takes the
/// scatter member whose distance to its nearest reference member is largest.
/// The result is sorted ascending by cost.
pub fn init_ref_set(mut scatter: Vec<Individual>, size: usize) -> Result<Vec<Individual>, SSError> {
	if size == 0 || size > scatter.len() {
		return Err(SSError::config(format!(
			"reference set size {} must be in 1..={} (scatter set size)",
			size,
			scatter.len()
		)));
	}

	sort_by_cost(&mut scatter);
	let elite = size / 2;
	let mut pool = scatter.split_off(elite);
	let mut ref_set = scatter;
	ref_set.reserve(size - elite);

	// distance from each pool member to its nearest reference member
	let mut nearest: Vec<f64> = pool
		.iter()
		.map(|c| {
			ref_set
				.iter()
				.map(|m| euclidean_distance(&c.params, &m.params))
				.fold(f64::INFINITY, f64::min)
		})
		.collect();

	while ref_set.len() < size {
		let mut pick = 0;
		for (i, &d) in nearest.iter().enumerate() {
			if d > nearest[pick] {
				pick = i;
			}
		}
		let chosen = pool.remove(pick);
		nearest.remove(pick);
		for (c, d) in pool.iter().zip(nearest.iter_mut()) {
			*d = d.min(euclidean_distance(&c.params, &chosen.params));
		}
		ref_set.push(chosen);
	}

	sort_by_cost(&mut ref_set);
	Ok(ref_set)
}
