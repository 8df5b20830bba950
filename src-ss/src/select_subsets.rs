use crate::individual::{Individual, is_equal};

/// Ordered index pairs `(i, j)`, `i < j`, of reference members to recombine.
///
/// Pairs whose members are equal are skipped, as is any pair matching an
/// already selected one (both members equal to the earlier pair's members in
/// either order).
pub fn select_subsets(ref_set: &[Individual], dist_epsilon: f64) -> Vec<(usize, usize)> {
	let eq = |a: usize, b: usize| a == b || is_equal(&ref_set[a], &ref_set[b], dist_epsilon);
	let b = ref_set.len();
	let mut pairs: Vec<(usize, usize)> = Vec::with_capacity(b * b.saturating_sub(1) / 2);
	for i in 0..b {
		for j in (i + 1)..b {
			if eq(i, j) {
				continue;
			}
			let seen = pairs
				.iter()
				.any(|&(s, t)| (eq(s, i) && eq(t, j)) || (eq(s, j) && eq(t, i)));
			if !seen {
				pairs.push((i, j));
			}
		}
	}
	pairs
}
