use serde::Serialize;

use crate::individual::{Individual, is_exist, is_in_flatzone, sift_toward_front, sort_by_cost};
use crate::sub_regions::SubRegionModel;

/// Acceptance rules for `update_ref_set`
#[derive(Debug, Clone, Copy)]
pub struct UpdatePolicy {
	pub dist_epsilon: f64,
	pub fitness_epsilon: f64,
	pub flatzone_detection: bool,
	/// Replace an equal member when the candidate beats its cost; otherwise
	/// duplicates are only counted
	pub replace_improved_duplicates: bool,
}

/// What happened to the candidates of one update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UpdateOutcome {
	/// Candidates better than the worst member when they were considered
	pub examined: usize,
	pub replaced: usize,
	pub duplicates: usize,
	pub flatzone: usize,
}

impl UpdateOutcome {
	/// Share of examined candidates rejected as duplicates
	pub fn duplicate_ratio(&self) -> f64 {
		if self.examined == 0 { 0.0 } else { self.duplicates as f64 / self.examined as f64 }
	}

	/// No candidate beat the worst member, or there was no candidate at all
	pub fn stalled(&self) -> bool {
		self.examined == 0
	}
}

/// Merge evaluated candidates into the sorted reference set.
///
/// Candidates are sorted and consumed best first while they beat the current
/// worst member. A candidate equal to any member is a duplicate. A candidate
/// whose cost sits in the flat zone of a member is skipped when flat-zone
/// detection is on. Any other candidate overwrites the worst member and is
/// moved to its sorted position. Accepted candidates are recorded in the
/// sub-region memory. The set keeps its size throughout.
pub fn update_ref_set(
	ref_set: &mut [Individual],
	candidates: &mut [Individual],
	policy: &UpdatePolicy,
	model: &mut SubRegionModel,
) -> UpdateOutcome {
	let mut outcome = UpdateOutcome::default();
	let b = ref_set.len();
	if b == 0 {
		return outcome;
	}
	sort_by_cost(candidates);

	for cand in candidates.iter() {
		if !(cand.cost < ref_set[b - 1].cost) {
			break;
		}
		outcome.examined += 1;

		if let Some(idx) = is_exist(ref_set, cand, policy.dist_epsilon) {
			let margin = ref_set[idx].cost.abs() * policy.fitness_epsilon;
			if policy.replace_improved_duplicates && cand.cost < ref_set[idx].cost - margin {
				ref_set[idx] = cand.clone();
				sift_toward_front(ref_set, idx);
				model.record_individual(&cand.params);
				outcome.replaced += 1;
			} else {
				outcome.duplicates += 1;
			}
			continue;
		}

		if policy.flatzone_detection && is_in_flatzone(ref_set, cand.cost, policy.fitness_epsilon) {
			outcome.flatzone += 1;
			continue;
		}

		ref_set[b - 1] = cand.clone();
		sift_toward_front(ref_set, b - 1);
		model.record_individual(&cand.params);
		outcome.replaced += 1;
	}
	outcome
}
