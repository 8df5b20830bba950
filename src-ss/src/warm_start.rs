//! Final-state export and warm start
//!
//! A finished run can persist its reference set together with the sub-region
//! frequency and probability matrices. A later run pointed at the same
//! directory resumes from that state instead of building a new scatter set.

use ndarray::{Array1, Array2};
use std::path::Path;

use crate::error::SSError;
use crate::individual::{Individual, sort_by_cost};
use crate::sub_regions::SubRegionModel;
use crate::tsv::{read_matrix, write_rows};

/// Reference set, one member per row: parameters then cost
pub const REF_SET_FINAL: &str = "ref_set_final.tsv";
/// Frequency matrix, one dimension per row
pub const FREQ_MAT_FINAL: &str = "freq_mat_final.tsv";
/// Probability matrix, one dimension per row
pub const PROB_MAT_FINAL: &str = "prob_mat_final.tsv";

/// State restored from a warm-start directory
#[derive(Debug, Clone)]
pub struct WarmStart {
	pub ref_set: Vec<Individual>,
	pub freqs: Array2<u64>,
	pub probs: Array2<f64>,
}

/// Write the three final-state files into `dir` (created if missing)
pub fn export_state(dir: &Path, ref_set: &[Individual], model: &SubRegionModel) -> Result<(), SSError> {
	std::fs::create_dir_all(dir).map_err(|e| SSError::io(dir, e))?;
	write_rows(
		&dir.join(REF_SET_FINAL),
		ref_set.iter().map(|m| m.params.iter().copied().chain(std::iter::once(m.cost)).collect::<Vec<f64>>()),
	)?;
	write_rows(&dir.join(FREQ_MAT_FINAL), model.frequencies().rows().into_iter().map(|r| r.to_vec()))?;
	write_rows(&dir.join(PROB_MAT_FINAL), model.probabilities().rows().into_iter().map(|r| r.to_vec()))?;
	log::info!("exported final state to {}", dir.display());
	Ok(())
}

/// Read a warm-start directory written by [`export_state`].
///
/// The files must describe exactly `b` members of dimension `n` and `n x p`
/// matrices; any mismatch is reported as [`SSError::WarmStart`].
pub fn load_state(dir: &Path, n: usize, p: usize, b: usize) -> Result<WarmStart, SSError> {
	let ref_path = dir.join(REF_SET_FINAL);
	let rows: Vec<Vec<f64>> = read_matrix(&ref_path, b, n + 1)?;
	let mut ref_set: Vec<Individual> = rows
		.into_iter()
		.map(|mut row| {
			let cost = row.pop().unwrap_or(f64::NAN);
			Individual::new(Array1::from(row), cost)
		})
		.collect();
	if let Some(bad) = ref_set.iter().position(|m| m.cost.is_nan()) {
		return Err(SSError::warm_start(&ref_path, format!("member {} has a NaN cost", bad + 1)));
	}
	sort_by_cost(&mut ref_set);

	let freq_path = dir.join(FREQ_MAT_FINAL);
	let freq_rows: Vec<Vec<u64>> = read_matrix(&freq_path, n, p)?;
	let freqs = to_array2(freq_rows, n, p, &freq_path)?;

	let prob_path = dir.join(PROB_MAT_FINAL);
	let prob_rows: Vec<Vec<f64>> = read_matrix(&prob_path, n, p)?;
	let probs = to_array2(prob_rows, n, p, &prob_path)?;

	Ok(WarmStart { ref_set, freqs, probs })
}

fn to_array2<T: Clone>(rows: Vec<Vec<T>>, n: usize, p: usize, path: &Path) -> Result<Array2<T>, SSError> {
	let flat: Vec<T> = rows.into_iter().flatten().collect();
	Array2::from_shape_vec((n, p), flat).map_err(|e| SSError::warm_start(path, e.to_string()))
}
