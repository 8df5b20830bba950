use std::fs::File;
use std::path::{Path, PathBuf};

use crate::error::SSError;
use crate::individual::Individual;
use crate::sub_regions::SubRegionModel;
use crate::tsv::writer;

pub const REF_SET_HISTORY: &str = "ref_set_history.tsv";
pub const BEST_SOLS_HISTORY: &str = "best_sols_history.tsv";
pub const FREQS_MATRIX_HISTORY: &str = "freqs_matrix_history.tsv";

/// Per-iteration trace files.
///
/// * `ref_set_history.tsv`: `iter, member, params.., cost` for every member
/// * `best_sols_history.tsv`: `iter, params.., cost` of the best member
/// * `freqs_matrix_history.tsv`: `iter, dim, freqs..` for every dimension
pub struct HistoryWriter {
	dir: PathBuf,
	ref_set: csv::Writer<File>,
	best: csv::Writer<File>,
	freqs: csv::Writer<File>,
}

impl HistoryWriter {
	/// Create (truncate) the three history files in `dir`
	pub fn create(dir: &Path) -> Result<Self, SSError> {
		std::fs::create_dir_all(dir).map_err(|e| SSError::io(dir, e))?;
		Ok(Self {
			dir: dir.to_path_buf(),
			ref_set: writer(&dir.join(REF_SET_HISTORY))?,
			best: writer(&dir.join(BEST_SOLS_HISTORY))?,
			freqs: writer(&dir.join(FREQS_MATRIX_HISTORY))?,
		})
	}

	pub fn dir(&self) -> &Path {
		&self.dir
	}

	/// Append the state after iteration `iter` and flush
	pub fn record(
		&mut self,
		iter: usize,
		ref_set: &[Individual],
		model: &SubRegionModel,
	) -> Result<(), SSError> {
		let it = iter.to_string();
		for (k, m) in ref_set.iter().enumerate() {
			let mut row = vec![it.clone(), k.to_string()];
			row.extend(m.params.iter().map(|v| v.to_string()));
			row.push(m.cost.to_string());
			self.ref_set.write_record(&row)?;
		}
		if let Some(best) = ref_set.first() {
			let mut row = vec![it.clone()];
			row.extend(best.params.iter().map(|v| v.to_string()));
			row.push(best.cost.to_string());
			self.best.write_record(&row)?;
		}
		for (dim, freqs) in model.frequencies().rows().into_iter().enumerate() {
			let mut row = vec![it.clone(), dim.to_string()];
			row.extend(freqs.iter().map(|f| f.to_string()));
			self.freqs.write_record(&row)?;
		}
		self.flush()
	}

	fn flush(&mut self) -> Result<(), SSError> {
		for (w, name) in [
			(&mut self.ref_set, REF_SET_HISTORY),
			(&mut self.best, BEST_SOLS_HISTORY),
			(&mut self.freqs, FREQS_MATRIX_HISTORY),
		] {
			w.flush().map_err(|e| SSError::io(self.dir.join(name), e))?;
		}
		Ok(())
	}
}
