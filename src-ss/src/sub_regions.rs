//! Sub-region frequency memory
//!
//! Every dimension is split into `p` equal-width sub-regions. Each time a
//! value is placed in sub-region `j` of dimension `i` its frequency grows, and
//! the sampling probability of that sub-region becomes proportional to the
//! inverse frequency. Frequently visited areas are therefore sampled less,
//! which pushes new scatter points into unexplored parts of the box.

use ndarray::{Array1, Array2};
use rand::Rng;
use std::path::Path;

use crate::error::SSError;
use crate::individual::rndreal;
use crate::warm_start::{FREQ_MAT_FINAL, PROB_MAT_FINAL};

/// Boundary grid plus visit-frequency and sampling-probability matrices (n x p)
#[derive(Debug, Clone)]
pub struct SubRegionModel {
	lower: Array1<f64>,
	upper: Array1<f64>,
	min_boundary: Array2<f64>,
	max_boundary: Array2<f64>,
	freqs: Array2<u64>,
	probs: Array2<f64>,
}

impl SubRegionModel {
	/// Fresh model: every frequency is 1 and every probability is 1/p
	pub fn new(lower: &Array1<f64>, upper: &Array1<f64>, p: usize) -> Result<Self, SSError> {
		if p == 0 {
			return Err(SSError::config("sub-region count p must be at least 1"));
		}
		if lower.len() != upper.len() {
			return Err(SSError::config(format!(
				"lower/upper size mismatch ({} vs {})",
				lower.len(),
				upper.len()
			)));
		}
		let n = lower.len();
		let (min_boundary, max_boundary) = boundary_grid(lower, upper, p);
		Ok(Self {
			lower: lower.clone(),
			upper: upper.clone(),
			min_boundary,
			max_boundary,
			freqs: Array2::from_elem((n, p), 1u64),
			probs: Array2::from_elem((n, p), 1.0 / p as f64),
		})
	}

	/// Rebuild a model from persisted matrices (warm start).
	///
	/// The grid is recomputed from the bounds; the matrices must be n x p with
	/// positive frequencies and probability rows summing to one. `dir` is the
	/// warm-start directory the matrices were read from; any problem with them
	/// is reported as [`SSError::WarmStart`] against the offending file.
	pub fn from_matrices(
		lower: &Array1<f64>,
		upper: &Array1<f64>,
		freqs: Array2<u64>,
		probs: Array2<f64>,
		dir: &Path,
	) -> Result<Self, SSError> {
		let freq_path = dir.join(FREQ_MAT_FINAL);
		let prob_path = dir.join(PROB_MAT_FINAL);
		let p = freqs.ncols();
		if p == 0 {
			return Err(SSError::warm_start(&freq_path, "frequency matrix has no columns"));
		}
		let mut model = Self::new(lower, upper, p)?;
		if freqs.dim() != model.freqs.dim() {
			return Err(SSError::warm_start(
				&freq_path,
				format!("frequency matrix is {:?}, expected {:?}", freqs.dim(), model.freqs.dim()),
			));
		}
		if probs.dim() != model.probs.dim() {
			return Err(SSError::warm_start(
				&prob_path,
				format!("probability matrix is {:?}, expected {:?}", probs.dim(), model.probs.dim()),
			));
		}
		if freqs.iter().any(|&f| f == 0) {
			return Err(SSError::warm_start(&freq_path, "frequency matrix contains a zero entry"));
		}
		for (i, row) in probs.rows().into_iter().enumerate() {
			let sum: f64 = row.sum();
			if !sum.is_finite() || (sum - 1.0).abs() > 1e-6 || row.iter().any(|&v| v < 0.0) {
				return Err(SSError::warm_start(
					&prob_path,
					format!("probability row {} does not sum to one (sum = {})", i, sum),
				));
			}
		}
		model.freqs = freqs;
		model.probs = probs;
		Ok(model)
	}

	pub fn n_dims(&self) -> usize {
		self.freqs.nrows()
	}

	pub fn n_regions(&self) -> usize {
		self.freqs.ncols()
	}

	/// `[min, max]` of sub-region `j` in dimension `dim`
	pub fn bounds(&self, dim: usize, j: usize) -> (f64, f64) {
		(self.min_boundary[[dim, j]], self.max_boundary[[dim, j]])
	}

	pub fn frequencies(&self) -> &Array2<u64> {
		&self.freqs
	}

	pub fn probabilities(&self) -> &Array2<f64> {
		&self.probs
	}

	/// Draw a sub-region index for `dim` by scanning the cumulative probabilities
	pub fn sample_sub_region<R: Rng + ?Sized>(&self, dim: usize, rng: &mut R) -> usize {
		let draw = rng.random::<f64>();
		let mut cumulative = 0.0;
		for (j, &prob) in self.probs.row(dim).iter().enumerate() {
			cumulative += prob;
			if draw < cumulative {
				return j;
			}
		}
		// rounding left the scan short of the draw
		self.n_regions() - 1
	}

	/// Uniform value inside sub-region `j` of `dim`
	pub fn sample_in_region<R: Rng + ?Sized>(&self, dim: usize, j: usize, rng: &mut R) -> f64 {
		let (lo, hi) = self.bounds(dim, j);
		rndreal(rng, lo, hi)
	}

	/// Draw a full point without touching the frequency memory
	pub fn diversified_point<R: Rng + ?Sized>(&self, rng: &mut R) -> Array1<f64> {
		Array1::from_shape_fn(self.n_dims(), |i| {
			let j = self.sample_sub_region(i, rng);
			self.sample_in_region(i, j, rng)
		})
	}

	/// Count a visit to sub-region `j` of `dim` and refresh that row's probabilities
	pub fn record_hit(&mut self, dim: usize, j: usize) {
		self.freqs[[dim, j]] += 1;
		let inv_sum: f64 = self.freqs.row(dim).iter().map(|&f| 1.0 / f as f64).sum();
		for t in 0..self.n_regions() {
			self.probs[[dim, t]] = (1.0 / self.freqs[[dim, t]] as f64) / inv_sum;
		}
	}

	/// Sub-region containing `x` in `dim`; the upper bound belongs to the last one
	pub fn region_of(&self, dim: usize, x: f64) -> usize {
		let p = self.n_regions();
		let width = (self.upper[dim] - self.lower[dim]) / p as f64;
		if !(width > 0.0) {
			return 0;
		}
		let idx = ((x - self.lower[dim]) / width).floor();
		if idx <= 0.0 { 0 } else { (idx as usize).min(p - 1) }
	}

	/// Record the membership of every coordinate of `x`
	pub fn record_individual(&mut self, x: &Array1<f64>) {
		for (dim, &v) in x.iter().enumerate() {
			let j = self.region_of(dim, v);
			self.record_hit(dim, j);
		}
	}
}

/// Sub-region `j` of dimension `i` spans
/// `[lower + width * j, lower + width * (j + 1)]` with `width = (upper - lower) / p`.
fn boundary_grid(lower: &Array1<f64>, upper: &Array1<f64>, p: usize) -> (Array2<f64>, Array2<f64>) {
	let n = lower.len();
	let width = |i: usize| (upper[i] - lower[i]) / p as f64;
	let min_boundary = Array2::from_shape_fn((n, p), |(i, j)| lower[i] + width(i) * j as f64);
	let max_boundary = Array2::from_shape_fn((n, p), |(i, j)| {
		if j + 1 == p { upper[i] } else { lower[i] + width(i) * (j + 1) as f64 }
	});
	(min_boundary, max_boundary)
}
