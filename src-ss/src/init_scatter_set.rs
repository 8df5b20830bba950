use ndarray::Array1;
use rand::Rng;

use crate::error::SSError;
use crate::sub_regions::SubRegionModel;

/// Build the initial scatter set of `size` points.
///
/// The first `p` points take sub-region `k` in every dimension so each
/// sub-region is covered once. The remaining points pick their sub-region per
/// dimension from the current probabilities, and every pick is recorded in the
/// frequency memory before the next draw.
pub fn init_scatter_set<R: Rng + ?Sized>(
	model: &mut SubRegionModel,
	size: usize,
	rng: &mut R,
) -> Result<Vec<Array1<f64>>, SSError> {
	let n = model.n_dims();
	let p = model.n_regions();
	if size < p {
		return Err(SSError::config(format!(
			"scatter set size {} is smaller than the sub-region count {}",
			size, p
		)));
	}

	let mut scatter = Vec::with_capacity(size);
	for k in 0..p {
		scatter.push(Array1::from_shape_fn(n, |i| model.sample_in_region(i, k, rng)));
	}

	for _ in p..size {
		let mut x = Array1::zeros(n);
		for i in 0..n {
			let j = model.sample_sub_region(i, rng);
			model.record_hit(i, j);
			x[i] = model.sample_in_region(i, j, rng);
		}
		scatter.push(x);
	}
	Ok(scatter)
}
