//! Scatter Search (SS) global optimizer in pure Rust using ndarray
//!
//! The optimizer treats the objective as an opaque `f(x) -> cost` over a box
//! `[lower, upper]` and minimizes it. It is used to fit gene-circuit
//! parameters against a scoring function, but any bounded objective works.
//!
//! Supported features:
//! - Diversified scatter set driven by a sub-region frequency memory
//! - Reference set of elite plus max-min diverse members
//! - Pairwise linear recombination with elite-dependent candidate counts
//! - Duplicate and flat-zone rejection on reference set update
//! - Optional local refinement: bounded hill climbing or Nelder-Mead (NLopt)
//! - Reference set regeneration on stagnation or on a fixed schedule
//! - History files, final-state export and warm start
//! - Per-iteration callback that may stop the run
//!
//! Objective failures never abort a run: a NaN, infinite or too large value
//! is replaced by the configured forbidden cost.

#![allow(missing_docs)]
use std::fmt;
use std::path::{Path, PathBuf};

use ndarray::Array1;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

pub mod error;
pub mod individual;
pub mod sub_regions;

pub mod init_ref_set;
pub mod init_scatter_set;

pub mod recombine;
pub mod select_subsets;

pub mod local_search;
#[cfg(feature = "nlopt")]
pub mod optim_nlopt;

pub mod regenerate_ref_set;
pub mod update_ref_set;

pub mod history;
mod tsv;
pub mod warm_start;

pub mod recorder;
pub mod run_recorded;
pub mod scatter_search;

#[cfg(test)]
mod tests;

pub use error::SSError;
pub use individual::{Individual, euclidean_distance, is_equal};
pub use local_search::LocalSearch;
pub use recorder::{OptimizationRecord, OptimizationRecorder};
pub use run_recorded::run_recorded_scatter_search;
pub use scatter_search::scatter_search;
pub use sub_regions::SubRegionModel;
pub use update_ref_set::UpdateOutcome;

use history::HistoryWriter;
use individual::sort_by_cost;
use init_ref_set::init_ref_set;
use init_scatter_set::init_scatter_set;
use local_search::{RefineContext, RefineFilters, refine_set};
use recombine::generate_candidates;
use regenerate_ref_set::regenerate_ref_set;
use select_subsets::select_subsets;
use update_ref_set::{UpdatePolicy, update_ref_set};

/// Default reference set size: `ceil(1 + sqrt(1 + 40 n) / 2)`, rounded up to
/// an even number and never below 20
pub fn default_ref_set_size(n: usize) -> usize {
	let mut b = (1.0 + (1.0 + 40.0 * n as f64).sqrt() / 2.0).ceil() as usize;
	if b % 2 != 0 {
		b += 1;
	}
	b.max(20)
}

/// Default scatter set size: `max(10 n, 40)`
pub fn default_scatter_set_size(n: usize) -> usize {
	(10 * n).max(40)
}

/// Check a search box: same length, finite, `lower <= upper`
pub fn validate_bounds(lower: &Array1<f64>, upper: &Array1<f64>) -> Result<(), SSError> {
	if lower.len() != upper.len() {
		return Err(SSError::config(format!(
			"lower/upper size mismatch ({} vs {})",
			lower.len(),
			upper.len()
		)));
	}
	if lower.is_empty() {
		return Err(SSError::config("problem has no parameters"));
	}
	for i in 0..lower.len() {
		if !lower[i].is_finite() || !upper[i].is_finite() {
			return Err(SSError::config(format!("bound[{}] is not finite", i)));
		}
		if upper[i] < lower[i] {
			return Err(SSError::config(format!(
				"bound[{}] has upper < lower ({} < {})",
				i, upper[i], lower[i]
			)));
		}
		if upper[i] == lower[i] {
			log::warn!("bound[{}] is degenerate: parameter fixed at {}", i, lower[i]);
		}
	}
	Ok(())
}

/// Information passed to callback after each iteration
#[derive(Debug, Clone)]
pub struct SSIntermediate {
	pub x: Array1<f64>,
	pub fun: f64,
	pub spread: f64, // worst - best cost in the reference set
	pub iter: usize,
}

/// Action returned by callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackAction {
	Continue,
	Stop,
}

pub type SSCallback = Box<dyn FnMut(&SSIntermediate) -> CallbackAction>;

/// Configuration for the Scatter Search optimizer
///
/// Every field has a default, so a JSON file only needs the fields it changes.
#[derive(Serialize, Deserialize)]
#[serde(default)]
pub struct SSConfig {
	pub max_iter: usize,
	/// Reference set size `b`; derived from the dimension when `None`
	pub ref_set_size: Option<usize>,
	/// Scatter set size `m`; derived from the dimension when `None`
	pub scatter_set_size: Option<usize>,
	/// Sub-regions per dimension
	pub p: usize,
	pub seed: Option<u64>,
	/// Two points closer than this are the same point
	pub dist_epsilon: f64,
	/// Relative cost tolerance for flat zones and improved duplicates
	pub fitness_epsilon: f64,
	/// Cost stored for NaN, infinite or too large objective values
	pub forbidden_cost: f64,
	pub perform_flatzone_detection: bool,
	pub replace_improved_duplicates: bool,

	pub perform_local_search: bool,
	pub local_search: LocalSearch,
	/// Refine every `local_search_freq` iterations
	pub local_search_freq: usize,
	pub step_size: f64,
	/// Evaluation budget per refined member
	pub max_no_improve: usize,
	pub local_search_1_filter: bool,
	pub local_search_f1_criteria: f64,
	/// Guess of the optimal cost used by filter 1
	pub sol: f64,
	pub local_search_2_filter: bool,
	pub local_search_f2_criteria: f64,

	pub perform_ref_set_regen: bool,
	/// Also regenerate every `ref_set_regen_freq` iterations (0 disables)
	pub ref_set_regen_freq: usize,
	pub regen_duplicate_ratio: f64,
	/// Pool drawn per regenerated slot; the scatter set size when `None`
	pub regen_pool_size: Option<usize>,

	pub perform_stop_criteria: bool,
	/// Stop once `worst - best` in the reference set falls below this
	pub stop_criteria: f64,

	pub perform_warm_start: bool,
	pub warm_start_dir: Option<PathBuf>,
	pub history_dir: Option<PathBuf>,
	pub export_dir: Option<PathBuf>,

	/// Log every iteration at info level instead of debug
	pub disp: bool,
	/// Optional per-iteration callback (may stop early)
	#[serde(skip)]
	pub callback: Option<SSCallback>,
}

impl Default for SSConfig {
	fn default() -> Self {
		Self {
			max_iter: 100,
			ref_set_size: None,
			scatter_set_size: None,
			p: 8,
			seed: None,
			dist_epsilon: 1e-4,
			fitness_epsilon: 1e-5,
			forbidden_cost: 1e38,
			perform_flatzone_detection: false,
			replace_improved_duplicates: false,
			perform_local_search: false,
			local_search: LocalSearch::default(),
			local_search_freq: 5,
			step_size: 0.01,
			max_no_improve: 100,
			local_search_1_filter: false,
			local_search_f1_criteria: 5.0,
			sol: 0.0,
			local_search_2_filter: false,
			local_search_f2_criteria: 1e-3,
			perform_ref_set_regen: true,
			ref_set_regen_freq: 0,
			regen_duplicate_ratio: 0.7,
			regen_pool_size: None,
			perform_stop_criteria: false,
			stop_criteria: 1e-8,
			perform_warm_start: false,
			warm_start_dir: None,
			history_dir: None,
			export_dir: None,
			disp: false,
			callback: None,
		}
	}
}

impl SSConfig {
	/// Read a JSON configuration; missing fields keep their defaults
	pub fn load_json(path: &Path) -> Result<Self, SSError> {
		let text = std::fs::read_to_string(path).map_err(|e| SSError::io(path, e))?;
		Ok(serde_json::from_str(&text)?)
	}

	pub fn save_json(&self, path: &Path) -> Result<(), SSError> {
		let text = serde_json::to_string_pretty(self)?;
		std::fs::write(path, text).map_err(|e| SSError::io(path, e))
	}

	pub fn ref_set_size_for(&self, n: usize) -> usize {
		self.ref_set_size.unwrap_or_else(|| default_ref_set_size(n))
	}

	pub fn scatter_set_size_for(&self, n: usize) -> usize {
		self.scatter_set_size.unwrap_or_else(|| default_scatter_set_size(n))
	}

	pub fn refine_filters(&self) -> RefineFilters {
		RefineFilters {
			near_solution: self
				.local_search_1_filter
				.then_some((self.sol, self.local_search_f1_criteria)),
			flat_neighbour: self.local_search_2_filter.then_some(self.local_search_f2_criteria),
		}
	}

	/// Check the configuration for a problem of dimension `n`
	pub fn validate(&self, n: usize) -> Result<(), SSError> {
		if n == 0 {
			return Err(SSError::config("problem has no parameters"));
		}
		if self.p == 0 {
			return Err(SSError::config("sub-region count p must be at least 1"));
		}
		let b = self.ref_set_size_for(n);
		let m = self.scatter_set_size_for(n);
		if b < 4 {
			return Err(SSError::config(format!("reference set size {} is below 4", b)));
		}
		if b % 2 != 0 {
			return Err(SSError::config(format!("reference set size {} must be even", b)));
		}
		if m < self.p {
			return Err(SSError::config(format!(
				"scatter set size {} is smaller than the sub-region count {}",
				m, self.p
			)));
		}
		if b > m {
			return Err(SSError::config(format!(
				"reference set size {} exceeds scatter set size {}",
				b, m
			)));
		}
		positive("dist_epsilon", self.dist_epsilon)?;
		positive("fitness_epsilon", self.fitness_epsilon)?;
		positive("forbidden_cost", self.forbidden_cost)?;
		if self.perform_local_search {
			positive("step_size", self.step_size)?;
			if self.local_search_freq == 0 {
				return Err(SSError::config("local_search_freq must be at least 1"));
			}
			if self.local_search_1_filter {
				positive("local_search_f1_criteria", self.local_search_f1_criteria)?;
			}
			if self.local_search_2_filter {
				positive("local_search_f2_criteria", self.local_search_f2_criteria)?;
			}
			if self.max_no_improve == 0 {
				log::warn!("local search enabled with an empty evaluation budget");
			}
		}
		if self.perform_stop_criteria {
			positive("stop_criteria", self.stop_criteria)?;
		}
		if self.perform_ref_set_regen
			&& !(self.regen_duplicate_ratio > 0.0 && self.regen_duplicate_ratio <= 1.0)
		{
			return Err(SSError::config(format!(
				"regen_duplicate_ratio {} must lie in (0, 1]",
				self.regen_duplicate_ratio
			)));
		}
		#[cfg(not(feature = "nlopt"))]
		if self.perform_local_search && self.local_search == LocalSearch::NelderMead {
			return Err(SSError::config("nelder-mead local search needs the nlopt feature"));
		}
		if self.perform_warm_start && self.warm_start_dir.is_none() {
			return Err(SSError::config("warm start requested without warm_start_dir"));
		}
		Ok(())
	}
}

fn positive(name: &str, v: f64) -> Result<(), SSError> {
	if v.is_finite() && v > 0.0 {
		Ok(())
	} else {
		Err(SSError::config(format!("{} must be positive and finite (got {})", name, v)))
	}
}

/// Fluent builder for `SSConfig` for ergonomic configuration.
pub struct SSConfigBuilder {
	cfg: SSConfig,
}

impl Default for SSConfigBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl SSConfigBuilder {
	pub fn new() -> Self {
		Self { cfg: SSConfig::default() }
	}
	pub fn max_iter(mut self, v: usize) -> Self {
		self.cfg.max_iter = v;
		self
	}
	pub fn ref_set_size(mut self, v: usize) -> Self {
		self.cfg.ref_set_size = Some(v);
		self
	}
	pub fn scatter_set_size(mut self, v: usize) -> Self {
		self.cfg.scatter_set_size = Some(v);
		self
	}
	pub fn p(mut self, v: usize) -> Self {
		self.cfg.p = v;
		self
	}
	pub fn seed(mut self, v: u64) -> Self {
		self.cfg.seed = Some(v);
		self
	}
	pub fn dist_epsilon(mut self, v: f64) -> Self {
		self.cfg.dist_epsilon = v;
		self
	}
	pub fn fitness_epsilon(mut self, v: f64) -> Self {
		self.cfg.fitness_epsilon = v;
		self
	}
	pub fn forbidden_cost(mut self, v: f64) -> Self {
		self.cfg.forbidden_cost = v;
		self
	}
	pub fn flatzone_detection(mut self, v: bool) -> Self {
		self.cfg.perform_flatzone_detection = v;
		self
	}
	pub fn replace_improved_duplicates(mut self, v: bool) -> Self {
		self.cfg.replace_improved_duplicates = v;
		self
	}
	/// Enable local search with the given method
	pub fn local_search(mut self, method: LocalSearch) -> Self {
		self.cfg.perform_local_search = true;
		self.cfg.local_search = method;
		self
	}
	pub fn local_search_freq(mut self, v: usize) -> Self {
		self.cfg.local_search_freq = v;
		self
	}
	pub fn step_size(mut self, v: f64) -> Self {
		self.cfg.step_size = v;
		self
	}
	pub fn max_no_improve(mut self, v: usize) -> Self {
		self.cfg.max_no_improve = v;
		self
	}
	/// Refine only members whose cost is within `margin` of `sol`
	pub fn local_search_1_filter(mut self, sol: f64, margin: f64) -> Self {
		self.cfg.local_search_1_filter = true;
		self.cfg.sol = sol;
		self.cfg.local_search_f1_criteria = margin;
		self
	}
	/// Skip members whose cost matches their closest neighbour's within `tol`
	pub fn local_search_2_filter(mut self, tol: f64) -> Self {
		self.cfg.local_search_2_filter = true;
		self.cfg.local_search_f2_criteria = tol;
		self
	}
	pub fn ref_set_regen(mut self, v: bool) -> Self {
		self.cfg.perform_ref_set_regen = v;
		self
	}
	pub fn ref_set_regen_freq(mut self, v: usize) -> Self {
		self.cfg.ref_set_regen_freq = v;
		self
	}
	pub fn regen_duplicate_ratio(mut self, v: f64) -> Self {
		self.cfg.regen_duplicate_ratio = v;
		self
	}
	pub fn regen_pool_size(mut self, v: usize) -> Self {
		self.cfg.regen_pool_size = Some(v);
		self
	}
	/// Enable the spread stop criterion with threshold `v`
	pub fn stop_criteria(mut self, v: f64) -> Self {
		self.cfg.perform_stop_criteria = true;
		self.cfg.stop_criteria = v;
		self
	}
	pub fn warm_start(mut self, dir: impl Into<PathBuf>) -> Self {
		self.cfg.perform_warm_start = true;
		self.cfg.warm_start_dir = Some(dir.into());
		self
	}
	pub fn history_dir(mut self, dir: impl Into<PathBuf>) -> Self {
		self.cfg.history_dir = Some(dir.into());
		self
	}
	pub fn export_dir(mut self, dir: impl Into<PathBuf>) -> Self {
		self.cfg.export_dir = Some(dir.into());
		self
	}
	pub fn disp(mut self, v: bool) -> Self {
		self.cfg.disp = v;
		self
	}
	pub fn callback(mut self, cb: SSCallback) -> Self {
		self.cfg.callback = Some(cb);
		self
	}
	pub fn build(self) -> SSConfig {
		self.cfg
	}
}

/// Run counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SSStats {
	pub n_function_evals: usize,
	/// Reference set substitutions
	pub n_ref_set_update: usize,
	/// Members handed to local search
	pub n_refinement: usize,
	pub n_duplicates: usize,
	pub n_flatzone_detected: usize,
	pub n_regenerations: usize,
	/// Objective values replaced by the forbidden cost
	pub n_forbidden: usize,
}

/// Result/Report of a Scatter Search run
#[derive(Clone, Serialize)]
pub struct SSReport {
	pub x: Array1<f64>,
	pub fun: f64,
	pub success: bool,
	pub message: String,
	pub nit: usize,
	pub nfev: usize,
	pub ref_set: Vec<Individual>,
	pub ref_costs: Array1<f64>,
	pub stats: SSStats,
}

impl fmt::Debug for SSReport {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SSReport")
			.field("x", &format!("len={}", self.x.len()))
			.field("fun", &self.fun)
			.field("success", &self.success)
			.field("message", &self.message)
			.field("nit", &self.nit)
			.field("nfev", &self.nfev)
			.field("ref_set", &format!("len={}", self.ref_set.len()))
			.field("stats", &self.stats)
			.finish()
	}
}

/// Objective wrapper: counts calls and maps failures to the forbidden cost
struct Evaluator<'a, F> {
	func: &'a F,
	forbidden_cost: f64,
	nfev: usize,
	n_forbidden: usize,
}

impl<F> Evaluator<'_, F>
where
	F: Fn(&Array1<f64>) -> f64,
{
	fn evaluate(&mut self, x: &Array1<f64>) -> f64 {
		self.nfev += 1;
		let cost = (self.func)(x);
		if cost.is_finite() && cost < self.forbidden_cost {
			return cost;
		}
		self.n_forbidden += 1;
		if self.n_forbidden == 1 {
			log::warn!("objective returned {} (stored as forbidden cost {:e})", cost, self.forbidden_cost);
		} else {
			log::trace!("objective returned {} at {:?}", cost, x);
		}
		self.forbidden_cost
	}
}

/// Mutable search state, created by `initialize()`
struct SearchState {
	model: SubRegionModel,
	ref_set: Vec<Individual>,
	best: Individual,
	rng: StdRng,
	stats: SSStats,
	iter: usize,
	regen_pending: bool,
	history: Option<HistoryWriter>,
}

impl SearchState {
	fn spread(&self) -> f64 {
		match (self.ref_set.first(), self.ref_set.last()) {
			(Some(best), Some(worst)) => worst.cost - best.cost,
			_ => 0.0,
		}
	}

	/// Schedule a regeneration for the next iteration when the update stagnated
	/// or the fixed schedule says so.
	///
	/// An update is stagnant when too many of its candidates were duplicates,
	/// or when no candidate beat the worst member at all (including the case
	/// where no pair could be formed).
	fn note_outcome(&mut self, config: &SSConfig, outcome: &UpdateOutcome) {
		if !config.perform_ref_set_regen {
			return;
		}
		let stagnant = outcome.stalled() || outcome.duplicate_ratio() > config.regen_duplicate_ratio;
		let scheduled = config.ref_set_regen_freq > 0 && self.iter % config.ref_set_regen_freq == 0;
		if stagnant || scheduled {
			log::debug!(
				"iter {}: regeneration scheduled (duplicate ratio {:.2})",
				self.iter,
				outcome.duplicate_ratio()
			);
			self.regen_pending = true;
		}
	}
}

/// Scatter Search optimizer
pub struct ScatterSearch<'a, F>
where
	F: Fn(&Array1<f64>) -> f64,
{
	evaluator: Evaluator<'a, F>,
	lower: Array1<f64>,
	upper: Array1<f64>,
	config: SSConfig,
	state: Option<SearchState>,
}

impl<'a, F> ScatterSearch<'a, F>
where
	F: Fn(&Array1<f64>) -> f64,
{
	/// Create a new SS optimizer with objective `func` and bounds [lower, upper]
	pub fn new(func: &'a F, lower: Array1<f64>, upper: Array1<f64>) -> Self {
		assert_eq!(lower.len(), upper.len(), "lower/upper size mismatch");
		let config = SSConfig::default();
		Self {
			evaluator: Evaluator { func, forbidden_cost: config.forbidden_cost, nfev: 0, n_forbidden: 0 },
			lower,
			upper,
			config,
			state: None,
		}
	}

	/// Mutable access to configuration
	pub fn config_mut(&mut self) -> &mut SSConfig {
		&mut self.config
	}

	pub fn config(&self) -> &SSConfig {
		&self.config
	}

	/// Reference set, sorted by cost; empty before `initialize()`
	pub fn ref_set(&self) -> &[Individual] {
		self.state.as_ref().map(|s| s.ref_set.as_slice()).unwrap_or(&[])
	}

	/// Best individual found so far
	pub fn best(&self) -> Option<&Individual> {
		self.state.as_ref().map(|s| &s.best)
	}

	pub fn model(&self) -> Option<&SubRegionModel> {
		self.state.as_ref().map(|s| &s.model)
	}

	/// Iterations completed since `initialize()`
	pub fn iteration(&self) -> usize {
		self.state.as_ref().map_or(0, |s| s.iter)
	}

	pub fn stats(&self) -> SSStats {
		let mut stats = self.state.as_ref().map(|s| s.stats).unwrap_or_default();
		stats.n_function_evals = self.evaluator.nfev;
		stats.n_forbidden = self.evaluator.n_forbidden;
		stats
	}

	fn state(&self) -> Result<&SearchState, SSError> {
		self.state.as_ref().ok_or_else(|| SSError::config("search not initialized"))
	}

	/// Validate the setup and build the initial reference set, either from a
	/// fresh scatter set or from a warm-start directory
	pub fn initialize(&mut self) -> Result<(), SSError> {
		let n = self.lower.len();
		validate_bounds(&self.lower, &self.upper)?;
		self.config.validate(n)?;
		self.evaluator.forbidden_cost = self.config.forbidden_cost;

		let b = self.config.ref_set_size_for(n);
		let m = self.config.scatter_set_size_for(n);

		// RNG
		let mut rng: StdRng = match self.config.seed {
			Some(s) => StdRng::seed_from_u64(s),
			None => {
				let mut thread_rng = rand::rng();
				StdRng::from_rng(&mut thread_rng)
			}
		};

		let (model, ref_set) = match (&self.config.warm_start_dir, self.config.perform_warm_start) {
			(Some(dir), true) => {
				let ws = warm_start::load_state(dir, n, self.config.p, b)?;
				let model = SubRegionModel::from_matrices(&self.lower, &self.upper, ws.freqs, ws.probs, dir)?;
				log::info!("SS warm start from {}", dir.display());
				(model, ws.ref_set)
			}
			_ => {
				let mut model = SubRegionModel::new(&self.lower, &self.upper, self.config.p)?;
				let points = init_scatter_set(&mut model, m, &mut rng)?;
				let scatter: Vec<Individual> = points
					.into_iter()
					.map(|x| {
						let cost = self.evaluator.evaluate(&x);
						Individual::new(x, cost)
					})
					.collect();
				(model, init_ref_set(scatter, b)?)
			}
		};

		let best = ref_set
			.first()
			.cloned()
			.ok_or_else(|| SSError::config("empty reference set"))?;

		let history = match &self.config.history_dir {
			Some(dir) => {
				let mut writer = HistoryWriter::create(dir)?;
				writer.record(0, &ref_set, &model)?;
				Some(writer)
			}
			None => None,
		};

		log::info!(
			"SS init: {} dimensions, p={}, scatter set={}, reference set={}, best={:.6e}",
			n,
			self.config.p,
			m,
			b,
			best.cost
		);

		self.state = Some(SearchState {
			model,
			ref_set,
			best,
			rng,
			stats: SSStats::default(),
			iter: 0,
			regen_pending: false,
			history,
		});
		Ok(())
	}

	/// Run one iteration: pending regeneration, recombination, update,
	/// scheduled local search
	pub fn step(&mut self) -> Result<UpdateOutcome, SSError> {
		let Self { evaluator, lower, upper, config, state } = self;
		let (lower, upper, config) = (&*lower, &*upper, &*config);
		let state = state.as_mut().ok_or_else(|| SSError::config("search not initialized"))?;

		state.iter += 1;
		let iter = state.iter;
		let max_elite = state.ref_set.len() / 2;

		if state.regen_pending {
			let pool = config.regen_pool_size.unwrap_or_else(|| config.scatter_set_size_for(lower.len()));
			let mut eval = |x: &Array1<f64>| evaluator.evaluate(x);
			let added = regenerate_ref_set(
				&mut state.ref_set,
				max_elite,
				pool,
				&mut state.model,
				&mut eval,
				lower,
				upper,
				&mut state.rng,
			);
			state.stats.n_regenerations += 1;
			state.regen_pending = false;
			log::info!(
				"iter {}: regenerated {} reference members, best={:.6e}, worst={:.6e}",
				iter,
				added,
				state.ref_set[0].cost,
				state.ref_set[state.ref_set.len() - 1].cost
			);
		}

		let pairs = select_subsets(&state.ref_set, config.dist_epsilon);
		let points = generate_candidates(&state.ref_set, &pairs, max_elite, lower, upper, &mut state.rng);
		let mut candidates: Vec<Individual> = points
			.into_iter()
			.map(|x| {
				let cost = evaluator.evaluate(&x);
				Individual::new(x, cost)
			})
			.collect();

		let policy = UpdatePolicy {
			dist_epsilon: config.dist_epsilon,
			fitness_epsilon: config.fitness_epsilon,
			flatzone_detection: config.perform_flatzone_detection,
			replace_improved_duplicates: config.replace_improved_duplicates,
		};
		let outcome = update_ref_set(&mut state.ref_set, &mut candidates, &policy, &mut state.model);
		state.stats.n_ref_set_update += outcome.replaced;
		state.stats.n_duplicates += outcome.duplicates;
		state.stats.n_flatzone_detected += outcome.flatzone;

		if config.perform_local_search && iter % config.local_search_freq == 0 {
			let filters = config.refine_filters();
			let mut eval = |x: &Array1<f64>| evaluator.evaluate(x);
			let mut ctx = RefineContext {
				eval: &mut eval,
				lower,
				upper,
				method: config.local_search,
				step_size: config.step_size,
				dist_epsilon: config.dist_epsilon,
				budget: config.max_no_improve,
				model: &mut state.model,
				rng: &mut state.rng,
			};
			let refined = refine_set(&mut state.ref_set, &filters, &mut ctx);
			state.stats.n_refinement += refined.refined;
			state.stats.n_duplicates += refined.duplicates;
			sort_by_cost(&mut state.ref_set);
			log::debug!(
				"iter {}: refined {} members, {} improved, {} rejected as duplicates",
				iter,
				refined.refined,
				refined.improved,
				refined.duplicates
			);
		}

		state.best = state.ref_set[0].clone();
		state.note_outcome(config, &outcome);

		if let Some(history) = state.history.as_mut() {
			history.record(iter, &state.ref_set, &state.model)?;
		}

		let line = format!(
			"iter {}: best={:.6e} spread={:.3e} pairs={} candidates={} replaced={} duplicates={} flatzone={}",
			iter,
			state.best.cost,
			state.spread(),
			pairs.len(),
			candidates.len(),
			outcome.replaced,
			outcome.duplicates,
			outcome.flatzone
		);
		if config.disp {
			log::info!("{}", line);
		} else {
			log::debug!("{}", line);
		}

		Ok(outcome)
	}

	/// Write the final-state files (reference set, frequency and probability
	/// matrices) into `dir`
	pub fn export_state(&self, dir: &Path) -> Result<(), SSError> {
		let state = self.state()?;
		warm_start::export_state(dir, &state.ref_set, &state.model)
	}

	/// Run the optimization and return a report
	///
	/// Initializes first when needed, then iterates until the iteration budget
	/// is spent, the callback asks to stop or the stop criterion holds.
	pub fn solve(&mut self) -> Result<SSReport, SSError> {
		if self.state.is_none() {
			self.initialize()?;
		}

		let mut nit = 0;
		let mut success = false;
		let mut message = format!("Maximum iterations reached ({})", self.config.max_iter);

		for _ in 0..self.config.max_iter {
			self.step()?;
			nit += 1;

			let (intermediate, spread) = {
				let state = self.state()?;
				let spread = state.spread();
				(
					SSIntermediate {
						x: state.best.params.clone(),
						fun: state.best.cost,
						spread,
						iter: state.iter,
					},
					spread,
				)
			};

			if let Some(cb) = self.config.callback.as_mut() {
				if cb(&intermediate) == CallbackAction::Stop {
					message = "Optimization stopped by callback".to_string();
					break;
				}
			}

			if self.config.perform_stop_criteria && spread < self.config.stop_criteria {
				success = true;
				message = format!(
					"Reference set converged: spread {:.3e} < {:.3e}",
					spread, self.config.stop_criteria
				);
				break;
			}
		}

		if let Some(dir) = self.config.export_dir.clone() {
			self.export_state(&dir)?;
		}

		let state = self.state()?;
		let report = SSReport {
			x: state.best.params.clone(),
			fun: state.best.cost,
			success,
			message,
			nit,
			nfev: self.evaluator.nfev,
			ref_set: state.ref_set.clone(),
			ref_costs: state.ref_set.iter().map(|m| m.cost).collect(),
			stats: self.stats(),
		};
		let stats = &report.stats;
		log::info!(
			"SS done: {} | best={:.6e} after {} iterations, {} evaluations",
			report.message,
			report.fun,
			report.nit,
			report.nfev
		);
		log::info!(
			"SS stats: updates={} refinements={} duplicates={} flatzone={} regenerations={} forbidden={}",
			stats.n_ref_set_update,
			stats.n_refinement,
			stats.n_duplicates,
			stats.n_flatzone_detected,
			stats.n_regenerations,
			stats.n_forbidden
		);
		Ok(report)
	}
}
