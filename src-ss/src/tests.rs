use super::*;
use ndarray::array;

fn sphere(x: &Array1<f64>) -> f64 {
	x.iter().map(|v| v * v).sum()
}

#[test]
fn test_default_sizes() {
	assert_eq!(default_ref_set_size(1), 20);
	assert_eq!(default_ref_set_size(5), 20);
	// ceil(1 + sqrt(4001) / 2) = 33 -> 34
	assert_eq!(default_ref_set_size(100), 34);
	assert_eq!(default_scatter_set_size(2), 40);
	assert_eq!(default_scatter_set_size(7), 70);
}

#[test]
fn test_config_validation() {
	let ok = SSConfig::default();
	assert!(ok.validate(2).is_ok());
	assert!(ok.validate(0).is_err());

	let cfg = SSConfigBuilder::new().p(50).build();
	assert!(matches!(cfg.validate(2), Err(SSError::Config(_))));

	let cfg = SSConfigBuilder::new().ref_set_size(60).build();
	assert!(matches!(cfg.validate(2), Err(SSError::Config(_))));

	let cfg = SSConfigBuilder::new().ref_set_size(21).build();
	assert!(cfg.validate(2).is_err());

	let cfg = SSConfigBuilder::new().ref_set_size(2).scatter_set_size(40).build();
	assert!(cfg.validate(2).is_err());

	let cfg = SSConfigBuilder::new().dist_epsilon(0.0).build();
	assert!(cfg.validate(2).is_err());

	let cfg = SSConfigBuilder::new().local_search(LocalSearch::HillClimb).local_search_freq(0).build();
	assert!(cfg.validate(2).is_err());

	let mut cfg = SSConfig::default();
	cfg.perform_warm_start = true;
	assert!(cfg.validate(2).is_err());
}

#[test]
fn test_bounds_validation() {
	assert!(validate_bounds(&array![0.0, 0.0], &array![1.0, 1.0]).is_ok());
	assert!(validate_bounds(&array![0.0, 2.0], &array![1.0, 1.0]).is_err());
	assert!(validate_bounds(&array![0.0, f64::NAN], &array![1.0, 1.0]).is_err());
	assert!(validate_bounds(&array![0.0], &array![1.0, 1.0]).is_err());

	let mut ss = ScatterSearch::new(&sphere, array![1.0, 0.0], array![0.0, 1.0]);
	assert!(matches!(ss.initialize(), Err(SSError::Config(_))));
}

#[test]
fn test_json_round_trip() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("ss.json");
	let cfg = SSConfigBuilder::new()
		.max_iter(7)
		.seed(3)
		.local_search(LocalSearch::NelderMead)
		.history_dir(dir.path())
		.build();
	cfg.save_json(&path).unwrap();
	let back = SSConfig::load_json(&path).unwrap();
	assert_eq!(back.max_iter, 7);
	assert_eq!(back.seed, Some(3));
	assert_eq!(back.local_search, LocalSearch::NelderMead);
	assert!(back.perform_local_search);
	assert_eq!(back.history_dir.as_deref(), Some(dir.path()));

	// partial files keep the defaults
	std::fs::write(&path, r#"{ "p": 4, "local_search": "hill_climb" }"#).unwrap();
	let partial = SSConfig::load_json(&path).unwrap();
	assert_eq!(partial.p, 4);
	assert_eq!(partial.max_iter, SSConfig::default().max_iter);

	std::fs::write(&path, "{ not json").unwrap();
	assert!(matches!(SSConfig::load_json(&path), Err(SSError::Json(_))));
}

#[test]
fn test_step_requires_initialize() {
	let mut ss = ScatterSearch::new(&sphere, array![-1.0, -1.0], array![1.0, 1.0]);
	assert!(ss.step().is_err());
	assert!(ss.ref_set().is_empty());
	assert!(ss.best().is_none());
}

#[test]
fn test_initialize_builds_sorted_ref_set() {
	let mut ss = ScatterSearch::new(&sphere, array![-5.0, -5.0, -5.0], array![5.0, 5.0, 5.0]);
	ss.config_mut().seed = Some(1);
	ss.initialize().unwrap();
	assert_eq!(ss.ref_set().len(), 20);
	assert!(ss.ref_set().windows(2).all(|w| w[0].cost <= w[1].cost));
	assert_eq!(ss.best().unwrap(), &ss.ref_set()[0]);
	assert_eq!(ss.stats().n_function_evals, 40);
}

#[test]
fn test_best_tracks_ref_set() {
	let mut ss = ScatterSearch::new(&sphere, array![-5.0, -5.0], array![5.0, 5.0]);
	ss.config_mut().seed = Some(9);
	ss.initialize().unwrap();
	let mut previous = ss.best().unwrap().cost;
	for _ in 0..10 {
		ss.step().unwrap();
		let best = ss.best().unwrap();
		assert_eq!(best, &ss.ref_set()[0]);
		assert!(best.cost <= previous);
		previous = best.cost;
	}
	assert_eq!(ss.iteration(), 10);
}

#[test]
fn test_stagnation_triggers_one_regeneration() {
	let mut ss = ScatterSearch::new(&sphere, array![-5.0, -5.0], array![5.0, 5.0]);
	{
		let cfg = ss.config_mut();
		cfg.seed = Some(17);
		cfg.ref_set_regen_freq = 0;
	}
	ss.initialize().unwrap();
	ss.step().unwrap();
	let before = ss.stats().n_regenerations;
	let elite: Vec<Individual> = ss.ref_set()[..10].to_vec();

	let forged = UpdateOutcome { examined: 10, replaced: 1, duplicates: 8, flatzone: 1 };
	assert!(forged.duplicate_ratio() > 0.7);
	let config = SSConfig { seed: Some(17), ref_set_regen_freq: 0, ..SSConfig::default() };
	if let Some(state) = ss.state.as_mut() {
		state.regen_pending = false;
		state.note_outcome(&config, &forged);
	}

	ss.step().unwrap();
	assert_eq!(ss.stats().n_regenerations, before + 1);
	assert_eq!(ss.ref_set().len(), 20);
	// the elite half survives regeneration
	assert!(ss.ref_set()[0].cost <= elite[0].cost);
}

#[test]
fn test_regeneration_disabled() {
	let mut ss = ScatterSearch::new(&sphere, array![-5.0, -5.0], array![5.0, 5.0]);
	ss.config_mut().seed = Some(17);
	ss.config_mut().perform_ref_set_regen = false;
	ss.initialize().unwrap();
	let forged = UpdateOutcome { examined: 10, replaced: 0, duplicates: 10, flatzone: 0 };
	let config = SSConfig { perform_ref_set_regen: false, ..SSConfig::default() };
	if let Some(state) = ss.state.as_mut() {
		state.note_outcome(&config, &forged);
		assert!(!state.regen_pending);
	}
	ss.step().unwrap();
	assert_eq!(ss.stats().n_regenerations, 0);
}

#[test]
fn test_scheduled_regeneration() {
	let mut ss = ScatterSearch::new(&sphere, array![-5.0, -5.0], array![5.0, 5.0]);
	ss.config_mut().seed = Some(5);
	ss.initialize().unwrap();
	let config = SSConfig { ref_set_regen_freq: 4, regen_duplicate_ratio: 1.0, ..SSConfig::default() };
	let healthy = UpdateOutcome { examined: 10, replaced: 6, duplicates: 4, flatzone: 0 };
	let state = ss.state.as_mut().unwrap();
	for iter in 1..=9 {
		state.iter = iter;
		state.regen_pending = false;
		state.note_outcome(&config, &healthy);
		assert_eq!(state.regen_pending, iter % 4 == 0, "iteration {}", iter);
	}
}

#[test]
fn test_scheduled_regeneration_runs() {
	let cfg = SSConfigBuilder::new().seed(5).max_iter(9).ref_set_regen_freq(4).regen_duplicate_ratio(1.0).build();
	let report = scatter_search(&sphere, &[(-5.0, 5.0), (-5.0, 5.0)], cfg).unwrap();
	// scheduled after iterations 4 and 8, run at 5 and 9; stalls may add more
	assert!(report.stats.n_regenerations >= 2);
}

#[test]
fn test_stalled_update_triggers_regeneration() {
	// nothing ever beats the worst member of a flat landscape
	let flat = |_: &Array1<f64>| 1.0;
	let cfg = SSConfigBuilder::new().seed(6).max_iter(3).build();
	let report = scatter_search(&flat, &[(-1.0, 1.0), (-1.0, 1.0)], cfg).unwrap();
	// scheduled after iterations 1 and 2, run at 2 and 3
	assert_eq!(report.stats.n_regenerations, 2);
	assert_eq!(report.stats.n_ref_set_update, 0);
}

#[test]
fn test_collapsed_ref_set_is_regenerated() {
	let mut ss = ScatterSearch::new(&sphere, array![-5.0, -5.0], array![5.0, 5.0]);
	ss.config_mut().seed = Some(12);
	ss.initialize().unwrap();
	{
		let state = ss.state.as_mut().unwrap();
		let first = state.ref_set[0].clone();
		for m in state.ref_set.iter_mut() {
			*m = first.clone();
		}
	}
	assert!(select_subsets(ss.ref_set(), 1e-4).is_empty());

	let outcome = ss.step().unwrap();
	assert!(outcome.stalled());
	assert_eq!(ss.stats().n_regenerations, 0);
	ss.step().unwrap();
	assert_eq!(ss.stats().n_regenerations, 1);
	assert!(!select_subsets(ss.ref_set(), 1e-4).is_empty());
}

#[test]
fn test_forbidden_values_are_clamped() {
	let nasty = |x: &Array1<f64>| if x[0] > 0.0 { f64::NAN } else { sphere(x) };
	let mut ss = ScatterSearch::new(&nasty, array![-5.0, -5.0], array![5.0, 5.0]);
	ss.config_mut().seed = Some(4);
	ss.config_mut().max_iter = 20;
	let report = ss.solve().unwrap();
	assert!(report.stats.n_forbidden > 0);
	assert!(report.fun < 1e38);
	assert!(report.x[0] <= 0.0);
	assert!(report.ref_costs.iter().all(|c| !c.is_nan()));
}

#[test]
fn test_callback_stops() {
	let cfg = SSConfigBuilder::new()
		.seed(2)
		.max_iter(50)
		.callback(Box::new(|it: &SSIntermediate| {
			if it.iter >= 3 { CallbackAction::Stop } else { CallbackAction::Continue }
		}))
		.build();
	let report = scatter_search(&sphere, &[(-1.0, 1.0), (-1.0, 1.0)], cfg).unwrap();
	assert_eq!(report.nit, 3);
	assert!(!report.success);
	assert!(report.message.contains("callback"));
}

#[test]
fn test_stop_criteria() {
	let flat = |_: &Array1<f64>| 1.0;
	let cfg = SSConfigBuilder::new().seed(2).max_iter(50).stop_criteria(1e-9).build();
	let report = scatter_search(&flat, &[(-1.0, 1.0), (-1.0, 1.0)], cfg).unwrap();
	assert!(report.success);
	assert_eq!(report.nit, 1);
	assert_eq!(report.stats.n_function_evals, report.nfev);
}
