use genefit_ss::{
    default_ref_set_size, scatter_search, LocalSearch, SSConfigBuilder,
};
use genefit_testfunctions::{quadratic, sphere};

#[test]
fn test_ss_quadratic_2d() {
    // converges to the origin without local search
    let bounds = vec![(-5.0, 5.0), (-5.0, 5.0)];
    let config = SSConfigBuilder::new().seed(1).max_iter(60).build();
    let report = scatter_search(&quadratic, &bounds, config).unwrap();

    assert!(report.fun < 1e-2, "Function value too high: {}", report.fun);
    for &xi in report.x.iter() {
        assert!(xi.abs() < 0.1, "Variable too far from 0: {}", xi);
    }
    assert_eq!(report.nit, 60);
    assert_eq!(report.ref_set.len(), 20);
    assert_eq!(report.ref_costs[0], report.fun);
}

#[test]
fn test_ss_quadratic_5d() {
    let bounds = vec![(-5.0, 5.0); 5];
    let config = SSConfigBuilder::new().seed(7).max_iter(200).build();
    let report = scatter_search(&quadratic, &bounds, config).unwrap();
    assert_eq!(report.ref_set.len(), default_ref_set_size(5));
    assert!(report.fun < 1e-1, "Function value too high: {}", report.fun);
}

#[test]
fn test_ss_sphere_hill_climb() {
    let bounds = vec![(-5.12, 5.12); 3];
    let config = SSConfigBuilder::new()
        .seed(3)
        .max_iter(60)
        .local_search(LocalSearch::HillClimb)
        .local_search_freq(10)
        .step_size(0.05)
        .max_no_improve(50)
        .build();
    let report = scatter_search(&sphere, &bounds, config).unwrap();
    assert!(report.fun < 1e-2, "Function value too high: {}", report.fun);
    // six refinement rounds over the whole reference set
    assert_eq!(report.stats.n_refinement, 6 * 20);
}

#[test]
fn test_ss_same_seed_same_result() {
    let bounds = vec![(-5.0, 5.0), (-5.0, 5.0)];
    let run = || {
        let config = SSConfigBuilder::new().seed(11).max_iter(15).build();
        scatter_search(&quadratic, &bounds, config).unwrap()
    };
    let a = run();
    let b = run();
    assert_eq!(a.x, b.x);
    assert_eq!(a.fun, b.fun);
    assert_eq!(a.nfev, b.nfev);
}
