//! Optimization test functions library
//!
//! Analytic objectives with known global minima. The genefit optimizers treat
//! the gene-circuit score as an opaque `f(x) -> cost`; these functions stand in
//! for it in tests, benchmarks and the command-line runner.
//!
//! # Example
//!
//! ```rust
//! use ndarray::Array1;
//! use genefit_testfunctions::*;
//!
//! let x = Array1::from_vec(vec![0.0, 0.0]);
//! assert_eq!(sphere(&x), 0.0);
//!
//! let branin = &get_function_metadata()["branin"];
//! assert_eq!(branin.bounds[1], (0.0, 15.0));
//! ```

use ndarray::Array1;
use std::collections::HashMap;

pub mod functions;
pub use functions::*;

/// Signature shared by every test function
pub type TestFunction = fn(&Array1<f64>) -> f64;

/// Metadata for a test function including bounds and known minima
#[derive(Debug, Clone)]
pub struct FunctionMetadata {
    /// Function name
    pub name: String,
    /// The function itself
    pub function: TestFunction,
    /// Bounds for each dimension (min, max) in the default dimension
    pub bounds: Vec<(f64, f64)>,
    /// Global minima locations and values
    pub global_minima: Vec<(Vec<f64>, f64)>,
    /// Description of the function
    pub description: String,
    /// Whether the function is multimodal
    pub multimodal: bool,
    /// Whether the function accepts any dimension (bounds are then repeated)
    pub scalable: bool,
}

impl FunctionMetadata {
    /// Bounds for `n` dimensions; only scalable functions accept a dimension
    /// different from their default one.
    pub fn bounds_for(&self, n: usize) -> Option<Vec<(f64, f64)>> {
        if n == self.bounds.len() {
            return Some(self.bounds.clone());
        }
        if self.scalable && n > 0 {
            return Some(vec![self.bounds[0]; n]);
        }
        None
    }

    /// Value of the global minimum
    pub fn min_value(&self) -> f64 {
        self.global_minima
            .iter()
            .map(|(_, f)| *f)
            .fold(f64::INFINITY, f64::min)
    }
}

#[allow(clippy::too_many_arguments)]
fn entry(
    metadata: &mut HashMap<String, FunctionMetadata>,
    name: &str,
    function: TestFunction,
    bounds: Vec<(f64, f64)>,
    global_minima: Vec<(Vec<f64>, f64)>,
    description: &str,
    multimodal: bool,
    scalable: bool,
) {
    metadata.insert(
        name.to_string(),
        FunctionMetadata {
            name: name.to_string(),
            function,
            bounds,
            global_minima,
            description: description.to_string(),
            multimodal,
            scalable,
        },
    );
}

/// Get metadata for all available test functions
pub fn get_function_metadata() -> HashMap<String, FunctionMetadata> {
    let pi = std::f64::consts::PI;
    let mut m = HashMap::new();

    entry(&mut m, "quadratic", quadratic, vec![(-5.0, 5.0); 2], vec![(vec![0.0, 0.0], 0.0)],
        "N-dimensional convex bowl", false, true);
    entry(&mut m, "sphere", sphere, vec![(-5.12, 5.12); 2], vec![(vec![0.0, 0.0], 0.0)],
        "N-dimensional convex bowl", false, true);
    entry(&mut m, "rosenbrock", rosenbrock, vec![(-5.0, 10.0); 2], vec![(vec![1.0, 1.0], 0.0)],
        "N-dimensional curved valley", false, true);
    entry(&mut m, "three_hump_camel", three_hump_camel, vec![(-5.0, 5.0); 2],
        vec![(vec![0.0, 0.0], 0.0)], "2D function with three local minima", false, false);
    entry(&mut m, "booth", booth, vec![(-10.0, 10.0); 2], vec![(vec![1.0, 3.0], 0.0)],
        "2D plate-shaped function", false, false);
    entry(&mut m, "matyas", matyas, vec![(-10.0, 10.0); 2], vec![(vec![0.0, 0.0], 0.0)],
        "2D plate-shaped function", false, false);
    entry(&mut m, "branin", branin, vec![(-5.0, 10.0), (0.0, 15.0)],
        vec![
            (vec![-pi, 12.275], 0.397887),
            (vec![pi, 2.275], 0.397887),
            (vec![9.42478, 2.475], 0.397887),
        ],
        "2D function with three global minima", true, false);
    entry(&mut m, "ackley", ackley, vec![(-32.768, 32.768); 2], vec![(vec![0.0, 0.0], 0.0)],
        "N-dimensional multimodal function", true, true);
    entry(&mut m, "rastrigin", rastrigin, vec![(-5.12, 5.12); 2], vec![(vec![0.0, 0.0], 0.0)],
        "N-dimensional highly multimodal function", true, true);
    entry(&mut m, "griewank", griewank, vec![(-600.0, 600.0); 2], vec![(vec![0.0, 0.0], 0.0)],
        "N-dimensional multimodal function", true, true);
    entry(&mut m, "six_hump_camel", six_hump_camel, vec![(-3.0, 3.0), (-2.0, 2.0)],
        vec![(vec![0.0898, -0.7126], -1.0316), (vec![-0.0898, 0.7126], -1.0316)],
        "2D function with six local minima", true, false);
    entry(&mut m, "goldstein_price", goldstein_price, vec![(-2.0, 2.0); 2],
        vec![(vec![0.0, -1.0], 3.0)], "2D multimodal function", true, false);
    entry(&mut m, "cosine_mixture", cosine_mixture, vec![(-1.0, 1.0); 4],
        vec![(vec![0.0; 4], -0.4)], "4D cosine mixture", true, false);
    entry(&mut m, "periodic", periodic, vec![(-10.0, 10.0); 2], vec![(vec![0.0, 0.0], 0.9)],
        "2D periodic function", true, false);
    entry(&mut m, "aluffi_pentini", aluffi_pentini, vec![(-10.0, 10.0); 2],
        vec![(vec![-1.0465, 0.0], -0.352386)], "2D quartic with two basins", true, false);
    entry(&mut m, "easom", easom, vec![(-100.0, 100.0); 2], vec![(vec![pi, pi], -1.0)],
        "2D needle in a flat plateau", true, false);

    m
}

/// Sorted list of the registered function names
pub fn function_names() -> Vec<String> {
    let mut names: Vec<String> = get_function_metadata().into_keys().collect();
    names.sort();
    names
}
