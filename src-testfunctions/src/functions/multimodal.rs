//! Multimodal test functions
//!
//! These functions have multiple local minima and are used to test the global
//! search capabilities and exploration of optimization algorithms. Most of
//! them come from the classic Ali, Khompatraporn & Zabinsky benchmark set.

use ndarray::Array1;
use std::f64::consts::PI;

/// Branin (RCOS) function
/// Global minimum: f(x) = 0.397887 at (-pi, 12.275), (pi, 2.275), (9.42478, 2.475)
/// Bounds: x1 in [-5, 10], x2 in [0, 15]
pub fn branin(x: &Array1<f64>) -> f64 {
    let (x1, x2) = (x[0], x[1]);
    let b = 5.1 / (4.0 * PI * PI);
    let c = 5.0 / PI;
    let f = 1.0 / (8.0 * PI);
    (x2 - b * x1 * x1 + c * x1 - 6.0).powi(2) + 10.0 * (1.0 - f) * x1.cos() + 10.0
}

/// Ackley function - N-dimensional, nearly flat outer region with a deep hole
/// Global minimum: f(x) = 0 at x = (0, 0, ..., 0)
/// Bounds: x_i in [-32.768, 32.768]
pub fn ackley(x: &Array1<f64>) -> f64 {
    let n = x.len() as f64;
    let sum_sq = x.iter().map(|&xi| xi * xi).sum::<f64>();
    let sum_cos = x.iter().map(|&xi| (2.0 * PI * xi).cos()).sum::<f64>();
    -20.0 * (-0.2 * (sum_sq / n).sqrt()).exp() - (sum_cos / n).exp() + 20.0 + std::f64::consts::E
}

/// Rastrigin function - regular grid of local minima
/// Global minimum: f(x) = 0 at x = (0, 0, ..., 0)
/// Bounds: x_i in [-5.12, 5.12]
pub fn rastrigin(x: &Array1<f64>) -> f64 {
    let n = x.len() as f64;
    10.0 * n
        + x.iter()
            .map(|&xi| xi * xi - 10.0 * (2.0 * PI * xi).cos())
            .sum::<f64>()
}

/// Griewank function
/// Global minimum: f(x) = 0 at x = (0, 0, ..., 0)
/// Bounds: x_i in [-600, 600]
pub fn griewank(x: &Array1<f64>) -> f64 {
    let sum = x.iter().map(|&xi| xi * xi).sum::<f64>() / 4000.0;
    let prod = x
        .iter()
        .enumerate()
        .map(|(i, &xi)| (xi / ((i + 1) as f64).sqrt()).cos())
        .product::<f64>();
    1.0 + sum - prod
}

/// Six-hump camel back function
/// Global minimum: f(x) = -1.0316 at (0.0898, -0.7126) and (-0.0898, 0.7126)
/// Bounds: x1 in [-3, 3], x2 in [-2, 2]
pub fn six_hump_camel(x: &Array1<f64>) -> f64 {
    let (x1, x2) = (x[0], x[1]);
    (4.0 - 2.1 * x1 * x1 + x1.powi(4) / 3.0) * x1 * x1 + x1 * x2 + (-4.0 + 4.0 * x2 * x2) * x2 * x2
}

/// Goldstein-Price function
/// Global minimum: f(x) = 3 at x = (0, -1)
/// Bounds: x_i in [-2, 2]
pub fn goldstein_price(x: &Array1<f64>) -> f64 {
    let (x1, x2) = (x[0], x[1]);
    let a = 1.0
        + (x1 + x2 + 1.0).powi(2)
            * (19.0 - 14.0 * x1 + 3.0 * x1 * x1 - 14.0 * x2 + 6.0 * x1 * x2 + 3.0 * x2 * x2);
    let b = 30.0
        + (2.0 * x1 - 3.0 * x2).powi(2)
            * (18.0 - 32.0 * x1 + 12.0 * x1 * x1 + 48.0 * x2 - 36.0 * x1 * x2 + 27.0 * x2 * x2);
    a * b
}

/// Cosine mixture function
/// Global minimum: f(x) = -0.1 * n at x = (0, 0, ..., 0)
/// Bounds: x_i in [-1, 1]
pub fn cosine_mixture(x: &Array1<f64>) -> f64 {
    let sum_cos = x.iter().map(|&xi| (5.0 * PI * xi).cos()).sum::<f64>();
    let sum_sq = x.iter().map(|&xi| xi.powi(2)).sum::<f64>();
    -0.1 * sum_cos + sum_sq
}

/// Periodic function
/// Global minimum: f(x) = 0.9 at x = (0, 0)
/// Bounds: x_i in [-10, 10]
pub fn periodic(x: &Array1<f64>) -> f64 {
    let (x1, x2) = (x[0], x[1]);
    1.0 + x1.sin().powi(2) + x2.sin().powi(2) - 0.1 * (-(x1 * x1 + x2 * x2)).exp()
}

/// Aluffi-Pentini function
/// Global minimum: f(x) = -0.352386 at x = (-1.0465, 0)
/// Bounds: x_i in [-10, 10]
pub fn aluffi_pentini(x: &Array1<f64>) -> f64 {
    let (x1, x2) = (x[0], x[1]);
    0.25 * x1.powi(4) - 0.5 * x1 * x1 + 0.1 * x1 + 0.5 * x2 * x2
}

/// Easom function - a single narrow hole in a flat plateau
/// Global minimum: f(x) = -1 at x = (pi, pi)
/// Bounds: x_i in [-100, 100]
pub fn easom(x: &Array1<f64>) -> f64 {
    let (x1, x2) = (x[0], x[1]);
    -x1.cos() * x2.cos() * (-((x1 - PI).powi(2) + (x2 - PI).powi(2))).exp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_known_minima() {
        assert!((branin(&array![PI, 2.275]) - 0.397887).abs() < 1e-5);
        assert!(ackley(&array![0.0, 0.0]).abs() < 1e-12);
        assert_eq!(rastrigin(&array![0.0, 0.0, 0.0]), 0.0);
        assert!(griewank(&array![0.0, 0.0]).abs() < 1e-12);
        assert!((six_hump_camel(&array![0.0898, -0.7126]) + 1.0316).abs() < 1e-4);
        assert!((goldstein_price(&array![0.0, -1.0]) - 3.0).abs() < 1e-12);
        assert!((cosine_mixture(&array![0.0, 0.0]) + 0.2).abs() < 1e-12);
        assert!((periodic(&array![0.0, 0.0]) - 0.9).abs() < 1e-12);
        assert!((aluffi_pentini(&array![-1.0465, 0.0]) + 0.352386).abs() < 1e-5);
        assert!((easom(&array![PI, PI]) + 1.0).abs() < 1e-12);
    }
}
