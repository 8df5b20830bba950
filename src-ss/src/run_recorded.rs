use ndarray::Array1;
use std::path::{Path, PathBuf};

use crate::error::SSError;
use crate::scatter_search::scatter_search;
use crate::{OptimizationRecorder, SSConfig, SSReport};

/// Helper function for running scatter search with recording
///
/// Any callback already present in `config` is replaced by the recorder's.
pub fn run_recorded_scatter_search<F>(
    function_name: &str,
    func: F,
    bounds: &[(f64, f64)],
    mut config: SSConfig,
    output_dir: &Path,
) -> Result<(SSReport, PathBuf), SSError>
where
    F: Fn(&Array1<f64>) -> f64,
{
    // Create the recorder
    let recorder = OptimizationRecorder::new(function_name.to_string());

    // Set up the callback to record progress
    config.callback = Some(recorder.create_callback());

    // Run the optimization
    let result = scatter_search(&func, bounds, config)?;

    // Save the recording to CSV
    let csv_path = recorder.save_to_csv(output_dir)?;

    Ok((result, csv_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SSConfigBuilder;

    #[test]
    fn test_run_recorded_basic() {
        let quadratic = |x: &Array1<f64>| -> f64 { x.iter().map(|&xi| xi * xi).sum() };

        let dir = tempfile::tempdir().unwrap();
        let bounds = vec![(-5.0, 5.0), (-5.0, 5.0)];
        let config = SSConfigBuilder::new().seed(42).max_iter(30).build();

        let (report, csv_path) =
            run_recorded_scatter_search("test_quadratic", quadratic, &bounds, config, dir.path())
                .unwrap();

        assert!(report.fun < 1e-2, "Function value too high: {}", report.fun);
        for &xi in report.x.iter() {
            assert!(xi.abs() < 1e-1, "Variable too far from 0: {}", xi);
        }

        let text = std::fs::read_to_string(&csv_path).unwrap();
        // header plus one row per iteration
        assert_eq!(text.lines().count(), report.nit + 1);
    }
}
