use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::error::SSError;
use crate::{CallbackAction, SSIntermediate};

/// Records optimization progress via Scatter Search callbacks
#[derive(Debug)]
pub struct OptimizationRecorder {
    /// Function name (used for CSV filename)
    function_name: String,
    /// Shared records storage
    records: Rc<RefCell<Vec<OptimizationRecord>>>,
    /// Best function value seen so far
    best_value: Rc<RefCell<Option<f64>>>,
}

/// A single optimization iteration record
#[derive(Debug, Clone, serde::Serialize)]
pub struct OptimizationRecord {
    /// Iteration number
    pub iteration: usize,
    /// Best x found so far
    pub x: Vec<f64>,
    /// Best function result so far
    pub best_result: f64,
    /// Cost spread of the reference set (worst - best)
    pub spread: f64,
    /// Whether this iteration improved the best known result
    pub is_improvement: bool,
}

impl OptimizationRecorder {
    /// Create a new optimization recorder for the given function
    pub fn new(function_name: String) -> Self {
        Self {
            function_name,
            records: Rc::new(RefCell::new(Vec::new())),
            best_value: Rc::new(RefCell::new(None)),
        }
    }

    /// Create a callback function that records optimization progress
    pub fn create_callback(&self) -> Box<dyn FnMut(&SSIntermediate) -> CallbackAction> {
        let records = Rc::clone(&self.records);
        let best_value = Rc::clone(&self.best_value);

        Box::new(move |intermediate: &SSIntermediate| -> CallbackAction {
            let mut best = best_value.borrow_mut();
            let is_improvement = best.is_none_or(|b| intermediate.fun < b);
            if is_improvement {
                *best = Some(intermediate.fun);
            }

            records.borrow_mut().push(OptimizationRecord {
                iteration: intermediate.iter,
                x: intermediate.x.to_vec(),
                best_result: intermediate.fun,
                spread: intermediate.spread,
                is_improvement,
            });

            CallbackAction::Continue
        })
    }

    /// Save all recorded iterations to `<output_dir>/<function_name>.csv`
    pub fn save_to_csv(&self, output_dir: &Path) -> Result<PathBuf, SSError> {
        std::fs::create_dir_all(output_dir).map_err(|e| SSError::io(output_dir, e))?;

        let filename = output_dir.join(format!("{}.csv", self.function_name));
        let mut writer = csv::Writer::from_path(&filename)?;

        let records = self.records.borrow();
        let Some(first) = records.first() else {
            writer.flush().map_err(|e| SSError::io(&filename, e))?;
            return Ok(filename);
        };

        let mut header = vec!["iteration".to_string()];
        header.extend((0..first.x.len()).map(|i| format!("x{}", i)));
        header.extend(["best_result", "spread", "is_improvement"].map(String::from));
        writer.write_record(&header)?;

        for record in records.iter() {
            let mut row = vec![record.iteration.to_string()];
            row.extend(record.x.iter().map(|xi| format!("{:.16}", xi)));
            row.push(format!("{:.16}", record.best_result));
            row.push(format!("{:.16}", record.spread));
            row.push(record.is_improvement.to_string());
            writer.write_record(&row)?;
        }
        writer.flush().map_err(|e| SSError::io(&filename, e))?;

        Ok(filename)
    }

    /// Get a copy of all recorded iterations
    pub fn get_records(&self) -> Vec<OptimizationRecord> {
        self.records.borrow().clone()
    }

    /// Get the number of iterations recorded
    pub fn num_iterations(&self) -> usize {
        self.records.borrow().len()
    }

    /// Clear all recorded iterations
    pub fn clear(&self) {
        self.records.borrow_mut().clear();
        *self.best_value.borrow_mut() = None;
    }

    /// Get the final best solution if any iterations were recorded
    pub fn get_best_solution(&self) -> Option<(Vec<f64>, f64)> {
        self.records
            .borrow()
            .last()
            .map(|last| (last.x.clone(), last.best_result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn step(iter: usize, fun: f64) -> SSIntermediate {
        SSIntermediate { x: array![fun, -fun], fun, spread: 1.0, iter }
    }

    #[test]
    fn test_records_improvements() {
        let recorder = OptimizationRecorder::new("unit".to_string());
        let mut cb = recorder.create_callback();
        for (i, f) in [3.0, 2.0, 2.0, 1.0].into_iter().enumerate() {
            assert!(matches!(cb(&step(i + 1, f)), CallbackAction::Continue));
        }
        let records = recorder.get_records();
        assert_eq!(recorder.num_iterations(), 4);
        let flags: Vec<bool> = records.iter().map(|r| r.is_improvement).collect();
        assert_eq!(flags, vec![true, true, false, true]);
        assert_eq!(recorder.get_best_solution(), Some((vec![1.0, -1.0], 1.0)));

        recorder.clear();
        assert_eq!(recorder.num_iterations(), 0);
        assert!(recorder.get_best_solution().is_none());
    }

    #[test]
    fn test_save_to_csv() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = OptimizationRecorder::new("unit".to_string());
        let mut cb = recorder.create_callback();
        cb(&step(1, 0.5));
        cb(&step(2, 0.25));
        let path = recorder.save_to_csv(dir.path()).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap(), "iteration,x0,x1,best_result,spread,is_improvement");
        assert_eq!(text.lines().count(), 3);
        assert!(text.lines().last().unwrap().starts_with("2,0.25"));
    }
}
