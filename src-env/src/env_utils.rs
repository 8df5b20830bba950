//! Environment variable utilities for genefit
//!
//! This module resolves the `GENEFIT_DIR` variable that points to the project
//! root, and the `data_generated` tree below it where runs write their
//! histories, traces and warm-start files.

use crate::constants::{DATA_GENERATED, GENEFIT_DIR_VAR, SS_RUNS};
use std::env;
use std::path::{Path, PathBuf};

/// Error type for environment variable issues
#[derive(Debug, thiserror::Error)]
pub enum EnvError {
	#[error(
		"GENEFIT_DIR environment variable is not set. Please set it to the project root directory (e.g., export GENEFIT_DIR=/path/to/genefit)"
	)]
	GenefitDirNotSet,

	#[error("GENEFIT_DIR points to a non-existent directory: {0}")]
	GenefitDirNotFound(PathBuf),

	#[error("Failed to create directory {0}: {1}")]
	DirectoryCreationFailed(PathBuf, std::io::Error),
}

/// Validate a candidate project root.
fn resolve_root(value: Option<String>) -> Result<PathBuf, EnvError> {
	let value = value.ok_or(EnvError::GenefitDirNotSet)?;
	let path = PathBuf::from(value);
	if !path.exists() {
		return Err(EnvError::GenefitDirNotFound(path));
	}
	Ok(path)
}

fn ensure_dir(path: PathBuf) -> Result<PathBuf, EnvError> {
	if !path.exists() {
		std::fs::create_dir_all(&path)
			.map_err(|e| EnvError::DirectoryCreationFailed(path.clone(), e))?;
	}
	Ok(path)
}

/// Get the GENEFIT_DIR environment variable and validate it exists
///
/// # Errors
///
/// Returns an error if:
/// - GENEFIT_DIR is not set
/// - GENEFIT_DIR points to a non-existent directory
///
/// # Example
///
/// ```no_run
/// use genefit_env::get_genefit_dir;
///
/// let root = get_genefit_dir()?;
/// println!("genefit directory: {}", root.display());
/// # Ok::<(), genefit_env::EnvError>(())
/// ```
pub fn get_genefit_dir() -> Result<PathBuf, EnvError> {
	resolve_root(env::var(GENEFIT_DIR_VAR).ok())
}

/// Get the path to the data_generated directory, creating it if necessary
pub fn get_data_generated_dir() -> Result<PathBuf, EnvError> {
	let root = get_genefit_dir()?;
	ensure_dir(root.join(DATA_GENERATED))
}

/// Directory used by a named Scatter Search run: `data_generated/ss/<name>`
///
/// Falls back to `./data_generated/ss/<name>` when GENEFIT_DIR is not set, so
/// binaries keep working from a plain checkout.
pub fn get_run_dir(name: &str) -> Result<PathBuf, EnvError> {
	let base = match get_data_generated_dir() {
		Ok(dir) => dir,
		Err(EnvError::GenefitDirNotSet) => Path::new(".").join(DATA_GENERATED),
		Err(e) => return Err(e),
	};
	ensure_dir(base.join(SS_RUNS).join(name))
}
