//! Environment utilities and constants shared by the genefit crates

pub mod constants;
pub mod env_utils;

pub use constants::*;
pub use env_utils::{EnvError, get_data_generated_dir, get_genefit_dir, get_run_dir};
