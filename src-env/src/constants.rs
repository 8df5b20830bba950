/// Name of the environment variable pointing at the project root
pub const GENEFIT_DIR_VAR: &str = "GENEFIT_DIR";

/// Directory (relative to the project root) receiving every generated file
pub const DATA_GENERATED: &str = "data_generated";

/// Sub-directory of `DATA_GENERATED` for Scatter Search histories and warm-start files
pub const SS_RUNS: &str = "ss";
