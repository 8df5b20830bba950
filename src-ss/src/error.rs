use std::path::PathBuf;

/// Errors raised by the Scatter Search engine
///
/// Only configuration and resource problems surface here: objective failures
/// are absorbed as a "forbidden" cost and never abort a run.
#[derive(Debug, thiserror::Error)]
pub enum SSError {
	#[error("configuration error: {0}")]
	Config(String),

	#[error("warm start file {}: {}", .path.display(), .reason)]
	WarmStart { path: PathBuf, reason: String },

	#[error("I/O error on {}: {}", .path.display(), .source)]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("tab-separated file error: {0}")]
	Csv(#[from] csv::Error),

	#[error("JSON config error: {0}")]
	Json(#[from] serde_json::Error),
}

impl SSError {
	pub(crate) fn config(msg: impl Into<String>) -> Self {
		SSError::Config(msg.into())
	}

	pub(crate) fn warm_start(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
		SSError::WarmStart { path: path.into(), reason: reason.into() }
	}

	pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
		SSError::Io { path: path.into(), source }
	}
}
