//! Tab-separated matrix files
//!
//! Rows are written without headers. Floats use Rust's shortest round-trip
//! formatting so that reading a file back yields identical values.

use csv::{ReaderBuilder, Trim, WriterBuilder};
use std::fs::File;
use std::path::Path;
use std::str::FromStr;

use crate::error::SSError;

pub(crate) fn writer(path: &Path) -> Result<csv::Writer<File>, SSError> {
	let file = File::create(path).map_err(|e| SSError::io(path, e))?;
	Ok(WriterBuilder::new().delimiter(b'\t').has_headers(false).flexible(true).from_writer(file))
}

/// Write rows of displayable values
pub(crate) fn write_rows<T, I, R>(path: &Path, rows: I) -> Result<(), SSError>
where
	T: ToString,
	R: IntoIterator<Item = T>,
	I: IntoIterator<Item = R>,
{
	let mut w = writer(path)?;
	for row in rows {
		let record: Vec<String> = row.into_iter().map(|v| v.to_string()).collect();
		w.write_record(&record)?;
	}
	w.flush().map_err(|e| SSError::io(path, e))?;
	Ok(())
}

/// Read exactly `rows` rows of exactly `cols` values each
pub(crate) fn read_matrix<T: FromStr>(path: &Path, rows: usize, cols: usize) -> Result<Vec<Vec<T>>, SSError> {
	let file = File::open(path).map_err(|e| SSError::warm_start(path, format!("cannot open: {}", e)))?;
	let mut reader = ReaderBuilder::new()
		.delimiter(b'\t')
		.has_headers(false)
		.flexible(true)
		.trim(Trim::All)
		.from_reader(file);

	let mut out = Vec::with_capacity(rows);
	for (line, record) in reader.records().enumerate() {
		let record = record.map_err(|e| SSError::warm_start(path, e.to_string()))?;
		if record.iter().all(|f| f.is_empty()) {
			continue;
		}
		if out.len() == rows {
			return Err(SSError::warm_start(path, format!("more than {} rows", rows)));
		}
		if record.len() != cols {
			return Err(SSError::warm_start(
				path,
				format!("row {} has {} values, expected {}", line + 1, record.len(), cols),
			));
		}
		let values = record
			.iter()
			.map(|f| {
				f.parse::<T>().map_err(|_| {
					SSError::warm_start(path, format!("row {}: cannot parse '{}'", line + 1, f))
				})
			})
			.collect::<Result<Vec<T>, SSError>>()?;
		out.push(values);
	}
	if out.len() != rows {
		return Err(SSError::warm_start(path, format!("found {} rows, expected {}", out.len(), rows)));
	}
	Ok(out)
}
