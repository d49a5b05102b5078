// Copyright (C) Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later WITH Classpath-exception-2.0

//! Filesystem helpers.

use std::path::{Path, PathBuf};

/// Filesystem helper errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("failed to read data file {}: {source}", path.display())]
	Read { path: PathBuf, source: std::io::Error },
}

/// Read a data file (e.g. a hex-encoded genesis head or runtime blob) and
/// strip surrounding whitespace, including the trailing newline most tools
/// leave behind.
pub fn read_data_file(path: &Path) -> Result<String, Error> {
	let contents = std::fs::read_to_string(path)
		.map_err(|source| Error::Read { path: path.to_path_buf(), source })?;
	Ok(contents.trim().to_owned())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn read_data_file_trims_whitespace() {
		let dir = tempfile::TempDir::new().unwrap();
		let path = dir.path().join("genesis-state");
		std::fs::write(&path, "0xdeadbeef\n").unwrap();

		assert_eq!(read_data_file(&path).unwrap(), "0xdeadbeef");
	}

	#[test]
	fn read_data_file_reports_the_path_on_error() {
		let err = read_data_file(Path::new("/definitely/not/here")).unwrap_err();
		assert!(err.to_string().contains("/definitely/not/here"));
	}
}
