// Copyright (C) Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later WITH Classpath-exception-2.0

//! Orchestrator errors.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
	#[error("failed to create node directory {}: {source}", path.display())]
	CreateDir { path: PathBuf, source: std::io::Error },
	#[error(transparent)]
	Net(#[from] zombienet_support::net::Error),
}
