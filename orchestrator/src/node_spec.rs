// Copyright (C) Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later WITH Classpath-exception-2.0

//! Declarative description of one node, supplied by the fleet-definition
//! layer. Read-only input to the generators in this crate.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Role a node plays inside the test network.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ZombieRole {
	#[serde(rename = "bootnode")]
	BootNode,
	Authority,
	FullNode,
	/// A parachain collator wrapping a nested relay-chain invocation.
	CumulusCollator,
	/// Short-lived probe node used for one-off queries.
	Temp,
}

impl ZombieRole {
	pub fn as_label(&self) -> &'static str {
		match self {
			Self::BootNode => "bootnode",
			Self::Authority => "authority",
			Self::FullNode => "full-node",
			Self::CumulusCollator => "cumulus-collator",
			Self::Temp => "temp",
		}
	}
}

/// An environment variable passed to the node process.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct EnvVar {
	pub name: String,
	pub value: String,
}

/// A local file injected into the node's config directory under a new name.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideFile {
	pub local_path: PathBuf,
	pub remote_name: String,
}

/// Everything the fleet layer declares about one node.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeSpec {
	pub name: String,
	/// Container image, when the launcher is image based.
	pub image: Option<String>,
	/// Binary to launch. Falls back to [`crate::constants::DEFAULT_COMMAND`].
	pub command: Option<String>,
	/// A complete command line overriding all command generation.
	pub full_command: Option<String>,
	/// Chain identifier the node boots.
	pub chain: String,
	pub validator: bool,
	pub bootnodes: Vec<String>,
	pub args: Vec<String>,
	pub env: Vec<EnvVar>,
	pub telemetry_url: String,
	pub overrides: Vec<OverrideFile>,
	pub zombie_role: Option<ZombieRole>,
}
