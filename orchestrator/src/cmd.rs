// Copyright (C) Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later WITH Classpath-exception-2.0

//! Launch command generation.
//!
//! Two variants exist: the standard single-binary command, and the collator
//! command which nests the standard argument set behind a `--` separator so
//! that one umbrella process carries both the parachain and the relay-chain
//! command lines.

use crate::{constants::DEFAULT_COMMAND, node_spec::NodeSpec};
use std::path::Path;

/// Build the standard launch command for a node.
///
/// `full_command` on the spec short-circuits generation entirely and is
/// handed to a shell verbatim. Otherwise the command starts from the spec's
/// binary (or the default one) and carries the chain spec from the node's
/// config directory, the networking and RPC surface expected of a
/// disposable test node, the given port flags and any extra args.
pub fn gen_cmd(
	node: &NodeSpec,
	cfg_path: &Path,
	data_path: &Path,
	port_flags: &[(String, u16)],
) -> Vec<String> {
	if let Some(full_command) = &node.full_command {
		return vec!["bash".into(), "-c".into(), full_command.clone()]
	}

	let binary = node.command.clone().unwrap_or_else(|| DEFAULT_COMMAND.to_string());

	let mut cmd = vec![
		binary,
		"--chain".into(),
		format!("{}/{}.json", cfg_path.display(), node.chain),
		"--name".into(),
		node.name.clone(),
		"--rpc-cors".into(),
		"all".into(),
		"--unsafe-rpc-external".into(),
		"--rpc-methods".into(),
		"unsafe".into(),
		"--unsafe-ws-external".into(),
	];

	if node.validator {
		cmd.push("--validator".into());
	}

	if !node.bootnodes.is_empty() {
		cmd.push("--bootnodes".into());
		cmd.extend(node.bootnodes.iter().cloned());
	}

	if !node.telemetry_url.is_empty() {
		cmd.push("--telemetry-url".into());
		cmd.push(node.telemetry_url.clone());
	}

	for (flag, port) in port_flags {
		cmd.push(flag.clone());
		cmd.push(port.to_string());
	}

	cmd.push("--base-path".into());
	cmd.push(data_path.display().to_string());

	cmd.extend(node.args.iter().cloned());

	cmd
}

/// Build the collator launch command: the outer collator invocation followed
/// by `--` and the nested relay-chain argument set for the same node.
pub fn gen_cumulus_collator_cmd(
	launch_command: &str,
	node: &NodeSpec,
	cfg_path: &Path,
	data_path: &Path,
	port_flags: &[(String, u16)],
) -> Vec<String> {
	let mut cmd = vec![
		launch_command.to_string(),
		"--name".into(),
		node.name.clone(),
		"--collator".into(),
		"--force-authoring".into(),
		"--chain".into(),
		format!("{}/{}.json", cfg_path.display(), node.chain),
		"--base-path".into(),
		data_path.display().to_string(),
	];
	cmd.extend(node.args.iter().cloned());

	// Everything after the separator is the nested relay-chain command line;
	// the binary of the standard command is dropped, the umbrella process
	// provides it.
	cmd.push("--".into());
	cmd.extend(gen_cmd(node, cfg_path, data_path, port_flags).into_iter().skip(1));

	cmd
}
