// Copyright (C) Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later WITH Classpath-exception-2.0

//! Host port allocation for the four fixed service roles of a node.

use crate::{
	constants::{P2P_PORT, PROMETHEUS_PORT, RPC_HTTP_PORT, RPC_WS_PORT},
	errors::ProviderError,
};
use serde::{Deserialize, Serialize};
use zombienet_support::net::random_free_port;

/// One entry of a node's port map: a logical service role, its fixed
/// container-side port, the CLI flag carrying it and the ephemeral host port.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortEntry {
	pub container_port: u16,
	pub name: String,
	pub flag: String,
	pub host_port: u16,
}

/// Allocate the four-role port map for one node. Host ports are mutually
/// distinct, reserved process-wide until released.
pub fn allocate_ports() -> Result<Vec<PortEntry>, ProviderError> {
	const ROLES: [(&str, u16, &str); 4] = [
		("prometheus", PROMETHEUS_PORT, "--prometheus-port"),
		("rpc", RPC_HTTP_PORT, "--rpc-port"),
		("ws", RPC_WS_PORT, "--ws-port"),
		("p2p", P2P_PORT, "--port"),
	];

	ROLES
		.iter()
		.map(|(name, container_port, flag)| {
			Ok(PortEntry {
				container_port: *container_port,
				name: (*name).to_string(),
				flag: (*flag).to_string(),
				host_port: random_free_port()?,
			})
		})
		.collect()
}

/// Flatten a port map into `(flag, host port)` pairs, preserving allocation
/// order, ready to be spliced into a command line.
pub fn port_flags(ports: &[PortEntry]) -> Vec<(String, u16)> {
	ports.iter().map(|port| (port.flag.clone(), port.host_port)).collect()
}
