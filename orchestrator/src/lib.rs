// Copyright (C) Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later WITH Classpath-exception-2.0

//! Launch-artifact generation for the nodes of an ephemeral test network.
//!
//! For every node the fleet layer declares, this crate allocates host ports,
//! builds the launch command and assembles a provider-agnostic resource
//! definition that the external process or pod launcher consumes. Nodes may
//! reference each other's network addresses before those are known; such
//! references are emitted as `{{ZOMBIE:<name>}}` placeholder tokens and
//! rewritten by [`resource::replace_multi_address_references`] once the
//! launcher reports the real addresses. See the module docs for details of
//! each step.

pub mod cmd;
pub mod constants;
pub mod errors;
pub mod events;
pub mod node_spec;
pub mod ports;
pub mod resource;

pub use cmd::{gen_cmd, gen_cumulus_collator_cmd};
pub use errors::ProviderError;
pub use node_spec::{EnvVar, NodeSpec, OverrideFile, ZombieRole};
pub use ports::{allocate_ports, port_flags, PortEntry};
pub use resource::{
	create_temp_node_def, gen_bootnode_def, gen_node_def, replace_multi_address_references,
	Command, MultiAddressByNode, ResourceDefinition, ResourceLabels, ResourceMetadata,
	ResourceSpec,
};

pub(crate) const LOG_TARGET: &str = "zombienet::orchestrator";
