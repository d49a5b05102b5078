// Copyright (C) Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later WITH Classpath-exception-2.0

//! Provider-agnostic resource definitions.
//!
//! A [`ResourceDefinition`] is the sole handoff contract to the external
//! launcher: metadata identifying the node within its namespace plus the
//! filesystem paths, port map and command needed to run it. Generation is a
//! two-phase protocol. Commands may embed `{{ZOMBIE:<name>}}` placeholder
//! tokens for addresses of peers that have not started yet; once the
//! launcher knows every address, [`replace_multi_address_references`]
//! rewrites the definitions in place.

use crate::{
	cmd::{gen_cmd, gen_cumulus_collator_cmd},
	constants::DEFAULT_COMMAND,
	errors::ProviderError,
	node_spec::{NodeSpec, ZombieRole},
	ports::{allocate_ports, port_flags, PortEntry},
	LOG_TARGET,
};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::{
	collections::HashMap,
	fs,
	path::{Path, PathBuf},
	sync::atomic::{AtomicUsize, Ordering},
};

/// Node name to resolved multiaddress, reported by the launcher after the
/// fleet (or part of it) is up.
pub type MultiAddressByNode = HashMap<String, String>;

static ZOMBIE_PLACEHOLDER: Lazy<Regex> =
	Lazy::new(|| Regex::new(r"(?i)\{\{ZOMBIE:(.*?)\}\}").expect("the pattern is valid; qed"));

static TEMP_NODE_INDEX: AtomicUsize = AtomicUsize::new(0);

/// A launch command, either a single shell line or an argument vector.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Command {
	Line(String),
	Argv(Vec<String>),
}

/// Fixed label set attached to every generated resource.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ResourceLabels {
	pub name: String,
	pub instance: String,
	#[serde(rename = "zombie-role")]
	pub zombie_role: String,
	pub app: String,
	#[serde(rename = "zombie-ns")]
	pub zombie_ns: String,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ResourceMetadata {
	pub name: String,
	pub namespace: String,
	pub labels: ResourceLabels,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSpec {
	pub cfg_path: String,
	pub data_path: String,
	pub ports: Vec<PortEntry>,
	pub command: Command,
}

/// The artifact describing how to launch one node, independent of the
/// launcher technology. Never mutated after generation, except by
/// [`replace_multi_address_references`].
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ResourceDefinition {
	pub metadata: ResourceMetadata,
	pub spec: ResourceSpec,
}

fn node_dirs(tmp_dir: &Path, name: &str) -> Result<(PathBuf, PathBuf), ProviderError> {
	let cfg_path = tmp_dir.join(name).join("cfg");
	fs::create_dir_all(&cfg_path)
		.map_err(|source| ProviderError::CreateDir { path: cfg_path.clone(), source })?;

	let data_path = tmp_dir.join(name).join("data");
	fs::create_dir_all(&data_path)
		.map_err(|source| ProviderError::CreateDir { path: data_path.clone(), source })?;

	Ok((cfg_path, data_path))
}

/// Generate the resource definition for one node of the fleet.
pub fn gen_node_def(
	namespace: &str,
	node: &NodeSpec,
	tmp_dir: &Path,
) -> Result<ResourceDefinition, ProviderError> {
	let ports = allocate_ports()?;
	let flags = port_flags(&ports);
	let (cfg_path, data_path) = node_dirs(tmp_dir, &node.name)?;

	let command = match node.zombie_role {
		Some(ZombieRole::CumulusCollator) => {
			let launch_command = node.command.as_deref().unwrap_or(DEFAULT_COMMAND);
			gen_cumulus_collator_cmd(launch_command, node, &cfg_path, &data_path, &flags)
		},
		// Any other (or missing) role takes the standard variant.
		_ => gen_cmd(node, &cfg_path, &data_path, &flags),
	};

	let zombie_role = match node.zombie_role {
		Some(role) => role.as_label().to_string(),
		None if node.validator => "authority".to_string(),
		None => "full-node".to_string(),
	};

	log::debug!(target: LOG_TARGET, "generated definition for node {}", node.name);

	Ok(ResourceDefinition {
		metadata: ResourceMetadata {
			name: node.name.clone(),
			namespace: namespace.to_string(),
			labels: ResourceLabels {
				name: namespace.to_string(),
				instance: node.name.clone(),
				zombie_role,
				app: "zombienet".to_string(),
				zombie_ns: namespace.to_string(),
			},
		},
		spec: ResourceSpec {
			cfg_path: cfg_path.display().to_string(),
			data_path: data_path.display().to_string(),
			ports,
			command: Command::Argv(command),
		},
	})
}

/// Generate the resource definition for the dedicated bootnode.
pub fn gen_bootnode_def(
	namespace: &str,
	node: &NodeSpec,
	tmp_dir: &Path,
) -> Result<ResourceDefinition, ProviderError> {
	let ports = allocate_ports()?;
	let flags = port_flags(&ports);
	let (cfg_path, data_path) = node_dirs(tmp_dir, &node.name)?;

	let command = gen_cmd(node, &cfg_path, &data_path, &flags);

	Ok(ResourceDefinition {
		metadata: ResourceMetadata {
			name: "bootnode".to_string(),
			namespace: namespace.to_string(),
			labels: ResourceLabels {
				name: namespace.to_string(),
				instance: "bootnode".to_string(),
				zombie_role: "bootnode".to_string(),
				app: "zombienet".to_string(),
				zombie_ns: namespace.to_string(),
			},
		},
		spec: ResourceSpec {
			cfg_path: cfg_path.display().to_string(),
			data_path: data_path.display().to_string(),
			ports,
			command: Command::Argv(command),
		},
	})
}

/// Build the spec of a short-lived probe node running a fixed command line.
/// Names are unique within the process.
pub fn create_temp_node_def(image: &str, chain: &str, full_command: &str) -> NodeSpec {
	let index = TEMP_NODE_INDEX.fetch_add(1, Ordering::Relaxed) + 1;

	NodeSpec {
		name: format!("temp-{index}"),
		image: Some(image.to_string()),
		full_command: Some(full_command.to_string()),
		chain: chain.to_string(),
		validator: false,
		zombie_role: Some(ZombieRole::Temp),
		..Default::default()
	}
}

/// Rewrite every `{{ZOMBIE:<name>}}` placeholder in the definition's command
/// with the node's reported multiaddress. Handles both command forms.
///
/// Resolution is best effort: a name missing from the map leaves the token
/// literally in place (and logs a warning) rather than failing, since part of
/// the fleet may intentionally not be up yet.
pub fn replace_multi_address_references(
	def: &mut ResourceDefinition,
	addresses: &MultiAddressByNode,
) {
	match &mut def.spec.command {
		Command::Argv(items) =>
			for item in items.iter_mut() {
				*item = resolve_placeholders(item, addresses);
			},
		Command::Line(line) => *line = resolve_placeholders(line, addresses),
	}
}

fn resolve_placeholders(input: &str, addresses: &MultiAddressByNode) -> String {
	ZOMBIE_PLACEHOLDER
		.replace_all(input, |caps: &Captures| {
			let node_name = &caps[1];
			match addresses.get(node_name) {
				Some(address) => address.clone(),
				None => {
					log::warn!(
						target: LOG_TARGET,
						"no multiaddress known for node {node_name}, leaving the placeholder in place",
					);
					caps[0].to_string()
				},
			}
		})
		.into_owned()
}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::TempDir;
	use zombienet_support::net::release_port;

	fn release(def: &ResourceDefinition) {
		for port in &def.spec.ports {
			release_port(port.host_port);
		}
	}

	fn validator_spec() -> NodeSpec {
		NodeSpec {
			name: "alice".into(),
			chain: "rococo-local".into(),
			validator: true,
			..Default::default()
		}
	}

	#[test]
	fn node_def_carries_paths_ports_and_labels() {
		let tmp = TempDir::new().unwrap();
		let def = gen_node_def("zbn-1", &validator_spec(), tmp.path()).unwrap();

		assert_eq!(def.metadata.name, "alice");
		assert_eq!(def.metadata.namespace, "zbn-1");
		assert_eq!(def.metadata.labels.zombie_role, "authority");
		assert_eq!(def.metadata.labels.app, "zombienet");
		assert_eq!(def.metadata.labels.instance, "alice");
		assert!(def.spec.cfg_path.ends_with("alice/cfg"));
		assert!(def.spec.data_path.ends_with("alice/data"));
		assert!(Path::new(&def.spec.cfg_path).is_dir());
		assert!(Path::new(&def.spec.data_path).is_dir());
		assert_eq!(def.spec.ports.len(), 4);

		release(&def);
	}

	#[test]
	fn non_validator_without_role_is_labelled_full_node() {
		let tmp = TempDir::new().unwrap();
		let mut spec = validator_spec();
		spec.validator = false;

		let def = gen_node_def("zbn-1", &spec, tmp.path()).unwrap();
		assert_eq!(def.metadata.labels.zombie_role, "full-node");

		release(&def);
	}

	#[test]
	fn collator_role_selects_the_wrapped_command() {
		let tmp = TempDir::new().unwrap();
		let mut spec = validator_spec();
		spec.zombie_role = Some(ZombieRole::CumulusCollator);
		spec.command = Some("polkadot-parachain".into());

		let def = gen_node_def("zbn-1", &spec, tmp.path()).unwrap();
		let Command::Argv(cmd) = &def.spec.command else { panic!("expected an argv command") };
		assert!(cmd.contains(&"--".to_string()));

		release(&def);
	}

	#[test]
	fn bootnode_def_uses_fixed_identity() {
		let tmp = TempDir::new().unwrap();
		let mut spec = validator_spec();
		spec.name = "bootnode".into();
		spec.validator = false;

		let def = gen_bootnode_def("zbn-1", &spec, tmp.path()).unwrap();
		assert_eq!(def.metadata.name, "bootnode");
		assert_eq!(def.metadata.labels.zombie_role, "bootnode");
		assert_eq!(def.metadata.labels.instance, "bootnode");

		release(&def);
	}

	#[test]
	fn temp_node_defs_get_unique_names() {
		let first = create_temp_node_def("parity/polkadot", "rococo-local", "polkadot --dev");
		let second = create_temp_node_def("parity/polkadot", "rococo-local", "polkadot --dev");

		assert_ne!(first.name, second.name);
		assert!(first.name.starts_with("temp-"));
		assert_eq!(first.zombie_role, Some(ZombieRole::Temp));
		assert!(!first.validator);
	}

	fn def_with_command(command: Command) -> ResourceDefinition {
		ResourceDefinition {
			metadata: ResourceMetadata {
				name: "alice".into(),
				namespace: "zbn-1".into(),
				labels: ResourceLabels {
					name: "zbn-1".into(),
					instance: "alice".into(),
					zombie_role: "authority".into(),
					app: "zombienet".into(),
					zombie_ns: "zbn-1".into(),
				},
			},
			spec: ResourceSpec {
				cfg_path: "/tmp/zbn-1/alice/cfg".into(),
				data_path: "/tmp/zbn-1/alice/data".into(),
				ports: vec![],
				command,
			},
		}
	}

	#[test]
	fn placeholder_in_an_argv_command_is_replaced() {
		let mut def = def_with_command(Command::Argv(vec![
			"start".into(),
			"--peer".into(),
			"{{ZOMBIE:nodeB}}".into(),
		]));
		let addresses =
			MultiAddressByNode::from([("nodeB".to_string(), "/ip4/10.0.0.2/tcp/30333".to_string())]);

		replace_multi_address_references(&mut def, &addresses);

		let Command::Argv(cmd) = &def.spec.command else { panic!("expected an argv command") };
		assert_eq!(cmd[2], "/ip4/10.0.0.2/tcp/30333");
	}

	#[test]
	fn two_distinct_placeholders_resolve_in_one_pass() {
		let mut def = def_with_command(Command::Line(
			"connect {{ZOMBIE:alice}} then {{zombie:bob}}".into(),
		));
		let addresses = MultiAddressByNode::from([
			("alice".to_string(), "/ip4/10.0.0.1/tcp/30333".to_string()),
			("bob".to_string(), "/ip4/10.0.0.2/tcp/30333".to_string()),
		]);

		replace_multi_address_references(&mut def, &addresses);

		assert_eq!(
			def.spec.command,
			Command::Line("connect /ip4/10.0.0.1/tcp/30333 then /ip4/10.0.0.2/tcp/30333".into()),
		);
	}

	#[test]
	fn unknown_node_leaves_the_token_in_place() {
		let mut def = def_with_command(Command::Argv(vec!["{{ZOMBIE:ghost}}".into()]));

		replace_multi_address_references(&mut def, &MultiAddressByNode::new());

		let Command::Argv(cmd) = &def.spec.command else { panic!("expected an argv command") };
		assert_eq!(cmd[0], "{{ZOMBIE:ghost}}");
	}

	#[test]
	fn definition_serializes_with_the_handoff_field_names() {
		let tmp = TempDir::new().unwrap();
		let def = gen_node_def("zbn-1", &validator_spec(), tmp.path()).unwrap();

		let json = serde_json::to_value(&def).unwrap();
		assert!(json["spec"]["cfgPath"].is_string());
		assert!(json["spec"]["dataPath"].is_string());
		assert!(json["metadata"]["labels"]["zombie-role"].is_string());
		assert!(json["spec"]["ports"][0]["containerPort"].is_number());
		assert!(json["spec"]["command"].is_array());

		release(&def);
	}
}
