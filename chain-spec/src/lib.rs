// Copyright (C) Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later WITH Classpath-exception-2.0

//! Chain-spec mutation helpers for ephemeral test networks.
//!
//! A test network boots from one shared chain-spec JSON document. Before any
//! node starts, the launcher edits that document so the whole fleet agrees on
//! the initial state: which session keys form the authority set, which
//! parachains are registered, which HRMP channels are open from block zero,
//! which bootnodes to dial, plus arbitrary operator overrides of the genesis
//! configuration.
//!
//! Every operation is a full read-modify-write cycle against the file: the
//! document is parsed, edited in memory and rewritten pretty-printed. Nothing
//! is cached between operations and no write happens if the document cannot
//! be parsed, so a failed operation never leaves a half-edited spec behind.
//!
//! Two generations of the runtime section layout are supported; which one a
//! document uses is detected by key presence before any edit.
//!
//! The companion `chain-spec-mutator` binary exposes each operation as a
//! subcommand, see [`ChainSpecMutator`].

use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sp_core::{crypto::Ss58Codec, ecdsa};
use std::{
	collections::HashSet,
	fs,
	path::{Path, PathBuf},
};

const LOG_TARGET: &str = "zombienet::chain-spec";

/// Errors raised while mutating a chain spec.
#[derive(Debug, thiserror::Error)]
pub enum ChainSpecError {
	#[error("failed to read the chain spec at {}: {source}", path.display())]
	Io { path: PathBuf, source: std::io::Error },
	#[error("failed to parse the chain spec at {}: {source}", path.display())]
	Parse { path: PathBuf, source: serde_json::Error },
	#[error("failed to serialize the chain spec for {}: {source}", path.display())]
	Serialize { path: PathBuf, source: serde_json::Error },
	#[error("failed to write the chain spec at {}: {source}", path.display())]
	Write { path: PathBuf, source: std::io::Error },
	#[error("chain spec root is not a JSON object")]
	InvalidDocument,
	#[error("{key} not found in the runtime config")]
	MissingRuntimeKey { key: String },
	#[error("invalid authority key material: {0}")]
	InvalidKeyMaterial(String),
	#[error(transparent)]
	DataFile(#[from] zombienet_support::fs::Error),
}

/// The accounts backing one genesis authority.
///
/// Addresses are treated as opaque strings, with one exception: the BEEFY key
/// is supplied as the hex-encoded compressed ECDSA public key and re-encoded
/// to SS58 here, since it uses a different address encoding than the sr25519
/// and ed25519 session keys.
#[derive(Args, Clone, Debug)]
pub struct AuthorityAccounts {
	/// Address of the sr25519 stash account.
	#[arg(long)]
	pub sr_stash: String,
	/// Address of the sr25519 controller account.
	#[arg(long)]
	pub sr_account: String,
	/// Address of the ed25519 account.
	#[arg(long)]
	pub ed_account: String,
	/// Hex-encoded compressed ECDSA public key (33 bytes).
	#[arg(long)]
	pub ec_public: String,
}

impl AuthorityAccounts {
	/// Build the session-keys entry appended to the authority set.
	fn session_key(&self) -> Result<Value, ChainSpecError> {
		let beefy = ecdsa::Public::from_raw(
			array_bytes::hex2array(&self.ec_public)
				.map_err(|e| ChainSpecError::InvalidKeyMaterial(format!("{e:?}")))?,
		)
		.to_ss58check();

		Ok(json!([
			self.sr_stash,
			self.sr_stash,
			{
				"grandpa": self.ed_account,
				"babe": self.sr_account,
				"im_online": self.sr_account,
				"parachain_validator": self.sr_account,
				"authority_discovery": self.sr_account,
				"para_validator": self.sr_account,
				"para_assignment": self.sr_account,
				"beefy": beefy,
			}
		]))
	}
}

/// One HRMP channel to open at genesis.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HrmpChannelConfig {
	pub sender: u32,
	pub recipient: u32,
	pub max_capacity: u32,
	pub max_message_size: u32,
}

/// Generation of the runtime section layout.
///
/// The field names of the runtime config changed across client releases; both
/// generations are still found in the wild. Which one applies is a pure key
/// lookup done once per loaded document, never guessed per operation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum RuntimeShape {
	Current,
	Legacy,
}

impl RuntimeShape {
	fn detect(runtime: &Value) -> Option<Self> {
		const CURRENT_KEYS: &[&str] = &["session", "paras", "hrmp"];
		const LEGACY_KEYS: &[&str] = &["palletSession", "parachainsParas", "parachainsHrmp"];

		if CURRENT_KEYS.iter().any(|key| runtime.get(key).is_some()) {
			Some(Self::Current)
		} else if LEGACY_KEYS.iter().any(|key| runtime.get(key).is_some()) {
			Some(Self::Legacy)
		} else {
			None
		}
	}

	fn session_key(self) -> &'static str {
		match self {
			Self::Current => "session",
			Self::Legacy => "palletSession",
		}
	}

	fn paras_key(self) -> &'static str {
		match self {
			Self::Current => "paras",
			Self::Legacy => "parachainsParas",
		}
	}

	fn hrmp_key(self) -> &'static str {
		match self {
			Self::Current => "hrmp",
			Self::Legacy => "parachainsHrmp",
		}
	}
}

fn load(path: &Path) -> Result<Value, ChainSpecError> {
	let raw = fs::read(path)
		.map_err(|source| ChainSpecError::Io { path: path.to_path_buf(), source })?;
	serde_json::from_slice(&raw)
		.map_err(|source| ChainSpecError::Parse { path: path.to_path_buf(), source })
}

fn store(path: &Path, doc: &Value) -> Result<(), ChainSpecError> {
	let data = serde_json::to_string_pretty(doc)
		.map_err(|source| ChainSpecError::Serialize { path: path.to_path_buf(), source })?;
	fs::write(path, data)
		.map_err(|source| ChainSpecError::Write { path: path.to_path_buf(), source })
}

/// Locate the runtime config inside the document. Some specs wrap it in an
/// extra `runtime_genesis_config` object.
fn runtime_config_mut(doc: &mut Value) -> Result<&mut Value, ChainSpecError> {
	let runtime = doc
		.get_mut("genesis")
		.and_then(|genesis| genesis.get_mut("runtime"))
		.ok_or_else(|| ChainSpecError::MissingRuntimeKey { key: "genesis.runtime".into() })?;

	if runtime.get("runtime_genesis_config").is_some() {
		return runtime.get_mut("runtime_genesis_config").ok_or_else(|| {
			ChainSpecError::MissingRuntimeKey { key: "runtime_genesis_config".into() }
		})
	}

	Ok(runtime)
}

fn authority_keys_mut(runtime: &mut Value) -> Result<&mut Vec<Value>, ChainSpecError> {
	let shape = RuntimeShape::detect(runtime)
		.ok_or_else(|| ChainSpecError::MissingRuntimeKey { key: "session".into() })?;
	let session = shape.session_key();

	runtime
		.get_mut(session)
		.and_then(|s| s.get_mut("keys"))
		.and_then(Value::as_array_mut)
		.ok_or_else(|| ChainSpecError::MissingRuntimeKey { key: format!("{session}.keys") })
}

fn paras_mut(runtime: &mut Value) -> Result<&mut Vec<Value>, ChainSpecError> {
	let shape = RuntimeShape::detect(runtime)
		.ok_or_else(|| ChainSpecError::MissingRuntimeKey { key: "paras".into() })?;
	let paras = shape.paras_key();

	runtime
		.get_mut(paras)
		.and_then(|p| p.get_mut("paras"))
		.and_then(Value::as_array_mut)
		.ok_or_else(|| ChainSpecError::MissingRuntimeKey { key: format!("{paras}.paras") })
}

fn preopen_channels_mut(runtime: &mut Value) -> Result<&mut Vec<Value>, ChainSpecError> {
	let shape = RuntimeShape::detect(runtime)
		.ok_or_else(|| ChainSpecError::MissingRuntimeKey { key: "hrmp".into() })?;
	let hrmp = shape.hrmp_key();

	runtime
		.get_mut(hrmp)
		.and_then(|h| h.get_mut("preopenHrmpChannels"))
		.and_then(Value::as_array_mut)
		.ok_or_else(|| ChainSpecError::MissingRuntimeKey {
			key: format!("{hrmp}.preopenHrmpChannels"),
		})
}

/// Remove all existing session keys, leaving an empty authority set.
pub fn clear_authorities(spec_path: &Path) -> Result<(), ChainSpecError> {
	let mut doc = load(spec_path)?;
	authority_keys_mut(runtime_config_mut(&mut doc)?)?.clear();
	store(spec_path, &doc)?;

	log::info!(target: LOG_TARGET, "🧹 Starting with a fresh authority set");
	Ok(())
}

/// Append one authority to the session keys.
pub fn add_authority(
	spec_path: &Path,
	name: &str,
	accounts: &AuthorityAccounts,
) -> Result<(), ChainSpecError> {
	let key = accounts.session_key()?;

	let mut doc = load(spec_path)?;
	authority_keys_mut(runtime_config_mut(&mut doc)?)?.push(key);
	store(spec_path, &doc)?;

	log::info!(
		target: LOG_TARGET,
		"👤 Added genesis authority {name} ({stash})",
		stash = accounts.sr_stash,
	);
	Ok(())
}

/// Register a parachain at genesis. The genesis head and validation code are
/// read from data files and embedded verbatim.
pub fn add_parachain(
	spec_path: &Path,
	para_id: u32,
	genesis_head_path: &Path,
	genesis_wasm_path: &Path,
	is_parachain: bool,
) -> Result<(), ChainSpecError> {
	let head = zombienet_support::fs::read_data_file(genesis_head_path)?;
	let wasm = zombienet_support::fs::read_data_file(genesis_wasm_path)?;

	let mut doc = load(spec_path)?;
	paras_mut(runtime_config_mut(&mut doc)?)?.push(json!([para_id, [head, wasm, is_parachain]]));
	store(spec_path, &doc)?;

	log::info!(target: LOG_TARGET, "✓ Added genesis parachain {para_id}");
	Ok(())
}

/// Open HRMP channels at genesis. Each channel is appended and flushed to
/// disk on its own, so the operator sees per-channel confirmations and a
/// failure part-way leaves the already-confirmed channels in place.
pub fn add_hrmp_channels(
	spec_path: &Path,
	channels: &[HrmpChannelConfig],
) -> Result<(), ChainSpecError> {
	log::info!(target: LOG_TARGET, "⛓ Adding genesis HRMP channels");
	let mut doc = load(spec_path)?;

	for channel in channels {
		preopen_channels_mut(runtime_config_mut(&mut doc)?)?.push(json!([
			channel.sender,
			channel.recipient,
			channel.max_capacity,
			channel.max_message_size,
		]));
		store(spec_path, &doc)?;

		log::info!(
			target: LOG_TARGET,
			"✓ Added HRMP channel {} -> {}",
			channel.sender,
			channel.recipient,
		);
	}

	Ok(())
}

/// Replace the top-level bootnode list with the given addresses, collapsing
/// duplicates. An empty input clears the list.
pub fn add_boot_nodes(spec_path: &Path, addresses: &[String]) -> Result<(), ChainSpecError> {
	let mut doc = load(spec_path)?;

	let mut seen = HashSet::new();
	let unique: Vec<Value> = addresses
		.iter()
		.filter(|address| seen.insert(address.as_str()))
		.map(|address| Value::String(address.clone()))
		.collect();

	doc.as_object_mut()
		.ok_or(ChainSpecError::InvalidDocument)?
		.insert("bootNodes".into(), Value::Array(unique));
	store(spec_path, &doc)?;

	if addresses.is_empty() {
		log::info!(target: LOG_TARGET, "⚙ Cleared boot nodes");
	} else {
		log::info!(target: LOG_TARGET, "⚙ Added boot nodes: {addresses:?}");
	}
	Ok(())
}

/// Apply operator overrides to the genesis configuration.
///
/// The merge is directional: only keys that already exist in the document are
/// touched. Nested objects are walked one level at a time, scalars and arrays
/// are overwritten outright, and keys absent from the document are skipped
/// with a warning. New keys are never introduced, since the client binary
/// parses the genesis schema strictly.
pub fn change_genesis_config(spec_path: &Path, updates: &Value) -> Result<(), ChainSpecError> {
	let mut doc = load(spec_path)?;
	log::info!(
		target: LOG_TARGET,
		"⚙ Updating chain genesis configuration (path: {})",
		spec_path.display(),
	);

	let has_genesis = match doc.get_mut("genesis") {
		Some(genesis) => {
			find_and_replace_config(updates, genesis);
			true
		},
		None => false,
	};
	if has_genesis {
		store(spec_path, &doc)?;
	}

	Ok(())
}

fn find_and_replace_config(updates: &Value, target: &mut Value) {
	let (Some(updates), Some(target)) = (updates.as_object(), target.as_object_mut()) else {
		return
	};

	for (key, update) in updates {
		match target.get_mut(key) {
			Some(existing) =>
				if update.is_object() {
					find_and_replace_config(update, existing);
				} else {
					*existing = update.clone();
					log::info!(
						target: LOG_TARGET,
						"✓ Updated genesis configuration [ key: {key} ]",
					);
				},
			None => log::warn!(
				target: LOG_TARGET,
				"⚠ Bad genesis configuration [ {key}: {update} ]",
			),
		}
	}
}

/// A utility to mutate a chain spec in place, one edit per invocation.
#[derive(Debug, Parser)]
#[command(rename_all = "kebab-case")]
pub struct ChainSpecMutator {
	#[command(subcommand)]
	pub command: ChainSpecMutatorCmd,
	/// The path to the chain spec to mutate.
	#[arg(long, short, default_value = "./chain_spec.json")]
	pub chain_spec_path: PathBuf,
}

#[derive(Debug, Subcommand)]
#[command(rename_all = "kebab-case")]
pub enum ChainSpecMutatorCmd {
	ClearAuthorities(ClearAuthoritiesCmd),
	AddAuthority(AddAuthorityCmd),
	AddParachain(AddParachainCmd),
	AddHrmpChannels(AddHrmpChannelsCmd),
	ReplaceBootNodes(ReplaceBootNodesCmd),
	ChangeGenesisConfig(ChangeGenesisConfigCmd),
}

/// Remove all session keys, leaving an empty authority set.
#[derive(Debug, Parser)]
pub struct ClearAuthoritiesCmd {}

/// Append one authority to the session keys.
#[derive(Debug, Parser)]
pub struct AddAuthorityCmd {
	/// Human-readable name of the authority, used for reporting only.
	pub name: String,
	#[command(flatten)]
	pub accounts: AuthorityAccounts,
}

/// Register a parachain at genesis.
#[derive(Debug, Parser)]
pub struct AddParachainCmd {
	/// The parachain id.
	pub para_id: u32,
	/// Path to the exported genesis head data file.
	#[arg(long)]
	pub genesis_head_path: PathBuf,
	/// Path to the exported genesis wasm file.
	#[arg(long)]
	pub genesis_wasm_path: PathBuf,
	/// Onboard as a parathread instead of a parachain.
	#[arg(long)]
	pub parathread: bool,
}

/// Open HRMP channels at genesis, read from a JSON file holding an array of
/// `{ "sender", "recipient", "maxCapacity", "maxMessageSize" }` objects.
#[derive(Debug, Parser)]
pub struct AddHrmpChannelsCmd {
	/// Path to the channels JSON file.
	pub channels_path: PathBuf,
}

/// Replace the bootnode list. Passing no addresses clears it.
#[derive(Debug, Parser)]
pub struct ReplaceBootNodesCmd {
	/// Bootnode multiaddresses.
	pub addresses: Vec<String>,
}

/// Apply overrides from a JSON patch file to the genesis configuration.
#[derive(Debug, Parser)]
pub struct ChangeGenesisConfigCmd {
	/// Path to the patch JSON file.
	pub patch_path: PathBuf,
}

/// Read and parse a JSON input file (channel list, genesis patch).
pub fn read_json_input<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ChainSpecError> {
	let raw = fs::read(path)
		.map_err(|source| ChainSpecError::Io { path: path.to_path_buf(), source })?;
	serde_json::from_slice(&raw)
		.map_err(|source| ChainSpecError::Parse { path: path.to_path_buf(), source })
}
