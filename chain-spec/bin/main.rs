// Copyright (C) Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later WITH Classpath-exception-2.0

//! Command line front-end for the chain-spec mutation helpers. One genesis
//! edit per invocation, applied in place to the given chain spec file.

use clap::Parser;
use serde_json::Value;
use zombienet_chain_spec::{
	add_authority, add_boot_nodes, add_hrmp_channels, add_parachain, change_genesis_config,
	clear_authorities, read_json_input, ChainSpecError, ChainSpecMutator, ChainSpecMutatorCmd,
	HrmpChannelConfig,
};

fn main() {
	if let Err(e) = inner_main() {
		eprintln!("{e}");
		std::process::exit(1);
	}
}

fn inner_main() -> Result<(), ChainSpecError> {
	env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

	let cli = ChainSpecMutator::parse();
	let spec_path = cli.chain_spec_path.as_path();

	match cli.command {
		ChainSpecMutatorCmd::ClearAuthorities(_) => clear_authorities(spec_path),
		ChainSpecMutatorCmd::AddAuthority(cmd) =>
			add_authority(spec_path, &cmd.name, &cmd.accounts),
		ChainSpecMutatorCmd::AddParachain(cmd) => add_parachain(
			spec_path,
			cmd.para_id,
			&cmd.genesis_head_path,
			&cmd.genesis_wasm_path,
			!cmd.parathread,
		),
		ChainSpecMutatorCmd::AddHrmpChannels(cmd) => {
			let channels: Vec<HrmpChannelConfig> = read_json_input(&cmd.channels_path)?;
			add_hrmp_channels(spec_path, &channels)
		},
		ChainSpecMutatorCmd::ReplaceBootNodes(cmd) => add_boot_nodes(spec_path, &cmd.addresses),
		ChainSpecMutatorCmd::ChangeGenesisConfig(cmd) => {
			let updates: Value = read_json_input(&cmd.patch_path)?;
			change_genesis_config(spec_path, &updates)
		},
	}
}
