// Copyright (C) Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later WITH Classpath-exception-2.0

//! Well-known container-side ports and defaults. Only the host-side port of
//! an allocation varies, the container side is fixed per service role.

pub const PROMETHEUS_PORT: u16 = 9615;
pub const RPC_HTTP_PORT: u16 = 9933;
pub const RPC_WS_PORT: u16 = 9944;
pub const P2P_PORT: u16 = 30333;

/// Binary launched when a node spec does not name one.
pub const DEFAULT_COMMAND: &str = "polkadot";
