// Copyright (C) Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later WITH Classpath-exception-2.0

//! Leaf utilities shared by the test-network launcher crates: reading
//! on-disk data blobs and probing the host for free ports.

pub mod fs;
pub mod net;
