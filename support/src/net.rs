// Copyright (C) Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later WITH Classpath-exception-2.0

//! Host port probing.
//!
//! Ports handed out here are reserved process-wide until released, so that
//! concurrent allocations for different nodes never share a port. Freeness is
//! verified by transiently binding a socket; the window between the probe and
//! the eventual real bind remains, callers retry at launch time if they lose
//! that race.

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use rand::Rng;
use std::{
	collections::HashSet,
	net::{Ipv4Addr, TcpListener},
	ops::Range,
};

const PORT_RANGE: Range<u16> = 20_000..65_000;
const PROBE_ATTEMPTS: usize = 10;

static RESERVED_PORTS: Lazy<Mutex<HashSet<u16>>> = Lazy::new(|| Mutex::new(HashSet::new()));

/// Network helper errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("no free host port found after {attempts} attempts")]
	NoFreePorts { attempts: usize },
}

/// Pick a host port that is free at call time and not already handed out by
/// this process. Candidates that fail the bind probe are skipped and a new
/// one is drawn, up to a bounded number of attempts.
pub fn random_free_port() -> Result<u16, Error> {
	let mut rng = rand::thread_rng();
	let mut reserved = RESERVED_PORTS.lock();

	for _ in 0..PROBE_ATTEMPTS {
		let candidate = rng.gen_range(PORT_RANGE);
		if reserved.contains(&candidate) {
			continue
		}
		// Transiently bind to prove the port is free, then release it again.
		if TcpListener::bind((Ipv4Addr::LOCALHOST, candidate)).is_ok() {
			reserved.insert(candidate);
			return Ok(candidate)
		}
	}

	Err(Error::NoFreePorts { attempts: PROBE_ATTEMPTS })
}

/// Return a previously handed out port to the pool.
pub fn release_port(port: u16) {
	RESERVED_PORTS.lock().remove(&port);
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn ports_are_not_handed_out_twice() {
		let first = random_free_port().unwrap();
		let second = random_free_port().unwrap();
		assert_ne!(first, second);

		release_port(first);
		release_port(second);
	}

	#[test]
	fn released_ports_return_to_the_pool() {
		let port = random_free_port().unwrap();
		release_port(port);
		assert!(!RESERVED_PORTS.lock().contains(&port));
	}

	#[test]
	fn handed_out_ports_are_bindable() {
		let port = random_free_port().unwrap();
		assert!(TcpListener::bind((Ipv4Addr::LOCALHOST, port)).is_ok());
		release_port(port);
	}
}
