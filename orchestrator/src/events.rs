// Copyright (C) Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later WITH Classpath-exception-2.0

//! Waiting for an on-chain event matching a pattern.
//!
//! The subscription transport is a collaborator: this module consumes any
//! stream of event batches and only decides when the wait is over. Exactly
//! one of match or timeout resolves the wait, never both.

use crate::LOG_TARGET;
use futures::{Stream, StreamExt};
use regex::Regex;
use std::{fmt, time::Duration};

/// One decoded field of an event, as `(type name, rendered value)`.
#[derive(Clone, Debug)]
pub struct EventField {
	pub type_name: String,
	pub value: String,
}

/// One event record delivered by the subscription.
#[derive(Clone, Debug)]
pub struct EventRecord {
	pub section: String,
	pub method: String,
	pub phase: String,
	pub docs: String,
	pub fields: Vec<EventField>,
}

impl fmt::Display for EventRecord {
	/// The canonical text form patterns are matched against: origin section,
	/// method and phase on the first line, then the documentation text and
	/// each field's type name joined with its value.
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		writeln!(f, "{} : {} :: phase={}", self.section, self.method, self.phase)?;
		write!(f, "{}", self.docs)?;
		for field in &self.fields {
			write!(f, "{};{}", field.type_name, field.value)?;
		}
		Ok(())
	}
}

/// Wait until an event matching `pattern` is delivered, or `timeout` passes.
///
/// Returns `true` on the first matching record, `false` once the timeout
/// fires without a match. A subscription that ends early does not cut the
/// wait short: the remaining time is still awaited, so a `false` result is
/// never reported before the timeout. Tearing the subscription down is left
/// to the caller.
pub async fn find_pattern_in_event_subscription<S>(
	mut events: S,
	pattern: &Regex,
	timeout: Duration,
) -> bool
where
	S: Stream<Item = Vec<EventRecord>> + Unpin,
{
	let deadline = tokio::time::sleep(timeout);
	tokio::pin!(deadline);

	loop {
		tokio::select! {
			_ = &mut deadline => {
				log::debug!(target: LOG_TARGET, "timed out waiting for the event pattern ({timeout:?})");
				return false
			},
			batch = events.next() => match batch {
				Some(records) => {
					if let Some(record) =
						records.iter().find(|record| pattern.is_match(&record.to_string()))
					{
						log::debug!(target: LOG_TARGET, "{record}");
						return true
					}
				},
				// Subscription ended without a match; the timeout still
				// bounds the wait.
				None => {
					deadline.as_mut().await;
					return false
				},
			},
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use futures::stream;
	use std::time::Instant;

	fn record(section: &str, method: &str) -> EventRecord {
		EventRecord {
			section: section.into(),
			method: method.into(),
			phase: "ApplyExtrinsic(1)".into(),
			docs: "An event emitted by the test.".into(),
			fields: vec![EventField { type_name: "ParaId".into(), value: "2000".into() }],
		}
	}

	#[test]
	fn rendering_includes_section_method_phase_and_fields() {
		let rendered = record("paras", "CurrentCodeUpdated").to_string();
		assert!(rendered.starts_with("paras : CurrentCodeUpdated :: phase=ApplyExtrinsic(1)\n"));
		assert!(rendered.contains("An event emitted by the test."));
		assert!(rendered.ends_with("ParaId;2000"));
	}

	#[tokio::test]
	async fn pattern_in_a_later_batch_resolves_before_the_timeout() {
		let batches = stream::iter(vec![
			vec![record("system", "ExtrinsicSuccess")],
			vec![record("paras", "CurrentCodeUpdated")],
			vec![record("system", "ExtrinsicSuccess")],
		]);
		let pattern = Regex::new("CurrentCodeUpdated").unwrap();

		let started = Instant::now();
		let found =
			find_pattern_in_event_subscription(batches, &pattern, Duration::from_secs(5)).await;

		assert!(found);
		assert!(started.elapsed() < Duration::from_secs(5));
	}

	#[tokio::test]
	async fn no_match_resolves_false_at_the_timeout_not_before() {
		let (tx, rx) = futures::channel::mpsc::unbounded();
		tokio::spawn(async move {
			for _ in 0..3 {
				tokio::time::sleep(Duration::from_millis(20)).await;
				let _ = tx.unbounded_send(vec![record("system", "ExtrinsicSuccess")]);
			}
			// Keep the subscription open past the timeout.
			tokio::time::sleep(Duration::from_secs(5)).await;
			drop(tx);
		});
		let pattern = Regex::new("NeverEmitted").unwrap();
		let timeout = Duration::from_millis(250);

		let started = Instant::now();
		let found = find_pattern_in_event_subscription(rx, &pattern, timeout).await;

		assert!(!found);
		assert!(started.elapsed() >= timeout);
	}

	#[tokio::test]
	async fn early_stream_end_still_waits_for_the_timeout() {
		let batches = stream::iter(vec![vec![record("system", "ExtrinsicSuccess")]]);
		let pattern = Regex::new("NeverEmitted").unwrap();
		let timeout = Duration::from_millis(250);

		let started = Instant::now();
		let found = find_pattern_in_event_subscription(batches, &pattern, timeout).await;

		assert!(!found);
		assert!(started.elapsed() >= timeout);
	}

	#[tokio::test]
	async fn matching_pattern_is_tested_against_the_rendered_form() {
		let batches = stream::iter(vec![vec![record("paras", "CurrentCodeUpdated")]]);
		// Matches across the rendered record, not a single field.
		let pattern = Regex::new(r"paras : CurrentCodeUpdated[\s\S]*ParaId;2000").unwrap();

		assert!(find_pattern_in_event_subscription(batches, &pattern, Duration::from_secs(5)).await);
	}
}
