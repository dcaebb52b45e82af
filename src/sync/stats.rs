//! Per-run statistics for the sync pipeline.

use super::Enrichment;

use serde::Serialize;
use std::time::Duration;

/// Counters collected over one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
	/// Ledger slot the account scan was evaluated at
	pub slot: u64,
	/// Accounts returned by the ledger, including unreadable ones
	pub accounts_fetched: usize,
	pub unreadable: usize,
	pub decoded: usize,
	pub decode_failures: usize,
	pub enrich_attempts: usize,
	pub enrich_failures: usize,
	pub persisted: usize,
	pub persist_failures: usize,
	pub elapsed_ms: u64,
}

impl RunReport {
	pub fn new(slot: u64, readable: usize, unreadable: usize) -> Self {
		Self {
			slot,
			accounts_fetched: readable + unreadable,
			unreadable,
			..Default::default()
		}
	}

	pub fn record_enrichment(&mut self, outcome: Enrichment) {
		match outcome {
			Enrichment::Skipped => {}
			Enrichment::Resolved => self.enrich_attempts += 1,
			Enrichment::Failed => {
				self.enrich_attempts += 1;
				self.enrich_failures += 1;
			}
		}
	}

	pub fn finish(&mut self, elapsed: Duration) {
		self.elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
	}

	/// Whether every fetched account made it into the store.
	pub fn is_clean(&self) -> bool {
		self.persisted == self.accounts_fetched
	}

	/// Get a human-readable summary of the run
	pub fn summary(&self) -> String {
		format!(
			"Sync at slot {}: {} accounts, {} decoded, {} persisted in {}ms{}",
			self.slot,
			self.accounts_fetched,
			self.decoded,
			self.persisted,
			self.elapsed_ms,
			if self.is_clean() {
				String::new()
			} else {
				format!(
					" ({} unreadable, {} decode failures, {} persist failures, \
					 {}/{} enrichments failed)",
					self.unreadable,
					self.decode_failures,
					self.persist_failures,
					self.enrich_failures,
					self.enrich_attempts
				)
			}
		)
	}
}
