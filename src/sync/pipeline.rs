//! The fetch, decode, enrich and reconcile pipeline.
//!
//! A run scans the program's property accounts once and then handles each account on its own:
//! accounts that fail to decode or persist are logged and skipped, metadata lookups are
//! best-effort, and only a failed scan aborts the run.

use super::{Enrichment, RunAdmission, RunReport, SyncError};
use crate::decoder::{DecodedRecord, PropertyStateDecoder};
use crate::enricher::ImageResolver;
use crate::ledger::{AccountSource, RawAccount, derive_property_state_pda};
use crate::store::{PersistedRecord, Reconciler};

use solana_pubkey::Pubkey;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Semaphore, SemaphorePermit};
use tracing::{debug, error, info, warn};

pub struct SyncPipeline {
	source: Arc<dyn AccountSource>,
	resolver: Arc<dyn ImageResolver>,
	reconciler: Reconciler,
	program_id: Pubkey,
	decoder: PropertyStateDecoder,
	admission: RunAdmission,
	run_gate: Semaphore,
}

impl SyncPipeline {
	/// Create a pipeline for the accounts of `program_id`.
	///
	/// # Arguments
	/// * `source` - Ledger the accounts are read from.
	/// * `resolver` - Metadata lookup used to fill in images.
	/// * `reconciler` - Destination of decoded records.
	/// * `program_id` - Owner of the property accounts.
	pub fn new(
		source: Arc<dyn AccountSource>,
		resolver: Arc<dyn ImageResolver>,
		reconciler: Reconciler,
		program_id: Pubkey,
	) -> Self {
		Self {
			source,
			resolver,
			reconciler,
			program_id,
			decoder: PropertyStateDecoder::new(),
			admission: RunAdmission::default(),
			run_gate: Semaphore::new(1),
		}
	}

	pub fn with_decoder(mut self, decoder: PropertyStateDecoder) -> Self {
		self.decoder = decoder;
		self
	}

	pub fn with_admission(mut self, admission: RunAdmission) -> Self {
		self.admission = admission;
		self
	}

	fn admit(&self) -> Result<Option<SemaphorePermit<'_>>, SyncError> {
		match self.admission {
			RunAdmission::Concurrent => Ok(None),
			RunAdmission::Exclusive => self
				.run_gate
				.try_acquire()
				.map(Some)
				.map_err(|_| SyncError::RunInProgress),
		}
	}

	/// Run the pipeline once over every property account of the program.
	///
	/// # Returns
	/// Counters for the run. Fails only when the account scan fails, or with `RunInProgress`
	/// under exclusive admission.
	pub async fn run(&self) -> Result<RunReport, SyncError> {
		let _permit = self.admit()?;
		let started = Instant::now();

		let batch = self.source.fetch_all(&self.program_id).await?;
		info!(
			"Fetched {} property accounts ({} unreadable) at slot {}",
			batch.accounts.len(),
			batch.unreadable,
			batch.slot
		);

		let mut report = RunReport::new(batch.slot, batch.accounts.len(), batch.unreadable);
		for account in &batch.accounts {
			let mut record = match self.decode(account, batch.slot) {
				Ok(record) => record,
				Err(e) => {
					warn!(address = %account.address, "Skipping undecodable account: {}", e);
					report.decode_failures += 1;
					continue;
				}
			};
			report.decoded += 1;

			report.record_enrichment(self.enrich(&mut record).await);

			match self.reconciler.upsert(&record).await {
				Ok(_) => report.persisted += 1,
				Err(e) => {
					error!(mint = %record.mint, "Failed to persist property: {}", e);
					report.persist_failures += 1;
				}
			}
		}

		report.finish(started.elapsed());
		info!("{}", report.summary());
		Ok(report)
	}

	/// Re-index the property of a single mint.
	///
	/// The property state address is derived from the mint, fetched, decoded, enriched and
	/// reconciled. Unlike a full run, every failure is returned to the caller.
	pub async fn refresh_mint(&self, mint: &Pubkey) -> Result<PersistedRecord, SyncError> {
		let address = derive_property_state_pda(mint, &self.program_id);
		debug!("Refreshing mint {} at {}", mint, address);

		let snapshot = self.source.fetch_one(&address).await?;
		let mut record = self.decode(&snapshot.account, snapshot.slot)?;
		self.enrich(&mut record).await;
		Ok(self.reconciler.upsert(&record).await?)
	}

	fn decode(&self, account: &RawAccount, slot: u64) -> Result<DecodedRecord, SyncError> {
		let state = self.decoder.decode(&account.data)?;
		debug!(
			address = %account.address,
			discriminator = %hex::encode(state.discriminator),
			created_at = state.created_at,
			updated_at = state.updated_at,
			"Decoded property {}",
			state.name
		);
		Ok(DecodedRecord::from_state(&account.address, state, slot))
	}

	/// Resolve the record's image from its metadata URI.
	///
	/// A failed lookup leaves `record.image` unchanged, which for a freshly decoded record is
	/// empty.
	async fn enrich(&self, record: &mut DecodedRecord) -> Enrichment {
		if record.metadata_uri.is_empty() {
			return Enrichment::Skipped;
		}

		match self.resolver.resolve_image(&record.metadata_uri).await {
			Ok(image) => {
				record.image = image;
				Enrichment::Resolved
			}
			Err(e) => {
				warn!(mint = %record.mint, "Metadata enrichment failed: {}", e);
				Enrichment::Failed
			}
		}
	}
}
