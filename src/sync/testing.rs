//! In-process fakes for the pipeline's collaborators.

use crate::decoder::fixtures::PropertyStateFixture;
use crate::enricher::{EnrichError, ImageResolver};
use crate::ledger::{
	AccountBatch, AccountSnapshot, AccountSource, LedgerError, RawAccount,
	derive_property_state_pda,
};

use solana_pubkey::Pubkey;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub fn program_id() -> Pubkey {
	Pubkey::new_from_array([7; 32])
}

/// A well-formed property account for `mint_byte`, stored at its derived address.
pub fn property_account(mint_byte: u8) -> RawAccount {
	let mint = Pubkey::new_from_array([mint_byte; 32]);
	RawAccount {
		address: derive_property_state_pda(&mint, &program_id()),
		data: PropertyStateFixture::with_mint(mint).encode(),
	}
}

/// A property-sized account whose name length runs past the end of the buffer.
pub fn malformed_account() -> RawAccount {
	let mut data = PropertyStateFixture::default().encode();
	data[72..76].copy_from_slice(&5_000u32.to_le_bytes());
	RawAccount {
		address: Pubkey::new_from_array([0xee; 32]),
		data,
	}
}

#[derive(Default)]
pub struct FakeSource {
	pub slot: u64,
	pub accounts: Vec<RawAccount>,
	pub unreadable: usize,
	pub fail: bool,
	pub delay: Option<Duration>,
	pub calls: AtomicUsize,
}

impl FakeSource {
	pub fn with_accounts(accounts: Vec<RawAccount>) -> Self {
		Self {
			slot: 100,
			accounts,
			..Default::default()
		}
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}

#[async_trait::async_trait]
impl AccountSource for FakeSource {
	async fn fetch_all(&self, _program_id: &Pubkey) -> Result<AccountBatch, LedgerError> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		if let Some(delay) = self.delay {
			tokio::time::sleep(delay).await;
		}
		if self.fail {
			return Err(LedgerError::HttpStatus(503));
		}
		Ok(AccountBatch {
			slot: self.slot,
			accounts: self.accounts.clone(),
			unreadable: self.unreadable,
		})
	}

	async fn fetch_one(&self, address: &Pubkey) -> Result<AccountSnapshot, LedgerError> {
		self.accounts
			.iter()
			.find(|account| account.address == *address)
			.map(|account| AccountSnapshot {
				slot: self.slot,
				account: account.clone(),
			})
			.ok_or_else(|| LedgerError::AccountNotFound(address.to_string()))
	}
}

/// Resolves known URIs to fixed images and fails everything else.
#[derive(Default)]
pub struct FakeResolver {
	pub images: HashMap<String, String>,
	pub calls: AtomicUsize,
}

impl FakeResolver {
	pub fn resolving(uri: &str, image: &str) -> Self {
		Self {
			images: HashMap::from([(uri.to_string(), image.to_string())]),
			..Default::default()
		}
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}

#[async_trait::async_trait]
impl ImageResolver for FakeResolver {
	async fn resolve_image(&self, metadata_uri: &str) -> Result<String, EnrichError> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		self.images
			.get(metadata_uri)
			.cloned()
			.ok_or(EnrichError::HttpStatus(504))
	}
}
