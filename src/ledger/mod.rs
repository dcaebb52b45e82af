//! Ledger integration module for the property program
//!
//! This module provides the client and types for reading program accounts from a Solana RPC
//! node, plus the address derivation the on-chain program uses for property state accounts.

/// JSON-RPC client for the Solana ledger
mod client;
/// Type definitions for ledger data structures
mod types;

pub use client::{SolanaRpcClient, derive_property_state_pda};
pub use types::*;

use solana_pubkey::Pubkey;

/// Seed prefix of property state addresses.
pub const PROPERTY_SEED: &[u8] = b"property";

/// Source of raw program accounts.
#[async_trait::async_trait]
pub trait AccountSource: Send + Sync {
	/// Fetch every property-sized account owned by `program_id`.
	///
	/// The call is all-or-nothing: a transport or RPC failure yields no accounts at all.
	async fn fetch_all(&self, program_id: &Pubkey) -> Result<AccountBatch, LedgerError>;

	/// Fetch a single account, failing with `AccountNotFound` when it does not exist.
	async fn fetch_one(&self, address: &Pubkey) -> Result<AccountSnapshot, LedgerError>;
}
