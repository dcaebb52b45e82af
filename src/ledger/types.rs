//! Types for Solana JSON-RPC account queries

use serde::Deserialize;
use solana_pubkey::Pubkey;

/// An account as returned by the ledger, before decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAccount {
    /// Address of the account.
    pub address: Pubkey,
    /// Raw account data.
    pub data: Vec<u8>,
}

/// Result of a program-wide account scan.
#[derive(Debug, Clone, Default)]
pub struct AccountBatch {
    /// Slot the RPC node evaluated the query at.
    pub slot: u64,
    pub accounts: Vec<RawAccount>,
    /// Accounts the node returned whose address or data could not be read.
    pub unreadable: usize,
}

/// A single account together with the slot it was observed at.
#[derive(Debug, Clone)]
pub struct AccountSnapshot {
    pub slot: u64,
    pub account: RawAccount,
}

/// JSON-RPC response envelope.
#[derive(Debug, Deserialize)]
pub struct RpcResponse<T> {
    pub result: Option<T>,
    pub error: Option<RpcErrorObject>,
}

/// JSON-RPC error object.
#[derive(Debug, Deserialize)]
pub struct RpcErrorObject {
    pub code: i64,
    pub message: String,
}

/// Response value wrapped with the slot it was evaluated at (`withContext: true`).
#[derive(Debug, Deserialize)]
pub struct WithContext<T> {
    pub context: RpcContext,
    pub value: T,
}

#[derive(Debug, Deserialize)]
pub struct RpcContext {
    pub slot: u64,
}

/// Element of a `getProgramAccounts` result.
#[derive(Debug, Deserialize)]
pub struct KeyedAccount {
    pub pubkey: String,
    pub account: UiAccount,
}

/// Account body as encoded by the RPC node.
#[derive(Debug, Deserialize)]
pub struct UiAccount {
    /// `[payload, encoding]`
    pub data: (String, String),
}

/// Error types for ledger RPC operations
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("RPC error {code}: {message}")]
    RpcError { code: i64, message: String },

    #[error("HTTP status {0}")]
    HttpStatus(u16),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("No data returned")]
    NoData,

    #[error("Account data encoding error: {0}")]
    EncodingError(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Account not found: {0}")]
    AccountNotFound(String),
}

impl LedgerError {
    /// Single-account lookups that found nothing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, LedgerError::AccountNotFound(_))
    }
}
