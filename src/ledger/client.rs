//!
//! JSON-RPC client for the Solana ledger.
//!
//! Scans a program for property state accounts and fetches single accounts by address. All
//! queries use `confirmed` commitment and base64 account encoding, and report the slot the node
//! evaluated them at.

use super::types::*;
use super::{AccountSource, PROPERTY_SEED};
use crate::decoder::PROPERTY_STATE_SIZE;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::json;
use solana_pubkey::Pubkey;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, warn};

const COMMITMENT: &str = "confirmed";

/// Solana JSON-RPC client
#[derive(Clone)]
pub struct SolanaRpcClient {
	/// The underlying HTTP client for RPC calls.
	http_client: Client,
	/// JSON-RPC endpoint.
	rpc_url: String,
}

impl SolanaRpcClient {
	/// Create a new RPC client.
	///
	/// # Arguments
	/// * `rpc_url` - The HTTP JSON-RPC endpoint.
	pub fn new(rpc_url: String) -> Result<Self, LedgerError> {
		let http_client = Client::builder().timeout(Duration::from_secs(30)).build()?;

		Ok(Self {
			http_client,
			rpc_url,
		})
	}

	/// Execute a JSON-RPC call.
	///
	/// # Arguments
	/// * `method` - The RPC method name.
	/// * `params` - Positional parameters.
	///
	/// # Returns
	/// The deserialized `result` member, or a `LedgerError` if the transport or the node fails.
	pub async fn call<T: DeserializeOwned>(
		&self,
		method: &str,
		params: serde_json::Value,
	) -> Result<T, LedgerError> {
		let request_body = json!({
			"jsonrpc": "2.0",
			"id": 1,
			"method": method,
			"params": params,
		});

		let response = self
			.http_client
			.post(&self.rpc_url)
			.header("Content-Type", "application/json")
			.json(&request_body)
			.send()
			.await?;

		if !response.status().is_success() {
			return Err(LedgerError::HttpStatus(response.status().as_u16()));
		}

		let body = response.bytes().await?;
		let parsed: RpcResponse<T> = serde_json::from_slice(&body)?;

		if let Some(error) = parsed.error {
			return Err(LedgerError::RpcError {
				code: error.code,
				message: error.message,
			});
		}

		parsed.result.ok_or(LedgerError::NoData)
	}

	fn decode_data(data: &(String, String)) -> Result<Vec<u8>, LedgerError> {
		let (payload, encoding) = data;
		if encoding != "base64" {
			return Err(LedgerError::EncodingError(format!(
				"unexpected encoding `{encoding}`"
			)));
		}
		BASE64
			.decode(payload)
			.map_err(|e| LedgerError::EncodingError(e.to_string()))
	}

	fn raw_account(keyed: &KeyedAccount) -> Result<RawAccount, LedgerError> {
		let address = Pubkey::from_str(&keyed.pubkey)
			.map_err(|e| LedgerError::InvalidAddress(format!("{}: {e}", keyed.pubkey)))?;
		let data = Self::decode_data(&keyed.account.data)?;
		Ok(RawAccount { address, data })
	}
}

#[async_trait::async_trait]
impl AccountSource for SolanaRpcClient {
	async fn fetch_all(&self, program_id: &Pubkey) -> Result<AccountBatch, LedgerError> {
		let params = json!([
			program_id.to_string(),
			{
				"encoding": "base64",
				"commitment": COMMITMENT,
				"withContext": true,
				"filters": [{ "dataSize": PROPERTY_STATE_SIZE }],
			}
		]);

		let response: WithContext<Vec<KeyedAccount>> =
			self.call("getProgramAccounts", params).await?;

		debug!(
			"getProgramAccounts returned {} accounts at slot {}",
			response.value.len(),
			response.context.slot
		);

		let mut batch = AccountBatch {
			slot: response.context.slot,
			accounts: Vec::with_capacity(response.value.len()),
			unreadable: 0,
		};
		for keyed in &response.value {
			match Self::raw_account(keyed) {
				Ok(account) => batch.accounts.push(account),
				Err(e) => {
					warn!(address = %keyed.pubkey, "Skipping unreadable account: {}", e);
					batch.unreadable += 1;
				}
			}
		}

		Ok(batch)
	}

	async fn fetch_one(&self, address: &Pubkey) -> Result<AccountSnapshot, LedgerError> {
		let params = json!([
			address.to_string(),
			{ "encoding": "base64", "commitment": COMMITMENT }
		]);

		let response: WithContext<Option<UiAccount>> = self.call("getAccountInfo", params).await?;
		let account = response
			.value
			.ok_or_else(|| LedgerError::AccountNotFound(address.to_string()))?;

		Ok(AccountSnapshot {
			slot: response.context.slot,
			account: RawAccount {
				address: *address,
				data: Self::decode_data(&account.data)?,
			},
		})
	}
}

/// Derive the property state address for `mint` under `program_id`.
///
/// Seeds are `"property"` followed by the mint bytes, matching the on-chain program.
pub fn derive_property_state_pda(mint: &Pubkey, program_id: &Pubkey) -> Pubkey {
	Pubkey::find_program_address(&[PROPERTY_SEED, mint.as_ref()], program_id).0
}
