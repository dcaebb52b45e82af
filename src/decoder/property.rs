use super::{ByteCursor, DecodeError};

use serde::{Deserialize, Serialize};
use solana_pubkey::Pubkey;
use std::fmt;
use std::str::FromStr;

/// Exact byte size of a property state account, including the trailing bump byte.
pub const PROPERTY_STATE_SIZE: usize = 996;

/// Token decimals reported for every property. The real value lives on the mint account,
/// which is not fetched.
pub const DEFAULT_DECIMALS: u8 = 6;

/// Whether minting is enabled for a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyStatus {
	Active,
	Paused,
}

impl PropertyStatus {
	pub fn from_active_flag(is_active: bool) -> Self {
		if is_active { Self::Active } else { Self::Paused }
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Active => "active",
			Self::Paused => "paused",
		}
	}
}

impl fmt::Display for PropertyStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for PropertyStatus {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"active" => Ok(Self::Active),
			"paused" => Ok(Self::Paused),
			other => Err(format!("unknown property status `{other}`")),
		}
	}
}

/// Raw contents of a property state account, in layout order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyState {
	pub discriminator: [u8; 8],
	pub authority: Pubkey,
	pub mint: Pubkey,
	pub name: String,
	pub symbol: String,
	pub total_supply: u64,
	pub circulating_supply: u64,
	/// Street address of the property.
	pub property_address: String,
	pub property_type: String,
	pub total_value_usd: u64,
	pub rental_yield_bps: u16,
	pub metadata_uri: String,
	pub is_active: bool,
	pub created_at: i64,
	pub updated_at: i64,
}

/// Decoder for property state accounts.
///
/// With no expected discriminator configured the leading 8 bytes are skipped unchecked and any
/// account of the right size is assumed to be a property.
#[derive(Debug, Clone, Default)]
pub struct PropertyStateDecoder {
	expected_discriminator: Option<[u8; 8]>,
}

impl PropertyStateDecoder {
	pub fn new() -> Self {
		Self::default()
	}

	/// Reject accounts whose discriminator differs from `discriminator`.
	pub fn with_expected_discriminator(mut self, discriminator: [u8; 8]) -> Self {
		self.expected_discriminator = Some(discriminator);
		self
	}

	/// Decode a property state buffer.
	///
	/// # Errors
	/// `InvalidSize` when the buffer is shorter than [`PROPERTY_STATE_SIZE`], `FieldOutOfBounds`
	/// when a declared length runs past the end, `DiscriminatorMismatch` when a discriminator
	/// check is configured and fails.
	pub fn decode(&self, data: &[u8]) -> Result<PropertyState, DecodeError> {
		if data.len() < PROPERTY_STATE_SIZE {
			return Err(DecodeError::InvalidSize {
				expected: PROPERTY_STATE_SIZE,
				actual: data.len(),
			});
		}

		let mut cursor = ByteCursor::new(data);

		let discriminator = cursor.read_array::<8>("discriminator")?;
		if let Some(expected) = self.expected_discriminator {
			if expected != discriminator {
				return Err(DecodeError::DiscriminatorMismatch {
					expected: hex::encode(expected),
					found: hex::encode(discriminator),
				});
			}
		}

		let authority = cursor.read_pubkey("authority")?;
		let mint = cursor.read_pubkey("mint")?;
		let name = cursor.read_string("property_name")?;
		let symbol = cursor.read_string("property_symbol")?;
		let total_supply = cursor.read_u64("total_supply")?;
		let circulating_supply = cursor.read_u64("circulating_supply")?;
		let property_address = cursor.read_string("property_address")?;
		let property_type = cursor.read_string("property_type")?;
		let total_value_usd = cursor.read_u64("total_value_usd")?;
		let rental_yield_bps = cursor.read_u16("rental_yield_bps")?;
		let metadata_uri = cursor.read_string("metadata_uri")?;
		let is_active = cursor.read_flag("is_active")?;
		let created_at = cursor.read_i64("created_at")?;
		let updated_at = cursor.read_i64("updated_at")?;
		// trailing bump byte is not read

		Ok(PropertyState {
			discriminator,
			authority,
			mint,
			name,
			symbol,
			total_supply,
			circulating_supply,
			property_address,
			property_type,
			total_value_usd,
			rental_yield_bps,
			metadata_uri,
			is_active,
			created_at,
			updated_at,
		})
	}
}

/// A property as mirrored from the ledger, ready for enrichment and reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedRecord {
	pub mint: String,
	pub property_state_pda: String,
	pub name: String,
	pub symbol: String,
	pub authority: String,
	pub status: PropertyStatus,
	pub total_supply: u64,
	pub circulating_supply: u64,
	pub decimals: u8,
	pub property_type: String,
	pub location: String,
	pub total_value_usd: u64,
	pub annual_yield: u32,
	pub metadata_uri: String,
	/// Filled in by the metadata enricher; empty until then.
	pub image: String,
	pub current_epoch: u64,
	pub last_indexed_slot: u64,
}

impl DecodedRecord {
	/// Map a decoded account at `address`, observed at `slot`, onto the domain record.
	pub fn from_state(address: &Pubkey, state: PropertyState, slot: u64) -> Self {
		Self {
			mint: state.mint.to_string(),
			property_state_pda: address.to_string(),
			name: state.name,
			symbol: state.symbol,
			authority: state.authority.to_string(),
			status: PropertyStatus::from_active_flag(state.is_active),
			total_supply: state.total_supply,
			circulating_supply: state.circulating_supply,
			decimals: DEFAULT_DECIMALS,
			property_type: state.property_type,
			location: state.property_address,
			total_value_usd: state.total_value_usd,
			annual_yield: u32::from(state.rental_yield_bps),
			metadata_uri: state.metadata_uri,
			image: String::new(),
			current_epoch: 0,
			last_indexed_slot: slot,
		}
	}
}
