//! Test-only builder for property state account buffers.

use super::PROPERTY_STATE_SIZE;
use solana_pubkey::Pubkey;

#[derive(Debug, Clone)]
pub struct PropertyStateFixture {
	pub discriminator: [u8; 8],
	pub authority: Pubkey,
	pub mint: Pubkey,
	pub name: String,
	pub symbol: String,
	pub total_supply: u64,
	pub circulating_supply: u64,
	pub property_address: String,
	pub property_type: String,
	pub total_value_usd: u64,
	pub rental_yield_bps: u16,
	pub metadata_uri: String,
	pub is_active: u8,
	pub created_at: i64,
	pub updated_at: i64,
}

impl Default for PropertyStateFixture {
	fn default() -> Self {
		Self {
			discriminator: [0xde; 8],
			authority: Pubkey::new_from_array([1; 32]),
			mint: Pubkey::new_from_array([2; 32]),
			name: "Edificio Santos Dumont".to_string(),
			symbol: "EDSANTO".to_string(),
			total_supply: 1_000_000,
			circulating_supply: 250_000,
			property_address: "Av. Paulista, 1000, Sao Paulo".to_string(),
			property_type: "Commercial".to_string(),
			total_value_usd: 100_000_000,
			rental_yield_bps: 500,
			metadata_uri: "ipfs://Qm123".to_string(),
			is_active: 1,
			created_at: 1_700_000_000,
			updated_at: 1_700_000_500,
		}
	}
}

impl PropertyStateFixture {
	pub fn with_mint(mint: Pubkey) -> Self {
		Self {
			mint,
			..Default::default()
		}
	}

	/// Offset of the metadata uri length prefix.
	pub fn metadata_uri_offset(&self) -> usize {
		8 + 32 + 32 + 4 + self.name.len() + 4 + self.symbol.len() + 8 + 8 + 4
			+ self.property_address.len()
			+ 4 + self.property_type.len()
			+ 8 + 2
	}

	/// Encode in account layout, zero-padded to the account size.
	pub fn encode(&self) -> Vec<u8> {
		fn string(buf: &mut Vec<u8>, s: &str) {
			buf.extend_from_slice(&(s.len() as u32).to_le_bytes());
			buf.extend_from_slice(s.as_bytes());
		}

		let mut buf = Vec::with_capacity(PROPERTY_STATE_SIZE);
		buf.extend_from_slice(&self.discriminator);
		buf.extend_from_slice(self.authority.as_ref());
		buf.extend_from_slice(self.mint.as_ref());
		string(&mut buf, &self.name);
		string(&mut buf, &self.symbol);
		buf.extend_from_slice(&self.total_supply.to_le_bytes());
		buf.extend_from_slice(&self.circulating_supply.to_le_bytes());
		string(&mut buf, &self.property_address);
		string(&mut buf, &self.property_type);
		buf.extend_from_slice(&self.total_value_usd.to_le_bytes());
		buf.extend_from_slice(&self.rental_yield_bps.to_le_bytes());
		string(&mut buf, &self.metadata_uri);
		buf.push(self.is_active);
		buf.extend_from_slice(&self.created_at.to_le_bytes());
		buf.extend_from_slice(&self.updated_at.to_le_bytes());
		// bump
		buf.push(255);

		if buf.len() < PROPERTY_STATE_SIZE {
			buf.resize(PROPERTY_STATE_SIZE, 0);
		}
		buf
	}
}
