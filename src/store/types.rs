use crate::decoder::{DecodedRecord, PropertyStatus};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A property in its persisted column representation.
///
/// Ledger quantities are unsigned 64-bit; the store keeps them as signed 64-bit columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredProperty {
    pub mint: String,
    pub property_state_pda: String,
    pub name: String,
    pub symbol: String,
    pub authority: String,
    pub status: PropertyStatus,
    pub total_supply: i64,
    pub circulating_supply: i64,
    pub decimals: i32,
    pub property_type: String,
    pub location: String,
    pub total_value_usd: i64,
    pub annual_yield: i64,
    pub metadata_uri: String,
    pub image: String,
    pub current_epoch: i64,
    pub last_indexed_slot: i64,
}

fn to_column(field: &'static str, value: u64) -> Result<i64, PersistError> {
    i64::try_from(value).map_err(|_| PersistError::ValueOutOfRange { field, value })
}

impl TryFrom<&DecodedRecord> for StoredProperty {
    type Error = PersistError;

    /// Fails with `ValueOutOfRange` rather than wrapping quantities above `i64::MAX`.
    fn try_from(record: &DecodedRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            mint: record.mint.clone(),
            property_state_pda: record.property_state_pda.clone(),
            name: record.name.clone(),
            symbol: record.symbol.clone(),
            authority: record.authority.clone(),
            status: record.status,
            total_supply: to_column("total_supply", record.total_supply)?,
            circulating_supply: to_column("circulating_supply", record.circulating_supply)?,
            decimals: i32::from(record.decimals),
            property_type: record.property_type.clone(),
            location: record.location.clone(),
            total_value_usd: to_column("total_value_usd", record.total_value_usd)?,
            annual_yield: i64::from(record.annual_yield),
            metadata_uri: record.metadata_uri.clone(),
            image: record.image.clone(),
            current_epoch: to_column("current_epoch", record.current_epoch)?,
            last_indexed_slot: to_column("last_indexed_slot", record.last_indexed_slot)?,
        })
    }
}

/// A stored property row with its store-assigned metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedRecord {
    pub id: i64,
    #[serde(flatten)]
    pub property: StoredProperty,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Optional filters for listing properties. Unset members match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyFilter {
    pub status: Option<String>,
    pub min_value: Option<i64>,
    pub max_value: Option<i64>,
    pub property_type: Option<String>,
}

impl PropertyFilter {
    /// Whether `property` passes every set filter.
    pub fn matches(&self, property: &StoredProperty) -> bool {
        self.status
            .as_deref()
            .is_none_or(|status| property.status.as_str() == status)
            && self
                .min_value
                .is_none_or(|min| property.total_value_usd >= min)
            && self
                .max_value
                .is_none_or(|max| property.total_value_usd <= max)
            && self
                .property_type
                .as_deref()
                .is_none_or(|kind| property.property_type == kind)
    }
}

/// How the image column is reconciled when the incoming record carries no image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImagePolicy {
    /// Overwrite unconditionally; a failed enrichment clears a previously stored image.
    #[default]
    Overwrite,
    /// Keep a stored non-empty image when the incoming image is empty.
    KeepExisting,
}

/// Error types for the property store
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Value of `{field}` out of storable range: {value}")]
    ValueOutOfRange { field: &'static str, value: u64 },

    #[error("Corrupt row: {0}")]
    CorruptRow(String),
}
