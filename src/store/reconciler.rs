use super::{ImagePolicy, PersistError, PersistedRecord, PropertyRepository, StoredProperty};
use crate::decoder::DecodedRecord;

use std::sync::Arc;
use tracing::debug;

/// Writes decoded records into a [`PropertyRepository`] keyed by mint.
#[derive(Clone)]
pub struct Reconciler {
	repository: Arc<dyn PropertyRepository>,
	image_policy: ImagePolicy,
}

impl Reconciler {
	pub fn new(repository: Arc<dyn PropertyRepository>, image_policy: ImagePolicy) -> Self {
		Self {
			repository,
			image_policy,
		}
	}

	/// Insert or update the row for `record.mint`.
	///
	/// # Returns
	/// The row as stored, or `ValueOutOfRange` without touching the store when a quantity does not
	/// fit its column.
	pub async fn upsert(&self, record: &DecodedRecord) -> Result<PersistedRecord, PersistError> {
		let property = StoredProperty::try_from(record)?;
		let stored = self.repository.upsert(&property, self.image_policy).await?;
		debug!("Reconciled property {} (row {})", stored.property.mint, stored.id);
		Ok(stored)
	}
}
