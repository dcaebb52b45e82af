//! In-memory property repository.
//!
//! Mirrors the PostgreSQL upsert semantics in RAM. All data is lost when the process exits.

use super::{
	ImagePolicy, PersistError, PersistedRecord, PropertyFilter, PropertyRepository, StoredProperty,
};

use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
struct MemoryState {
	next_id: i64,
	rows: Vec<PersistedRecord>,
	by_mint: HashMap<String, usize>,
}

#[derive(Default)]
pub struct MemoryPropertyStore {
	state: RwLock<MemoryState>,
}

impl MemoryPropertyStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of stored rows.
	#[cfg(test)]
	pub async fn len(&self) -> usize {
		self.state.read().await.rows.len()
	}
}

#[async_trait::async_trait]
impl PropertyRepository for MemoryPropertyStore {
	async fn upsert(
		&self,
		property: &StoredProperty,
		image_policy: ImagePolicy,
	) -> Result<PersistedRecord, PersistError> {
		let mut state = self.state.write().await;
		let now = Utc::now();

		if let Some(&index) = state.by_mint.get(&property.mint) {
			let row = &mut state.rows[index];
			let previous_image = std::mem::take(&mut row.property.image);
			row.property = property.clone();
			if image_policy == ImagePolicy::KeepExisting && property.image.is_empty() {
				row.property.image = previous_image;
			}
			row.updated_at = now;
			return Ok(row.clone());
		}

		state.next_id += 1;
		let row = PersistedRecord {
			id: state.next_id,
			property: property.clone(),
			created_at: now,
			updated_at: now,
		};
		let index = state.rows.len();
		state.rows.push(row.clone());
		state.by_mint.insert(property.mint.clone(), index);
		Ok(row)
	}

	async fn get_by_mint(&self, mint: &str) -> Result<Option<PersistedRecord>, PersistError> {
		let state = self.state.read().await;
		Ok(state.by_mint.get(mint).map(|&index| state.rows[index].clone()))
	}

	async fn list(&self, filter: &PropertyFilter) -> Result<Vec<PersistedRecord>, PersistError> {
		let state = self.state.read().await;
		let mut rows: Vec<PersistedRecord> = state
			.rows
			.iter()
			.filter(|row| filter.matches(&row.property))
			.cloned()
			.collect();
		rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
		Ok(rows)
	}
}
