//! Persistent mirror of decoded properties.
//!
//! The store is keyed by mint: reconciliation is an idempotent insert-or-update, rows are never
//! deleted by the pipeline, and `created_at` is set only on first insert.

/// In-memory repository
mod memory;
/// PostgreSQL repository
mod postgres;
/// Decoded record to row reconciliation
mod reconciler;
/// Row, filter and error types
mod types;

pub use memory::MemoryPropertyStore;
pub use postgres::{PostgresOptions, PostgresPropertyStore};
pub use reconciler::Reconciler;
pub use types::*;

/// Repository for property rows
#[async_trait::async_trait]
pub trait PropertyRepository: Send + Sync {
	/// Insert or update the row for `property.mint` atomically.
	///
	/// Every mutable column takes the incoming value (subject to `image_policy`), `created_at`
	/// is set only when the row is first inserted and `updated_at` is always refreshed.
	async fn upsert(
		&self,
		property: &StoredProperty,
		image_policy: ImagePolicy,
	) -> Result<PersistedRecord, PersistError>;

	async fn get_by_mint(&self, mint: &str) -> Result<Option<PersistedRecord>, PersistError>;

	/// Rows passing `filter`, newest first.
	async fn list(&self, filter: &PropertyFilter) -> Result<Vec<PersistedRecord>, PersistError>;
}
