//! Best-effort enrichment of decoded records from off-chain metadata.
//!
//! Enrichment never fails a record: the pipeline logs an [`EnrichError`] and carries on with the
//! record's image left empty.

/// HTTP gateway metadata fetcher
mod metadata;

pub use metadata::*;

/// Error types for metadata enrichment
#[derive(Debug, thiserror::Error)]
pub enum EnrichError {
	#[error("HTTP error: {0}")]
	HttpError(#[from] reqwest::Error),

	#[error("Metadata fetch returned status {0}")]
	HttpStatus(u16),

	#[error("JSON parse error: {0}")]
	JsonError(#[from] serde_json::Error),
}

/// Resolves a metadata URI to a displayable image URL.
#[async_trait::async_trait]
pub trait ImageResolver: Send + Sync {
	async fn resolve_image(&self, metadata_uri: &str) -> Result<String, EnrichError>;
}
