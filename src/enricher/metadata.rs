//!
//! Resolution of property images from off-chain metadata documents.
//!
//! Metadata URIs stored on-chain are usually content-addressed (`ipfs://<cid>`). They are rewritten
//! onto an HTTP gateway, fetched, and the `image` member of the JSON document is rewritten the same
//! way before being returned.

use super::{EnrichError, ImageResolver};

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

pub const IPFS_SCHEME: &str = "ipfs://";
pub const DEFAULT_GATEWAY: &str = "https://gateway.pinata.cloud/ipfs/";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Off-chain metadata document. Missing and `null` members are both read as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PropertyMetadata {
	#[serde(default)]
	pub name: Option<String>,
	#[serde(default)]
	pub description: Option<String>,
	#[serde(default)]
	pub image: Option<String>,
}

/// Fetches metadata documents over HTTP(S) through a content-addressed gateway.
#[derive(Clone)]
pub struct MetadataEnricher {
	http_client: Client,
	gateway: String,
}

impl MetadataEnricher {
	/// Create an enricher with the given gateway base and request timeout.
	///
	/// # Arguments
	/// * `gateway` - Base URL a content id is appended to, e.g. `https://gateway.example/ipfs/`.
	/// * `timeout` - Upper bound for a whole metadata fetch.
	pub fn new(gateway: String, timeout: Duration) -> Result<Self, EnrichError> {
		let http_client = Client::builder().timeout(timeout).build()?;
		Ok(Self {
			http_client,
			gateway,
		})
	}

	/// Rewrite a content-addressed URI onto the gateway. Other URIs are returned unchanged.
	pub fn gateway_url(&self, uri: &str) -> String {
		match uri.strip_prefix(IPFS_SCHEME) {
			Some(cid) => format!("{}{}", self.gateway, cid),
			None => uri.to_string(),
		}
	}

	/// Fetch and parse the metadata document at `metadata_uri`.
	pub async fn fetch_metadata(
		&self,
		metadata_uri: &str,
	) -> Result<PropertyMetadata, EnrichError> {
		let url = self.gateway_url(metadata_uri);
		debug!("Fetching metadata from {}", url);

		let response = self.http_client.get(&url).send().await?;
		if !response.status().is_success() {
			return Err(EnrichError::HttpStatus(response.status().as_u16()));
		}

		let body = response.bytes().await?;
		Ok(serde_json::from_slice(&body)?)
	}
}

#[async_trait::async_trait]
impl ImageResolver for MetadataEnricher {
	async fn resolve_image(&self, metadata_uri: &str) -> Result<String, EnrichError> {
		let metadata = self.fetch_metadata(metadata_uri).await?;
		debug!(
			name = metadata.name.as_deref().unwrap_or_default(),
			description_len = metadata.description.as_deref().map_or(0, str::len),
			"Fetched metadata for {}",
			metadata_uri
		);
		Ok(self.gateway_url(&metadata.image.unwrap_or_default()))
	}
}
