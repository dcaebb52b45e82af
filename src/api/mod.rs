//! HTTP read API over the property store, plus manual sync controls.
//!
//! Every response is a JSON envelope: `{"success": true, "data": ...}` or
//! `{"success": false, "error": ...}`.

/// Route handlers
mod handlers;
/// Envelopes, query parsing and error mapping
mod types;

pub use types::*;

use crate::store::PropertyRepository;
use crate::sync::{SyncPipeline, SyncScheduler};

use axum::{
	Router,
	routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Shared state of the HTTP handlers.
#[derive(Clone)]
pub struct AppState {
	pub repository: Arc<dyn PropertyRepository>,
	pub pipeline: Arc<SyncPipeline>,
	pub scheduler: Arc<SyncScheduler>,
}

pub fn router(state: AppState) -> Router {
	let v1 = Router::new()
		.route("/properties", get(handlers::list_properties))
		.route("/properties/:mint", get(handlers::get_property))
		.route("/properties/:mint/refresh", post(handlers::refresh_property))
		.route("/index/trigger", post(handlers::trigger_sync))
		.route("/index/status", get(handlers::sync_status));

	Router::new()
		.route("/health", get(handlers::health))
		.nest("/api/v1", v1)
		.layer(CorsLayer::permissive())
		.with_state(state)
}
