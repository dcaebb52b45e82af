use super::{ApiError, AppState, ListQuery, SuccessResponse};
use crate::store::PersistedRecord;
use crate::sync::{RunReport, SchedulerState};

use axum::{
	Json,
	extract::{Path, Query, State},
};
use serde::Serialize;
use serde_json::{Value, json};
use solana_pubkey::Pubkey;
use std::str::FromStr;

pub async fn health() -> Json<Value> {
	Json(json!({ "status": "ok", "service": "hub-indexer" }))
}

pub async fn list_properties(
	State(state): State<AppState>,
	Query(query): Query<ListQuery>,
) -> Result<Json<SuccessResponse<Vec<PersistedRecord>>>, ApiError> {
	let properties = state.repository.list(&query.into_filter()).await?;
	Ok(SuccessResponse::new(properties))
}

pub async fn get_property(
	State(state): State<AppState>,
	Path(mint): Path<String>,
) -> Result<Json<SuccessResponse<PersistedRecord>>, ApiError> {
	state
		.repository
		.get_by_mint(&mint)
		.await?
		.map(SuccessResponse::new)
		.ok_or(ApiError::NotFound("Property not found"))
}

pub async fn refresh_property(
	State(state): State<AppState>,
	Path(mint): Path<String>,
) -> Result<Json<SuccessResponse<PersistedRecord>>, ApiError> {
	let mint = Pubkey::from_str(&mint)
		.map_err(|_| ApiError::BadRequest(format!("Invalid mint address: {mint}")))?;
	let property = state.pipeline.refresh_mint(&mint).await?;
	Ok(SuccessResponse::new(property))
}

pub async fn trigger_sync(
	State(state): State<AppState>,
) -> Result<Json<SuccessResponse<RunReport>>, ApiError> {
	let report = state.scheduler.trigger_once().await?;
	Ok(SuccessResponse::new(report))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerStatus {
	pub state: SchedulerState,
	pub interval_ms: u64,
}

pub async fn sync_status(State(state): State<AppState>) -> Json<SuccessResponse<SchedulerStatus>> {
	let interval = state.scheduler.interval();
	SuccessResponse::new(SchedulerStatus {
		state: state.scheduler.state().await,
		interval_ms: u64::try_from(interval.as_millis()).unwrap_or(u64::MAX),
	})
}
