use crate::store::{PersistError, PropertyFilter};
use crate::sync::SyncError;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::error;

/// `{"success": true, "data": ...}` envelope.
#[derive(Debug, Serialize)]
pub struct SuccessResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> SuccessResponse<T> {
    pub fn new(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
        })
    }
}

/// `{"success": false, "error": ...}` envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

/// Query string of the property listing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub status: Option<String>,
    pub min_value: Option<String>,
    pub max_value: Option<String>,
    pub property_type: Option<String>,
}

impl ListQuery {
    /// Empty parameters and bounds that are not integers are ignored.
    pub fn into_filter(self) -> PropertyFilter {
        let non_empty = |value: Option<String>| value.filter(|v| !v.is_empty());
        PropertyFilter {
            status: non_empty(self.status),
            min_value: self.min_value.and_then(|v| v.parse().ok()),
            max_value: self.max_value.and_then(|v| v.parse().ok()),
            property_type: non_empty(self.property_type),
        }
    }
}

/// Error types for HTTP handlers
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unprocessable(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            success: false,
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<PersistError> for ApiError {
    fn from(e: PersistError) -> Self {
        error!("Store error: {}", e);
        ApiError::Internal("Internal server error".to_string())
    }
}

impl From<SyncError> for ApiError {
    fn from(e: SyncError) -> Self {
        if e.is_not_found() {
            return ApiError::NotFound("Property not found");
        }
        match e {
            SyncError::RunInProgress => ApiError::Conflict(e.to_string()),
            SyncError::DecodeError(_) => ApiError::Unprocessable(e.to_string()),
            SyncError::PersistError(e) => e.into(),
            SyncError::LedgerError(_) => ApiError::Internal(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_query_ignores_empty_and_non_numeric_values() {
        let filter = ListQuery {
            status: Some(String::new()),
            min_value: Some("abc".to_string()),
            max_value: Some("2500".to_string()),
            property_type: Some("Commercial".to_string()),
        }
        .into_filter();

        assert_eq!(
            filter,
            PropertyFilter {
                status: None,
                min_value: None,
                max_value: Some(2500),
                property_type: Some("Commercial".to_string()),
            }
        );
    }

    #[test]
    fn sync_errors_map_to_statuses() {
        use crate::ledger::LedgerError;

        assert_eq!(
            ApiError::from(SyncError::RunInProgress).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(SyncError::LedgerError(LedgerError::AccountNotFound(
                "x".into()
            )))
            .status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(SyncError::LedgerError(LedgerError::HttpStatus(503))).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
