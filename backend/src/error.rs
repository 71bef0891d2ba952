//! Error kinds surfaced by the services and how each maps onto HTTP.

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use validator::ValidationErrors;

use crate::data_access::data_context::StoreError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The id does not resolve to a live document. Holds the entity name.
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    InvalidInput(String),

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// A store failure during insert-many / update-many / delete-many.
    #[error("bulk operation failed: {0}")]
    BulkOperation(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    /// Reclassify store failures as bulk-operation failures.
    pub fn into_bulk(self) -> ApiError {
        match self {
            ApiError::Store(e) => ApiError::BulkOperation(e.to_string()),
            other => other,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidInput(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::InvalidInput(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::NotFound(entity) => (
                StatusCode::NOT_FOUND,
                json!({ "message": format!("{entity} not found") }),
            ),
            ApiError::InvalidInput(message) => {
                (StatusCode::BAD_REQUEST, json!({ "message": message }))
            }
            ApiError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                json!({ "message": "Validation failed", "error": errors.to_string() }),
            ),
            ApiError::BulkOperation(detail) => {
                tracing::error!(error = %detail, "bulk operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "message": "Bulk operation failed", "error": detail }),
                )
            }
            ApiError::Store(e) => {
                tracing::error!(error = %e, "store operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "message": "Server error", "error": e.to_string() }),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}
