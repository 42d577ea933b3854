use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::error::AccessError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<AccessError> for ApiError {
    fn from(err: AccessError) -> Self {
        if err.is_validation() {
            tracing::debug!("Rejected team plugin permission request: {}", err);
        }

        match err {
            AccessError::InvalidPageAccess(_)
            | AccessError::DuplicateGrant { .. }
            | AccessError::StaleWrite { .. } => ApiError::BadRequest(err.to_string()),
            AccessError::UnknownPlugin(_) => ApiError::NotFound("Unknown pluginId".to_string()),
            AccessError::NotFound(_) => {
                ApiError::NotFound("Team-based permission not found".to_string())
            }
            other => {
                tracing::error!("Team plugin permission request failed: {}", other);
                ApiError::Internal(other.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal error".to_string(),
            ),
        };

        let body = serde_json::json!({ "error": message });
        (status, Json(body)).into_response()
    }
}
