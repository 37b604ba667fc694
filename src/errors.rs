use crate::services::object_store::StoreError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// A lightweight wrapper for general errors that keeps the message local.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    /// Create a new AppError with a specific status and message.
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
        }
    }

    /// Shortcut for a 500 Internal Server Error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }

    /// Shortcut for 404 Not Found
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, msg)
    }

    /// Shortcut for 400 Bad Request
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!("request failed: {}", self.message);
        } else {
            tracing::warn!("request rejected ({}): {}", self.status, self.message);
        }

        let body = Json(json!({
            "error": self.message,
            "status": self.status.as_u16()
        }));

        (self.status, body).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match &err {
            StoreError::NotFound(_) => AppError::not_found(err.to_string()),
            StoreError::InvalidIdentifier(_) => AppError::bad_request(err.to_string()),
            StoreError::MisconfiguredStore(_)
            | StoreError::CorruptMetadata { .. }
            | StoreError::StorageUnavailable(_) => AppError::internal(err.to_string()),
        }
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::internal(format!("storage task failed: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::object_id::ObjectId;
    use std::io;

    #[test]
    fn store_errors_map_to_statuses() {
        let not_found: AppError = StoreError::NotFound(ObjectId::generate()).into();
        assert_eq!(not_found.status, StatusCode::NOT_FOUND);

        let invalid: AppError = StoreError::InvalidIdentifier("0".into()).into();
        assert_eq!(invalid.status, StatusCode::BAD_REQUEST);

        let io_err: AppError =
            StoreError::StorageUnavailable(io::Error::other("disk full")).into();
        assert_eq!(io_err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(io_err.message, "disk full");
    }
}
