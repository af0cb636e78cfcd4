//! Error types for the HTTP server.

use crate::types::ErrorResponse;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use todo_core::TodoError;
use todo_store::StoreError;
use tracing::error;

/// Result type for server lifecycle operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that stop the server from starting or running.
#[derive(Error, Debug)]
pub enum ServerError {
    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),

    /// Opening the item store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Binding or serving failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Message returned for every 500 response.
pub const INTERNAL_ERROR_MESSAGE: &str = "internal server error";

/// An error answered to an HTTP client.
#[derive(Error, Debug)]
pub enum ApiError {
    /// A todo operation failed.
    #[error(transparent)]
    Todo(#[from] TodoError),

    /// The request body or query string was malformed.
    #[error("{0}")]
    BadRequest(String),

    /// Something outside the todo operation went wrong.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Returns the status code this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Todo(TodoError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Todo(err) if err.is_client_error() => StatusCode::BAD_REQUEST,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Todo(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            error!(error = %self, "request failed");
            INTERNAL_ERROR_MESSAGE.to_string()
        } else {
            self.to_string()
        };
        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(
            ApiError::from(TodoError::validation("bad")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(TodoError::NotFound(None)).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(TodoError::Store(StoreError::codec("boom"))).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::BadRequest("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Internal("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn client_messages_pass_through() {
        let err = ApiError::from(TodoError::NotFound(None));
        assert_eq!(err.to_string(), "todo item does not exist");

        let err = ApiError::from(TodoError::validation("\"value\" is required"));
        assert_eq!(err.to_string(), "\"value\" is required");
    }

    #[test]
    fn server_error_display() {
        let err = ServerError::Config("missing field".into());
        assert_eq!(err.to_string(), "configuration error: missing field");
    }
}
