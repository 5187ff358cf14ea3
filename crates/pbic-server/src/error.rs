//! Error types for the pbic server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};

/// Server error type.
///
/// Soft compile failures never reach this type; they travel inside the
/// result bundle. Errors here are transport-level faults.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Client-side input problem, reported as HTTP 400.
    #[error("{0}")]
    BadRequest(String),

    /// Compilation produced neither an artifact nor a bundle.
    #[error("Compilation failed. Logs: {0}")]
    CompilationFailed(String),

    /// Core pipeline error.
    #[error("{0}")]
    Core(#[from] pbic_core::Error),

    /// Failed to assemble the response bundle.
    #[error("bundle write error: {0}")]
    Bundle(String),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid listen address.
    #[error("invalid address: {0}")]
    Address(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Unexpected internal fault.
    #[error("{0}")]
    Internal(String),
}

impl ServerError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Core(pbic_core::Error::InvalidArchive(_)) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("request failed: {self}");
        }
        let body = Json(serde_json::json!({ "detail": self.to_string() }));
        (status, body).into_response()
    }
}

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_archive_maps_to_bad_request() {
        let err = ServerError::Core(pbic_core::Error::InvalidArchive("bad".to_string()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_internal_maps_to_server_error() {
        let err = ServerError::Internal("oops".to_string());
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
