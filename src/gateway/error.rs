//! Gateway error types
//!
//! Every request failure maps to a closed error kind with a fixed HTTP
//! status and message, so the mapping is unit-testable independent of the
//! transport. Filesystem detail never reaches the caller.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Gateway error type
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Missing path query param.")]
    MissingPath,

    #[error("Invalid path.")]
    InvalidPath,

    #[error("Path not allowed.")]
    PathNotAllowed,

    #[error("Only .ply files are supported.")]
    UnsupportedFileType,

    #[error("File not found.")]
    NotFound,

    #[error("Path is not a file.")]
    NotAFile,

    #[error("Server bind failed: {reason}")]
    BindFailed { reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal server error: {reason}")]
    Internal { reason: String },
}

impl GatewayError {
    /// HTTP status for this error kind
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::MissingPath
            | GatewayError::InvalidPath
            | GatewayError::UnsupportedFileType
            | GatewayError::NotAFile => StatusCode::BAD_REQUEST,
            GatewayError::PathNotAllowed => StatusCode::FORBIDDEN,
            GatewayError::NotFound => StatusCode::NOT_FOUND,
            GatewayError::BindFailed { .. }
            | GatewayError::Io(_)
            | GatewayError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Response body message for this error kind.
    ///
    /// Internal kinds share a generic message so no server-side detail
    /// leaks to the caller.
    pub fn message(&self) -> &'static str {
        match self {
            GatewayError::MissingPath => "Missing path query param.",
            GatewayError::InvalidPath => "Invalid path.",
            GatewayError::PathNotAllowed => "Path not allowed.",
            GatewayError::UnsupportedFileType => "Only .ply files are supported.",
            GatewayError::NotFound => "File not found.",
            GatewayError::NotAFile => "Path is not a file.",
            GatewayError::BindFailed { .. }
            | GatewayError::Io(_)
            | GatewayError::Internal { .. } => "Internal server error.",
        }
    }

    /// Check if this error should result in a 403 Forbidden response
    pub fn is_forbidden(&self) -> bool {
        matches!(self, GatewayError::PathNotAllowed)
    }

    /// Check if this error should result in a 404 Not Found response
    pub fn is_not_found(&self) -> bool {
        matches!(self, GatewayError::NotFound)
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.message() }))).into_response()
    }
}
