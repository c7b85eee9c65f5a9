//! Error handling for camrelay

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Not found
    #[error("{0}")]
    NotFound(String),

    /// Validation error (missing/invalid request fields)
    #[error("{0}")]
    Validation(String),

    /// Relay accepted the connection but rejected the request
    #[error("Relay rejected request: {status} - {body}")]
    RelayRejected { status: u16, body: String },

    /// Relay could not be reached at the transport level
    #[error("Relay unreachable: {0}")]
    RelayUnreachable(String),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::RelayRejected { .. } | Error::RelayUnreachable(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let message = self.to_string();

        tracing::error!(
            status = %status,
            message = %message,
            "Request error"
        );

        let body = Json(json!({ "error": message }));

        (status, body).into_response()
    }
}
