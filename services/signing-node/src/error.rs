use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use tracing::error;

use chainsign_core::{Error, ErrorKind};

/// Error returned by every handler, rendered as `{"errors": "<message>"}`.
#[derive(Debug)]
pub enum ApiError {
    Service(Error),
    /// Body or query that could not be decoded
    Malformed(String),
    /// Blocking task panicked or was cancelled
    Task(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Service(err) => match err.kind() {
                ErrorKind::Validation => StatusCode::BAD_REQUEST,
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::Conflict => StatusCode::CONFLICT,
                ErrorKind::KeyCodec | ErrorKind::Signing | ErrorKind::Internal => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            ApiError::Malformed(_) => StatusCode::BAD_REQUEST,
            ApiError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Service(err) => err.to_string(),
            ApiError::Malformed(reason) => reason.clone(),
            ApiError::Task(_) => "internal server error".to_string(),
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError::Service(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::Task(reason) => error!(%reason, "Blocking task failed"),
            ApiError::Service(err) if status.is_server_error() => {
                error!(error = %err, kind = %err.kind(), "Request failed")
            }
            _ => {}
        }
        (status, Json(json!({ "errors": self.message() }))).into_response()
    }
}
