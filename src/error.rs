//! Service-level error types and their HTTP mapping.
//!
//! Every failure surfaced by a handler is one of these kinds. `NotFound` is
//! consumed internally by the load-or-assign protocol; handlers translate it
//! into a `BadRequest` before it reaches a client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::coordination::client::KvError;
use crate::server::envelope::{ApiError, ApiResponse};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Missing or invalid client input; also unknown counter on decrement/get.
    #[error("{0}")]
    BadRequest(String),

    /// Coordination-store key absent.
    #[error("key '{0}' not found")]
    NotFound(String),

    /// Timeout or transport failure talking to the coordination store.
    #[error("coordination store failure: {0}")]
    Coordination(String),

    /// No live shard with a usable metric.
    #[error("no eligible shard: {0}")]
    Selection(String),

    /// A shard answered with a non-2xx status.
    #[error("shard {shard} returned status {status}: {body}")]
    ShardStatus {
        shard: String,
        status: u16,
        body: String,
    },

    /// A shard could not be reached at all.
    #[error("failed to reach shard {shard}: {reason}")]
    ShardUnreachable { shard: String, reason: String },

    /// JSON marshal/unmarshal failure.
    #[error("encoding failure: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<KvError> for Error {
    fn from(err: KvError) -> Self {
        match err {
            KvError::NotFound(key) => Error::NotFound(key),
            other => Error::Coordination(other.to_string()),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            Error::BadRequest(message) => message.clone(),
            _ => "Internal server error".to_string(),
        };
        let body = ApiResponse::<serde_json::Value> {
            success: false,
            message,
            data: None,
            error: Some(ApiError {
                code: status.as_u16(),
                details: self.to_string(),
            }),
        };
        (status, Json(body)).into_response()
    }
}
