//! Router error types and their HTTP rendering.

use crate::envelope::Envelope;
use crate::provider::{ErrorPayload, ProviderError};
use crate::validate::ValidationError;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Outcome of a request that did not succeed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// Malformed input, rejected before the backend is called
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Resource not found, with a message for the caller
    #[error("{0}")]
    NotFound(String),

    /// Resource not found, answered with an empty body
    #[error("Not found")]
    Absent,

    /// Mutation refused by the backend; the payload is passed through as-is
    #[error("Backend rejected request: {0}")]
    Rejected(ErrorPayload),

    /// Backend answered a read with an error
    #[error("{0}")]
    Backend(String),

    /// Backend could not be reached
    #[error("Unable to connect to External IPAM server: {0}")]
    Connectivity(String),
}

impl From<ProviderError> for ApiError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Connectivity(cause) => ApiError::Connectivity(cause),
            ProviderError::Backend(message) => ApiError::Backend(message),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) | ApiError::Absent => StatusCode::NOT_FOUND,
            ApiError::Rejected(_) | ApiError::Backend(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Connectivity(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            ApiError::Validation(_) | ApiError::NotFound(_) | ApiError::Backend(_) => {
                (status, Envelope::<()>::error(self.to_string())).into_response()
            }
            ApiError::Absent => (status, [(header::CONTENT_TYPE, "application/json")]).into_response(),
            ApiError::Rejected(payload) => (status, Json(payload)).into_response(),
            // Plain text so the caller can tell a transport failure from an IPAM answer
            ApiError::Connectivity(_) => (status, self.to_string()).into_response(),
        }
    }
}
