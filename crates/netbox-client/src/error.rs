//! NetBox client errors

use std::error::Error as StdError;
use std::io;
use thiserror::Error;

/// Errors that can occur when interacting with the NetBox API
#[derive(Debug, Error)]
pub enum NetBoxError {
    /// NetBox could not be reached (connection refused/reset, timeout)
    #[error("NetBox unreachable: {0}")]
    Unreachable(String),

    /// HTTP request/response error that is not a connectivity problem
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// NetBox API returned an error
    #[error("NetBox API error: {0}")]
    Api(String),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Authentication failed (invalid token, expired, etc.)
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request (e.g., missing required fields)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl NetBoxError {
    /// Classify a transport-level `reqwest` failure.
    ///
    /// Connect, timeout, send and body-read failures mean the server could not
    /// be talked to at all and become [`NetBoxError::Unreachable`]. A reset while
    /// the body is streaming surfaces as a decode error wrapping the I/O failure,
    /// so the whole source chain is inspected. Anything else (redirects, builder
    /// errors, genuine decode failures) stays [`NetBoxError::Http`].
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() || err.is_request() || err.is_body() || connection_lost(&err) {
            Self::Unreachable(describe_chain(&err))
        } else {
            Self::Http(err)
        }
    }

    /// True when the failure is a connectivity fault rather than an answer from NetBox
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Unreachable(_))
    }
}

/// True when any error in the chain is a dropped connection or a
/// body/timeout failure reported by reqwest.
pub(crate) fn connection_lost(err: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(cause) = current {
        if let Some(io_err) = cause.downcast_ref::<io::Error>() {
            if matches!(
                io_err.kind(),
                io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::BrokenPipe
                    | io::ErrorKind::UnexpectedEof
                    | io::ErrorKind::TimedOut
            ) {
                return true;
            }
        }
        if let Some(req_err) = cause.downcast_ref::<reqwest::Error>() {
            if req_err.is_body() || req_err.is_timeout() || req_err.is_connect() {
                return true;
            }
        }
        current = cause.source();
    }
    false
}

// "error decoding response body: connection reset by peer" instead of the outermost message only
fn describe_chain(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    let mut current = err.source();
    while let Some(cause) = current {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        current = cause.source();
    }
    message
}
