//! JSON response bodies shared by every endpoint.

use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// `{"data": <payload>}` or `{"error": "<message>"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Envelope<T> {
    Data(T),
    Error(String),
}

impl<T> Envelope<T> {
    pub fn error(message: impl Into<String>) -> Self {
        Envelope::Error(message.into())
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Body of the existence check and add-IP responses: `{"ip": "10.0.0.5"}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpReply {
    pub ip: IpAddr,
}
