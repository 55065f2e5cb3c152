//! Common utilities for NetBox API client
//!
//! Provides the authenticated HTTP wrapper shared by every endpoint.

pub mod query;

use crate::error::NetBoxError;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Paginated response wrapper from NetBox API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

/// HTTP client wrapper with authentication
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    token: String,
}

impl HttpClient {
    /// Create a new HTTP client wrapper
    pub fn new(client: Client, base_url: String, token: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a full URL from a path
    pub fn build_url(&self, path: &str) -> String {
        if path.starts_with("http") {
            path.to_string()
        } else {
            format!("{}{}", self.base_url, path)
        }
    }

    /// Get authorization header value
    pub fn auth_header(&self) -> String {
        format!("Token {}", self.token)
    }

    /// Fetch all pages of a paginated response
    pub async fn fetch_all_pages<T: for<'de> Deserialize<'de>>(
        &self,
        mut url: String,
    ) -> Result<Vec<T>, NetBoxError> {
        let mut all_results = Vec::new();

        loop {
            debug!("Fetching page: {}", url);

            let response = self.client
                .get(&url)
                .header("Authorization", self.auth_header())
                .header("Accept", "application/json")
                .send()
                .await
                .map_err(NetBoxError::from_transport)?;

            let response = check_status(response, "GET", &url).await?;
            let response_text = response.text().await.map_err(NetBoxError::from_transport)?;
            let page: PaginatedResponse<T> = serde_json::from_str(&response_text).map_err(|e| {
                NetBoxError::Api(format!(
                    "error decoding response body: {} - Response (first 500 chars): {}",
                    e,
                    response_text.chars().take(500).collect::<String>()
                ))
            })?;
            all_results.extend(page.results);

            match page.next {
                Some(next_url) => {
                    url = self.build_url(&next_url);
                }
                None => break,
            }
        }

        Ok(all_results)
    }

    /// Make a GET request
    pub async fn get<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
    ) -> Result<T, NetBoxError> {
        let url = self.build_url(path);
        debug!("GET {}", url);

        let response = self.client
            .get(&url)
            .header("Authorization", self.auth_header())
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(NetBoxError::from_transport)?;

        let response = check_status(response, "GET", path).await?;
        decode(response).await
    }

    /// Make a POST request
    pub async fn post<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T, NetBoxError> {
        let url = self.build_url(path);
        debug!("POST {} with body: {}", url, body);

        let response = self.client
            .post(&url)
            .header("Authorization", self.auth_header())
            .header("Accept", "application/json")
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(NetBoxError::from_transport)?;

        let response = check_status(response, "POST", path).await?;
        decode(response).await
    }

    /// Make a DELETE request
    pub async fn delete(&self, path: &str) -> Result<(), NetBoxError> {
        let url = self.build_url(path);
        debug!("DELETE {}", url);

        let response = self.client
            .delete(&url)
            .header("Authorization", self.auth_header())
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(NetBoxError::from_transport)?;

        check_status(response, "DELETE", path).await?;
        Ok(())
    }

    /// Build query string from filters
    pub fn build_query_string(&self, filters: &[(&str, &str)]) -> String {
        filters
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Map non-2xx answers onto the error taxonomy, passing successful responses through
async fn check_status(response: Response, method: &str, path: &str) -> Result<Response, NetBoxError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.map_err(NetBoxError::from_transport)?;
    Err(match status {
        StatusCode::NOT_FOUND => NetBoxError::NotFound(format!(
            "Resource not found: {} - {}",
            path, body
        )),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => NetBoxError::Authentication(format!(
            "{} {} rejected: {} - {}",
            method, path, status, body
        )),
        StatusCode::BAD_REQUEST => NetBoxError::InvalidRequest(format!(
            "{} {} failed: {} - {}",
            method, path, status, body
        )),
        _ => NetBoxError::Api(format!(
            "{} {} failed: {} - {}",
            method, path, status, body
        )),
    })
}

async fn decode<T: for<'de> Deserialize<'de>>(response: Response) -> Result<T, NetBoxError> {
    let text = response.text().await.map_err(NetBoxError::from_transport)?;
    serde_json::from_str(&text).map_err(NetBoxError::Serialization)
}
