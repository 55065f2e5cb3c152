//! Query utilities for NetBox API
//!
//! Provides helpers for building list queries and handling pagination.

use crate::common::{HttpClient, PaginatedResponse};
use crate::error::NetBoxError;
use serde::Deserialize;

/// Query resources with optional filtering and pagination
///
/// `endpoint` is relative to `/api/`, e.g. `ipam/prefixes`.
pub async fn query_resources<T: for<'de> Deserialize<'de>>(
    http: &HttpClient,
    endpoint: &str,
    filters: &[(&str, &str)],
    fetch_all: bool,
) -> Result<Vec<T>, NetBoxError> {
    let url = resource_url(http, endpoint, filters);

    if fetch_all {
        http.fetch_all_pages(http.build_url(&url)).await
    } else {
        let response: PaginatedResponse<T> = http.get(&url).await?;
        Ok(response.results)
    }
}

fn resource_url(http: &HttpClient, endpoint: &str, filters: &[(&str, &str)]) -> String {
    let url = format!("/api/{}/", endpoint.trim_matches('/'));
    if filters.is_empty() {
        url
    } else {
        format!("{}?{}", url, http.build_query_string(filters))
    }
}
