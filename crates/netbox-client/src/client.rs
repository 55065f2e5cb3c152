//! NetBox API client
//!
//! Implements the NetBox REST API client for IPAM operations.
//! Based on NetBox API structure: /api/ipam/prefixes/, /api/ipam/ip-addresses/ and /api/ipam/vrfs/

use crate::common::query::query_resources;
use crate::common::HttpClient;
use crate::error::NetBoxError;
use crate::models::*;
use crate::netbox_trait::NetBoxClientTrait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// NetBox API client
#[derive(Debug, Clone)]
pub struct NetBoxClient {
    http: HttpClient,
}

impl NetBoxClient {
    /// Create a new NetBox client
    ///
    /// # Arguments
    /// * `base_url` - NetBox base URL (e.g., "http://netbox:80")
    /// * `token` - API token for authentication
    pub fn new(base_url: String, token: String) -> Result<Self, NetBoxError> {
        Self::with_timeout(base_url, token, DEFAULT_TIMEOUT)
    }

    /// Create a new NetBox client with a custom per-request timeout
    pub fn with_timeout(base_url: String, token: String, timeout: Duration) -> Result<Self, NetBoxError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(NetBoxError::Http)?;

        Ok(Self {
            http: HttpClient::new(client, base_url, token),
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }

    /// Validate the API token by making a simple authenticated request.
    ///
    /// Uses the status endpoint as it's lightweight and requires authentication.
    ///
    /// # Returns
    /// * `Ok(())` - Token is valid and NetBox is reachable
    /// * `Err(NetBoxError)` - Token is invalid or NetBox is unreachable
    pub async fn validate_token(&self) -> Result<(), NetBoxError> {
        debug!("Validating NetBox token and connectivity");
        let _status: serde_json::Value = self.http.get("/api/status/").await?;
        debug!("Token validated successfully");
        Ok(())
    }

    /// Get a prefix by ID
    ///
    /// # Returns
    /// * `Ok(Prefix)` - The prefix object
    /// * `Err(NetBoxError::NotFound)` - If no prefix has that ID
    pub async fn get_prefix(&self, id: u64) -> Result<Prefix, NetBoxError> {
        debug!("Fetching prefix {} from NetBox", id);
        self.http.get(&format!("/api/ipam/prefixes/{}/", id)).await
    }

    /// Query prefixes by filter
    ///
    /// # Arguments
    /// * `filters` - Query parameters (e.g., [("prefix", "10.0.0.0/24"), ("vrf_id", "2")])
    /// * `fetch_all` - If true, fetch all pages (default: false, returns first page only)
    pub async fn query_prefixes(&self, filters: &[(&str, &str)], fetch_all: bool) -> Result<Vec<Prefix>, NetBoxError> {
        debug!("Querying prefixes with filters: {:?}", filters);
        query_resources(&self.http, "ipam/prefixes", filters, fetch_all).await
    }

    /// Get available IP addresses from a prefix
    ///
    /// # Arguments
    /// * `prefix_id` - Prefix ID
    /// * `limit` - Optional limit on number of IPs to return
    pub async fn get_available_ips(&self, prefix_id: u64, limit: Option<u32>) -> Result<Vec<AvailableIP>, NetBoxError> {
        let mut path = format!("/api/ipam/prefixes/{}/available-ips/", prefix_id);
        if let Some(limit) = limit {
            path = format!("{}?limit={}", path, limit);
        }

        debug!("Fetching available IPs from prefix {}", prefix_id);
        self.http.get(&path).await
    }

    /// Query IP addresses by filter
    ///
    /// # Arguments
    /// * `filters` - Query parameters (e.g., [("address", "192.168.1.1"), ("parent", "192.168.1.0/24")])
    /// * `fetch_all` - If true, fetch all pages
    pub async fn query_ip_addresses(&self, filters: &[(&str, &str)], fetch_all: bool) -> Result<Vec<IPAddress>, NetBoxError> {
        debug!("Querying IP addresses with filters: {:?}", filters);
        query_resources(&self.http, "ipam/ip-addresses", filters, fetch_all).await
    }

    /// Create a new IP address
    ///
    /// # Arguments
    /// * `address` - IP address with mask length (e.g., "192.168.1.1/24")
    /// * `request` - Optional request fields (description, status, VRF, etc.)
    pub async fn create_ip_address(&self, address: &str, request: Option<AllocateIPRequest>) -> Result<IPAddress, NetBoxError> {
        let body = ip_address_body(address, request)?;
        debug!("Creating IP address: {}", address);
        self.http.post("/api/ipam/ip-addresses/", &body).await
    }

    /// Delete an IP address
    ///
    /// # Returns
    /// * `Ok(())` - If deletion succeeds
    /// * `Err(NetBoxError::NotFound)` - If the address is already gone
    pub async fn delete_ip_address(&self, id: u64) -> Result<(), NetBoxError> {
        debug!("Deleting IP address: {}", id);
        self.http.delete(&format!("/api/ipam/ip-addresses/{}/", id)).await
    }

    /// Query VRFs by filter
    pub async fn query_vrfs(&self, filters: &[(&str, &str)], fetch_all: bool) -> Result<Vec<Vrf>, NetBoxError> {
        debug!("Querying VRFs with filters: {:?}", filters);
        query_resources(&self.http, "ipam/vrfs", filters, fetch_all).await
    }

    /// Look up a VRF by its exact name
    ///
    /// The `name` filter in NetBox is case-insensitive, so the result is
    /// re-checked for an exact match.
    pub async fn get_vrf_by_name(&self, name: &str) -> Result<Option<Vrf>, NetBoxError> {
        let vrfs = self.query_vrfs(&[("name", name)], false).await?;
        Ok(vrfs.into_iter().find(|vrf| vrf.name == name))
    }
}

/// Build the JSON body for `POST /api/ipam/ip-addresses/`
fn ip_address_body(address: &str, request: Option<AllocateIPRequest>) -> Result<serde_json::Value, NetBoxError> {
    let mut body = serde_json::json!({
        "address": address,
    });

    if let Some(req) = request {
        if let Some(desc) = req.description {
            body["description"] = serde_json::Value::String(desc);
        }
        if let Some(status) = req.status {
            body["status"] = serde_json::to_value(status)?;
        }
        if let Some(vrf) = req.vrf {
            body["vrf"] = serde_json::Value::from(vrf);
        }
        if let Some(dns_name) = req.dns_name {
            body["dns_name"] = serde_json::Value::String(dns_name);
        }
        if let Some(tags) = req.tags {
            let tags: Vec<serde_json::Value> = tags
                .into_iter()
                .map(|slug| serde_json::json!({ "slug": slug }))
                .collect();
            body["tags"] = serde_json::Value::Array(tags);
        }
    }

    Ok(body)
}

#[async_trait::async_trait]
impl NetBoxClientTrait for NetBoxClient {
    fn base_url(&self) -> &str {
        self.base_url()
    }

    async fn validate_token(&self) -> Result<(), NetBoxError> {
        self.validate_token().await
    }

    async fn get_prefix(&self, id: u64) -> Result<Prefix, NetBoxError> {
        self.get_prefix(id).await
    }

    async fn query_prefixes(&self, filters: &[(&str, &str)], fetch_all: bool) -> Result<Vec<Prefix>, NetBoxError> {
        self.query_prefixes(filters, fetch_all).await
    }

    async fn get_available_ips(&self, prefix_id: u64, limit: Option<u32>) -> Result<Vec<AvailableIP>, NetBoxError> {
        self.get_available_ips(prefix_id, limit).await
    }

    async fn query_ip_addresses(&self, filters: &[(&str, &str)], fetch_all: bool) -> Result<Vec<IPAddress>, NetBoxError> {
        self.query_ip_addresses(filters, fetch_all).await
    }

    async fn create_ip_address(&self, address: &str, request: Option<AllocateIPRequest>) -> Result<IPAddress, NetBoxError> {
        self.create_ip_address(address, request).await
    }

    async fn delete_ip_address(&self, id: u64) -> Result<(), NetBoxError> {
        self.delete_ip_address(id).await
    }

    async fn query_vrfs(&self, filters: &[(&str, &str)], fetch_all: bool) -> Result<Vec<Vrf>, NetBoxError> {
        self.query_vrfs(filters, fetch_all).await
    }

    async fn get_vrf_by_name(&self, name: &str) -> Result<Option<Vrf>, NetBoxError> {
        self.get_vrf_by_name(name).await
    }
}
