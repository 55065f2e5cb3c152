//! IPAM provider abstraction.
//!
//! The request handlers only talk to [`IpamProvider`]; the NetBox
//! implementation lives in [`netbox`]. Every method can fail with
//! [`ProviderError::Connectivity`], which callers must pass through untouched.

pub mod netbox;

use crate::validate::Cidr;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use thiserror::Error;

pub use netbox::NetBoxProvider;

/// Description recorded on addresses created through the proxy
pub const ADD_IP_DESCRIPTION: &str = "Address auto added by Foreman";

/// Error payload returned by a provider for a rejected mutation, e.g.
/// `{"error": "IP 10.0.0.5 already exists in subnet 10.0.0.0/24"}`
pub type ErrorPayload = serde_json::Value;

/// A subnet as reported back to the smart-proxy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubnetRecord {
    /// Network address, e.g. `10.100.60.0`
    pub subnet: String,
    /// Prefix length as a string, e.g. `24`
    pub mask: String,
    pub description: String,
    /// Backend identifier used for follow-up calls
    pub id: u64,
}

/// A named group of subnets (a VRF in NetBox).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: u64,
    pub name: String,
    pub description: String,
}

/// Failure talking to the IPAM backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// Backend unreachable, connection reset or timed out
    #[error("Unable to connect to External IPAM server: {0}")]
    Connectivity(String),

    /// Backend answered, but with an error
    #[error("{0}")]
    Backend(String),
}

/// Capability interface over an IPAM backend.
#[async_trait::async_trait]
pub trait IpamProvider: Send + Sync {
    /// Resolve a subnet, optionally only within the named group.
    async fn resolve_subnet(&self, cidr: &Cidr, group: Option<&str>) -> Result<Option<SubnetRecord>, ProviderError>;

    /// Resolve a group by exact name.
    async fn resolve_section(&self, group: &str) -> Result<Option<Section>, ProviderError>;

    /// All subnets belonging to a group.
    async fn list_subnets(&self, section_id: u64) -> Result<Vec<SubnetRecord>, ProviderError>;

    /// Next unallocated address in a subnet, `None` when the subnet is full.
    async fn next_available_ip(
        &self,
        subnet_id: u64,
        mac: &str,
        group: Option<&str>,
        cidr: &Cidr,
    ) -> Result<Option<IpAddr>, ProviderError>;

    /// Whether the address is recorded in the subnet.
    async fn ip_exists(&self, ip: IpAddr, subnet_id: u64) -> Result<bool, ProviderError>;

    /// Record an address. `Some(payload)` if the backend refused.
    async fn add_ip(&self, ip: IpAddr, subnet_id: u64, description: &str) -> Result<Option<ErrorPayload>, ProviderError>;

    /// Remove an address. `Some(payload)` if the backend refused.
    async fn delete_ip(&self, ip: IpAddr, subnet_id: u64) -> Result<Option<ErrorPayload>, ProviderError>;
}

/// Build the `{"error": message}` payload used for rejected mutations
pub fn error_payload(message: impl Into<String>) -> ErrorPayload {
    serde_json::json!({ "error": message.into() })
}
