//! NetBox API models
//!
//! These models match the NetBox REST API serializers for the IPAM app.
//! See: netbox/netbox/ipam/api/serializers_/ip.py and vrfs.py

use ipnet::IpNet;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// Choice field as rendered by NetBox (`{"value": ..., "label": ...}`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChoiceField<T> {
    pub value: T,
    pub label: String,
}

impl<T> ChoiceField<T> {
    pub fn new(value: T, label: impl Into<String>) -> Self {
        Self { value, label: label.into() }
    }
}

/// Prefix model matching NetBox PrefixSerializer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Prefix {
    pub id: u64,
    pub url: String,
    #[serde(default)]
    pub display: String,
    pub family: ChoiceField<u8>, // 4 or 6
    pub prefix: String, // e.g., "192.168.1.0/24"
    #[serde(default)]
    pub vrf: Option<NestedVrf>,
    #[serde(default)]
    pub tenant: Option<NestedTenant>,
    #[serde(default)]
    pub vlan: Option<NestedVlan>,
    pub status: ChoiceField<PrefixStatus>,
    #[serde(default)]
    pub is_pool: bool,
    #[serde(default)]
    pub mark_utilized: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<NestedTag>,
    #[serde(default)]
    pub custom_fields: serde_json::Value,
    #[serde(default)]
    pub created: Option<String>, // ISO 8601 datetime
    #[serde(default)]
    pub last_updated: Option<String>, // ISO 8601 datetime
}

impl Prefix {
    /// Parsed network of this prefix, `None` if NetBox sent something unparsable
    pub fn network(&self) -> Option<IpNet> {
        self.prefix.parse().ok()
    }
}

/// IP Address model matching NetBox IPAddressSerializer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct IPAddress {
    pub id: u64,
    pub url: String,
    #[serde(default)]
    pub display: String,
    pub family: ChoiceField<u8>,
    pub address: String, // e.g., "192.168.1.1/24"
    #[serde(default)]
    pub vrf: Option<NestedVrf>,
    #[serde(default)]
    pub tenant: Option<NestedTenant>,
    pub status: ChoiceField<IPAddressStatus>,
    #[serde(default)]
    pub dns_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<NestedTag>,
    #[serde(default)]
    pub custom_fields: serde_json::Value,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub last_updated: Option<String>,
}

impl IPAddress {
    /// Host part of `address` without the mask length
    pub fn host(&self) -> Option<IpAddr> {
        host_of(&self.address)
    }
}

/// Available IP Address (from prefix available-ips endpoint)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AvailableIP {
    pub family: u8,
    pub address: String, // e.g., "192.168.1.1/24"
    #[serde(default)]
    pub vrf: Option<NestedVrf>,
}

impl AvailableIP {
    /// Host part of `address` without the mask length
    pub fn host(&self) -> Option<IpAddr> {
        host_of(&self.address)
    }
}

/// Optional fields for creating an IP address; the address itself is passed separately
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AllocateIPRequest {
    pub description: Option<String>,
    pub status: Option<IPAddressStatus>,
    pub vrf: Option<u64>, // VRF id
    pub dns_name: Option<String>,
    pub tags: Option<Vec<String>>, // Tag slugs
}

/// VRF model matching NetBox VRFSerializer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Vrf {
    pub id: u64,
    pub url: String,
    #[serde(default)]
    pub display: String,
    pub name: String,
    #[serde(default)]
    pub rd: Option<String>,
    #[serde(default)]
    pub tenant: Option<NestedTenant>,
    #[serde(default)]
    pub enforce_unique: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<NestedTag>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub last_updated: Option<String>,
}

// Nested serializers (simplified versions for references)

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct NestedVrf {
    pub id: u64,
    pub url: String,
    pub display: String,
    pub name: String,
    #[serde(default)]
    pub rd: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct NestedTenant {
    pub id: u64,
    pub url: String,
    pub display: String,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct NestedVlan {
    pub id: u64,
    pub url: String,
    pub display: String,
    pub vid: u16,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct NestedTag {
    pub id: u64,
    pub url: String,
    pub display: String,
    pub name: String,
    pub slug: String,
}

/// Prefix status choices
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum PrefixStatus {
    Container,
    Active,
    Reserved,
    Deprecated,
}

/// IP Address status choices
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum IPAddressStatus {
    Active,
    Reserved,
    Deprecated,
    Dhcp,
    #[serde(rename = "slaac")]
    Slaac,
}

/// Strip the mask length from a NetBox address string ("10.0.0.1/24" -> 10.0.0.1)
pub fn host_of(address: &str) -> Option<IpAddr> {
    address.split('/').next()?.parse().ok()
}
