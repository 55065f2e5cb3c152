//! Helper functions for creating NetBox model types in the mock

use crate::models::*;

/// Helper functions for creating nested types in mock implementations
pub struct Helpers {
    base_url: String,
}

impl Helpers {
    pub fn new(base_url: String) -> Self {
        Self { base_url }
    }

    /// Helper to create NestedVrf from a full VRF
    pub fn create_nested_vrf(&self, vrf: &Vrf) -> NestedVrf {
        NestedVrf {
            id: vrf.id,
            url: format!("{}/api/ipam/vrfs/{}/", self.base_url, vrf.id),
            display: vrf.name.clone(),
            name: vrf.name.clone(),
            rd: vrf.rd.clone(),
        }
    }

    /// Helper to create NestedTag from a slug
    pub fn create_nested_tag(&self, slug: &str) -> NestedTag {
        NestedTag {
            id: 0,
            url: format!("{}/api/extras/tags/0/", self.base_url),
            display: slug.to_string(),
            name: slug.to_string(),
            slug: slug.to_lowercase().replace(' ', "-"),
        }
    }

    pub fn build_vrf(&self, id: u64, name: &str) -> Vrf {
        Vrf {
            id,
            url: format!("{}/api/ipam/vrfs/{}/", self.base_url, id),
            display: name.to_string(),
            name: name.to_string(),
            rd: None,
            tenant: None,
            enforce_unique: true,
            description: String::new(),
            tags: vec![],
            created: Some(chrono::Utc::now().to_rfc3339()),
            last_updated: Some(chrono::Utc::now().to_rfc3339()),
        }
    }

    pub fn build_prefix(&self, id: u64, prefix: &str, vrf: Option<&Vrf>, description: &str) -> Prefix {
        Prefix {
            id,
            url: format!("{}/api/ipam/prefixes/{}/", self.base_url, id),
            display: prefix.to_string(),
            family: family_of(prefix),
            prefix: prefix.to_string(),
            vrf: vrf.map(|vrf| self.create_nested_vrf(vrf)),
            tenant: None,
            vlan: None,
            status: ChoiceField::new(PrefixStatus::Active, "Active"),
            is_pool: false,
            mark_utilized: false,
            description: description.to_string(),
            tags: vec![],
            custom_fields: serde_json::json!({}),
            created: Some(chrono::Utc::now().to_rfc3339()),
            last_updated: Some(chrono::Utc::now().to_rfc3339()),
        }
    }

    pub fn build_ip_address(&self, id: u64, address: &str, vrf: Option<&Vrf>, description: &str) -> IPAddress {
        IPAddress {
            id,
            url: format!("{}/api/ipam/ip-addresses/{}/", self.base_url, id),
            display: address.to_string(),
            family: family_of(address),
            address: address.to_string(),
            vrf: vrf.map(|vrf| self.create_nested_vrf(vrf)),
            tenant: None,
            status: ChoiceField::new(IPAddressStatus::Active, "Active"),
            dns_name: String::new(),
            description: description.to_string(),
            tags: vec![],
            custom_fields: serde_json::json!({}),
            created: Some(chrono::Utc::now().to_rfc3339()),
            last_updated: Some(chrono::Utc::now().to_rfc3339()),
        }
    }
}

fn family_of(address: &str) -> ChoiceField<u8> {
    if address.contains(':') {
        ChoiceField::new(6, "IPv6")
    } else {
        ChoiceField::new(4, "IPv4")
    }
}
