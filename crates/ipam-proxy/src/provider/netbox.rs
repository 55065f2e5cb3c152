//! NetBox-backed IPAM provider.
//!
//! Subnets are NetBox prefixes and groups are VRFs. Address allocation is
//! delegated to NetBox's `available-ips` endpoint.

use super::{error_payload, ErrorPayload, IpamProvider, ProviderError, Section, SubnetRecord};
use crate::validate::Cidr;
use ipnet::IpNet;
use netbox_client::{AllocateIPRequest, IPAddress, IPAddressStatus, NetBoxClientTrait, NetBoxError, Prefix};
use std::net::IpAddr;
use std::sync::Arc;
use tracing::{debug, warn};

const SUBNET_MISSING: &str = "The specified subnet does not exist in NetBox.";

impl From<NetBoxError> for ProviderError {
    fn from(err: NetBoxError) -> Self {
        match err {
            NetBoxError::Unreachable(cause) => ProviderError::Connectivity(cause),
            other => ProviderError::Backend(other.to_string()),
        }
    }
}

/// [`IpamProvider`] over the NetBox REST API.
#[derive(Clone)]
pub struct NetBoxProvider {
    client: Arc<dyn NetBoxClientTrait>,
}

impl NetBoxProvider {
    pub fn new(client: Arc<dyn NetBoxClientTrait>) -> Self {
        Self { client }
    }

    async fn find_prefix(&self, cidr: &Cidr, vrf_id: Option<u64>) -> Result<Option<Prefix>, NetBoxError> {
        let wanted = cidr.to_string();
        let vrf_filter = vrf_id.map(|id| id.to_string());

        let mut filters = vec![("prefix", wanted.as_str())];
        if let Some(vrf) = vrf_filter.as_deref() {
            filters.push(("vrf_id", vrf));
        }

        let prefixes = self.client.query_prefixes(&filters, false).await?;
        if prefixes.len() > 1 {
            debug!("{} prefixes match {}, preferring the global table", prefixes.len(), wanted);
        }

        // Without a VRF filter the same CIDR may exist in several VRFs.
        let global = prefixes.iter().position(|p| p.vrf.is_none());
        Ok(match global {
            Some(idx) => prefixes.into_iter().nth(idx),
            None => prefixes.into_iter().next(),
        })
    }

    /// Address records for `ip` inside `prefix`, restricted to the prefix's VRF
    async fn addresses_in(&self, prefix: &Prefix, ip: IpAddr) -> Result<Vec<IPAddress>, NetBoxError> {
        let address = ip.to_string();
        let vrf = prefix
            .vrf
            .as_ref()
            .map_or_else(|| "null".to_string(), |v| v.id.to_string());
        let filters = [
            ("address", address.as_str()),
            ("parent", prefix.prefix.as_str()),
            ("vrf_id", vrf.as_str()),
        ];

        let found = self.client.query_ip_addresses(&filters, false).await?;
        Ok(found.into_iter().filter(|rec| rec.host() == Some(ip)).collect())
    }

    async fn try_add_ip(&self, ip: IpAddr, subnet_id: u64, description: &str) -> Result<Option<ErrorPayload>, NetBoxError> {
        let prefix = match self.client.get_prefix(subnet_id).await {
            Ok(prefix) => prefix,
            Err(NetBoxError::NotFound(_)) => return Ok(Some(error_payload(SUBNET_MISSING))),
            Err(err) => return Err(err),
        };
        let network = network_of(&prefix)?;

        if !self.addresses_in(&prefix, ip).await?.is_empty() {
            return Ok(Some(error_payload(format!(
                "IP {} already exists in subnet {}",
                ip, prefix.prefix
            ))));
        }

        let request = AllocateIPRequest {
            description: Some(description.to_string()),
            status: Some(IPAddressStatus::Active),
            vrf: prefix.vrf.as_ref().map(|v| v.id),
            ..Default::default()
        };
        let address = format!("{}/{}", ip, network.prefix_len());
        let created = self.client.create_ip_address(&address, Some(request)).await?;
        debug!("Created IP address {} (id {}) in prefix {}", created.address, created.id, prefix.prefix);
        Ok(None)
    }

    async fn try_delete_ip(&self, ip: IpAddr, subnet_id: u64) -> Result<Option<ErrorPayload>, NetBoxError> {
        let prefix = match self.client.get_prefix(subnet_id).await {
            Ok(prefix) => prefix,
            Err(NetBoxError::NotFound(_)) => return Ok(Some(error_payload(SUBNET_MISSING))),
            Err(err) => return Err(err),
        };

        let records = self.addresses_in(&prefix, ip).await?;
        if records.is_empty() {
            return Ok(Some(error_payload(format!(
                "IP {} not found in subnet {}",
                ip, prefix.prefix
            ))));
        }

        let mut deleted: Vec<String> = Vec::new();
        for record in records {
            match self.client.delete_ip_address(record.id).await {
                Ok(()) => {
                    debug!("Deleted IP address {} (id {})", record.address, record.id);
                    deleted.push(record.address);
                }
                Err(err) if deleted.is_empty() || err.is_connectivity() => return Err(err),
                Err(err) => {
                    warn!("Delete of {} stopped after removing {:?}: {}", ip, deleted, err);
                    return Ok(Some(serde_json::json!({
                        "error": err.to_string(),
                        "deleted": deleted,
                    })));
                }
            }
        }
        Ok(None)
    }
}

/// Split a failed mutation into a connectivity fault or a rejection payload
fn rejection(err: NetBoxError) -> Result<Option<ErrorPayload>, ProviderError> {
    if err.is_connectivity() {
        Err(err.into())
    } else {
        warn!("NetBox rejected mutation: {}", err);
        Ok(Some(error_payload(err.to_string())))
    }
}

fn network_of(prefix: &Prefix) -> Result<IpNet, NetBoxError> {
    prefix
        .network()
        .ok_or_else(|| NetBoxError::Api(format!("Prefix {} has invalid network {}", prefix.id, prefix.prefix)))
}

fn subnet_record(prefix: &Prefix) -> Option<SubnetRecord> {
    let network = prefix.network()?;
    Some(SubnetRecord {
        subnet: network.network().to_string(),
        mask: network.prefix_len().to_string(),
        description: prefix.description.clone(),
        id: prefix.id,
    })
}

#[async_trait::async_trait]
impl IpamProvider for NetBoxProvider {
    async fn resolve_subnet(&self, cidr: &Cidr, group: Option<&str>) -> Result<Option<SubnetRecord>, ProviderError> {
        let vrf_id = match group {
            Some(name) => match self.client.get_vrf_by_name(name).await? {
                Some(vrf) => Some(vrf.id),
                None => {
                    debug!("VRF {} not found while resolving {}", name, cidr);
                    return Ok(None);
                }
            },
            None => None,
        };

        let prefix = self.find_prefix(cidr, vrf_id).await?;
        Ok(prefix.as_ref().and_then(subnet_record))
    }

    async fn resolve_section(&self, group: &str) -> Result<Option<Section>, ProviderError> {
        let vrf = self.client.get_vrf_by_name(group).await?;
        Ok(vrf.map(|vrf| Section {
            id: vrf.id,
            name: vrf.name,
            description: vrf.description,
        }))
    }

    async fn list_subnets(&self, section_id: u64) -> Result<Vec<SubnetRecord>, ProviderError> {
        let vrf = section_id.to_string();
        let prefixes = self.client.query_prefixes(&[("vrf_id", vrf.as_str())], true).await?;
        Ok(prefixes.iter().filter_map(subnet_record).collect())
    }

    async fn next_available_ip(
        &self,
        subnet_id: u64,
        mac: &str,
        group: Option<&str>,
        cidr: &Cidr,
    ) -> Result<Option<IpAddr>, ProviderError> {
        debug!("Next free address in {} (prefix {}) for {} group {:?}", cidr, subnet_id, mac, group);
        let available = self.client.get_available_ips(subnet_id, Some(1)).await?;
        Ok(available
            .iter()
            .filter_map(|candidate| candidate.host())
            .find(|host| cidr.contains(host)))
    }

    async fn ip_exists(&self, ip: IpAddr, subnet_id: u64) -> Result<bool, ProviderError> {
        let prefix = self.client.get_prefix(subnet_id).await?;
        Ok(!self.addresses_in(&prefix, ip).await?.is_empty())
    }

    async fn add_ip(&self, ip: IpAddr, subnet_id: u64, description: &str) -> Result<Option<ErrorPayload>, ProviderError> {
        self.try_add_ip(ip, subnet_id, description).await.or_else(rejection)
    }

    async fn delete_ip(&self, ip: IpAddr, subnet_id: u64) -> Result<Option<ErrorPayload>, ProviderError> {
        self.try_delete_ip(ip, subnet_id).await.or_else(rejection)
    }
}
