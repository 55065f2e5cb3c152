//! Request orchestration.
//!
//! [`IpamService`] takes validated requests, talks to the [`IpamProvider`] and
//! maps every outcome onto the response contract. It holds no state of its own
//! beyond the provider handle.

use crate::envelope::{Envelope, IpReply};
use crate::error::ApiError;
use crate::provider::{IpamProvider, ProviderError, SubnetRecord, ADD_IP_DESCRIPTION};
use crate::request::{GroupSubnetQuery, IpRequest, NextIpRequest, SubnetQuery};
use crate::validate::Cidr;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::{debug, warn};

/// Message returned by both group endpoints
pub const GROUPS_UNSUPPORTED: &str = "Groups are not supported";

#[derive(Clone)]
pub struct IpamService {
    provider: Arc<dyn IpamProvider>,
}

impl IpamService {
    pub fn new(provider: Arc<dyn IpamProvider>) -> Self {
        Self { provider }
    }

    /// Next free address in the subnet.
    pub async fn next_ip(&self, req: &NextIpRequest) -> Result<IpAddr, ApiError> {
        let subnet = self.resolve_loosely(&req.cidr, req.group.as_deref()).await?;

        let next = self
            .provider
            .next_available_ip(subnet.id, &req.mac, req.group.as_deref(), &req.cidr)
            .await
            .map_err(fault)?;

        next.ok_or_else(|| ApiError::NotFound(format!("No free addresses found in subnet {}", req.cidr)))
    }

    /// Subnet record for a CIDR; the group, when given, must contain it.
    pub async fn get_subnet(&self, req: &SubnetQuery) -> Result<SubnetRecord, ApiError> {
        self.provider
            .resolve_subnet(&req.cidr, req.group.as_deref())
            .await
            .map_err(fault)?
            .ok_or(ApiError::Absent)
    }

    pub fn list_groups(&self) -> Envelope<()> {
        Envelope::error(GROUPS_UNSUPPORTED)
    }

    pub fn get_group(&self, group: &str) -> Envelope<()> {
        debug!("Group lookup for {} is not supported", group);
        Envelope::error(GROUPS_UNSUPPORTED)
    }

    /// All subnets of a group.
    pub async fn group_subnets(&self, group: &str) -> Result<Vec<SubnetRecord>, ApiError> {
        let section = self
            .provider
            .resolve_section(group)
            .await
            .map_err(fault)?
            .ok_or_else(|| ApiError::NotFound(format!("No section {} found", group)))?;

        self.provider.list_subnets(section.id).await.map_err(fault)
    }

    /// Existence check; any group on the request is ignored.
    pub async fn check_ip(&self, req: &IpRequest) -> Result<IpReply, ApiError> {
        let subnet = self.resolve_loosely(&req.cidr, None).await?;

        if self.provider.ip_exists(req.ip, subnet.id).await.map_err(fault)? {
            Ok(IpReply { ip: req.ip })
        } else {
            Err(ApiError::NotFound(format!(
                "IP {} was not found in subnet {}",
                req.ip, req.cidr
            )))
        }
    }

    pub async fn add_ip(&self, req: &IpRequest) -> Result<IpReply, ApiError> {
        let subnet = self.resolve_loosely(&req.cidr, req.group.as_deref()).await?;

        match self
            .provider
            .add_ip(req.ip, subnet.id, ADD_IP_DESCRIPTION)
            .await
            .map_err(fault)?
        {
            None => {
                debug!("Added {} to subnet {}", req.ip, req.cidr);
                Ok(IpReply { ip: req.ip })
            }
            Some(payload) => Err(ApiError::Rejected(payload)),
        }
    }

    pub async fn delete_ip(&self, req: &IpRequest) -> Result<(), ApiError> {
        let subnet = self.resolve_loosely(&req.cidr, req.group.as_deref()).await?;

        match self.provider.delete_ip(req.ip, subnet.id).await.map_err(fault)? {
            None => {
                debug!("Deleted {} from subnet {}", req.ip, req.cidr);
                Ok(())
            }
            Some(payload) => Err(ApiError::Rejected(payload)),
        }
    }

    /// Subnet record, only if it belongs to the group.
    pub async fn subnet_in_group(&self, req: &GroupSubnetQuery) -> Result<SubnetRecord, ApiError> {
        self.provider
            .resolve_subnet(&req.cidr, Some(&req.group))
            .await
            .map_err(fault)?
            .ok_or(ApiError::Absent)
    }

    /// Resolve within the group first, then anywhere.
    async fn resolve_loosely(&self, cidr: &Cidr, group: Option<&str>) -> Result<SubnetRecord, ApiError> {
        if let Some(group) = group {
            if let Some(subnet) = self.provider.resolve_subnet(cidr, Some(group)).await.map_err(fault)? {
                return Ok(subnet);
            }
            debug!("Subnet {} not found in group {}, retrying without group", cidr, group);
        }

        self.provider
            .resolve_subnet(cidr, None)
            .await
            .map_err(fault)?
            .ok_or_else(|| ApiError::NotFound(format!("No subnet {} found", cidr)))
    }
}

fn fault(err: ProviderError) -> ApiError {
    match &err {
        ProviderError::Connectivity(cause) => debug!("IPAM backend unreachable: {}", cause),
        ProviderError::Backend(message) => warn!("IPAM backend error: {}", message),
    }
    err.into()
}
