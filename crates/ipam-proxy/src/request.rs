//! Typed, validated request inputs.
//!
//! Each operation gets its own struct, built once from the raw path and query
//! strings. Construction runs every check from [`crate::validate`], so the
//! service layer never sees malformed input.

use crate::validate::{ip_in_cidr, parse_cidr, parse_ip, require_params, Cidr, ValidationError};
use std::net::IpAddr;

/// `GET /subnet/{address}/{prefix}/next_ip`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextIpRequest {
    pub cidr: Cidr,
    pub mac: String,
    pub group: Option<String>,
}

impl NextIpRequest {
    pub fn parse(
        address: Option<&str>,
        prefix: Option<&str>,
        mac: Option<&str>,
        group: Option<&str>,
    ) -> Result<Self, ValidationError> {
        require_params(&[("address", address), ("prefix", prefix), ("mac", mac)])?;
        Ok(Self {
            cidr: parse_cidr(address.unwrap_or_default(), prefix.unwrap_or_default())?,
            mac: mac.unwrap_or_default().trim().to_string(),
            group: group_name(group),
        })
    }
}

/// `GET /subnet/{address}/{prefix}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubnetQuery {
    pub cidr: Cidr,
    pub group: Option<String>,
}

impl SubnetQuery {
    pub fn parse(address: Option<&str>, prefix: Option<&str>, group: Option<&str>) -> Result<Self, ValidationError> {
        require_params(&[("address", address), ("prefix", prefix)])?;
        Ok(Self {
            cidr: parse_cidr(address.unwrap_or_default(), prefix.unwrap_or_default())?,
            group: group_name(group),
        })
    }
}

/// Existence check, add and delete of a single address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpRequest {
    pub cidr: Cidr,
    pub ip: IpAddr,
    pub group: Option<String>,
}

impl IpRequest {
    /// Checks run in order: required parameters, IP syntax, CIDR syntax, membership.
    pub fn parse(
        address: Option<&str>,
        prefix: Option<&str>,
        ip: Option<&str>,
        group: Option<&str>,
    ) -> Result<Self, ValidationError> {
        require_params(&[("address", address), ("prefix", prefix), ("ip", ip)])?;
        let ip = parse_ip(ip.unwrap_or_default())?;
        let cidr = parse_cidr(address.unwrap_or_default(), prefix.unwrap_or_default())?;
        ip_in_cidr(&ip, &cidr)?;
        Ok(Self {
            cidr,
            ip,
            group: group_name(group),
        })
    }
}

/// `GET /group/{group}/subnet/{address}/{prefix}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSubnetQuery {
    pub cidr: Cidr,
    pub group: String,
}

impl GroupSubnetQuery {
    pub fn parse(address: Option<&str>, prefix: Option<&str>, group: Option<&str>) -> Result<Self, ValidationError> {
        require_params(&[("address", address), ("prefix", prefix), ("group", group)])?;
        Ok(Self {
            cidr: parse_cidr(address.unwrap_or_default(), prefix.unwrap_or_default())?,
            group: group.unwrap_or_default().trim().to_string(),
        })
    }
}

/// Non-empty group name
pub fn require_group(group: Option<&str>) -> Result<String, ValidationError> {
    require_params(&[("group", group)])?;
    Ok(group.unwrap_or_default().trim().to_string())
}

// An empty `group=` is the same as no group.
fn group_name(group: Option<&str>) -> Option<String> {
    group.map(str::trim).filter(|g| !g.is_empty()).map(str::to_string)
}
