//! Input validation.
//!
//! Pure checks applied to every request before the IPAM backend is touched.
//! Nothing in here performs I/O.

use ipnet::{IpNet, Ipv4Net, Ipv6Net};
use std::fmt;
use std::net::IpAddr;
use thiserror::Error;

/// Request rejected before reaching the backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// One or more required parameters were absent or empty
    #[error("Missing required parameters: {0}")]
    MissingParameter(String),

    /// Address is not an IP literal, or prefix is out of range for its family
    #[error("Invalid CIDR {address}/{prefix}")]
    InvalidCidr { address: String, prefix: String },

    /// Not an IPv4/IPv6 literal
    #[error("Invalid IP address {0}")]
    InvalidIp(String),

    /// The IP is not inside the subnet (includes family mismatch)
    #[error("IP {ip} is not within subnet {cidr}")]
    IpOutOfRange { ip: IpAddr, cidr: Cidr },
}

/// A validated IPv4 or IPv6 subnet.
///
/// Host bits are masked off on construction, so `10.0.0.7/24` and
/// `10.0.0.0/24` are the same value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cidr(IpNet);

impl Cidr {
    /// Network address of the subnet
    pub fn network(&self) -> IpAddr {
        self.0.network()
    }

    pub fn prefix_len(&self) -> u8 {
        self.0.prefix_len()
    }

    /// Membership test. An address of the other family is never a member.
    pub fn contains(&self, ip: &IpAddr) -> bool {
        match (self.0, ip) {
            (IpNet::V4(net), IpAddr::V4(ip)) => net.contains(ip),
            (IpNet::V6(net), IpAddr::V6(ip)) => net.contains(ip),
            _ => false,
        }
    }
}

impl fmt::Display for Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network(), self.prefix_len())
    }
}

/// Fail with `MissingParameter` naming every parameter that is absent or blank.
pub fn require_params(params: &[(&str, Option<&str>)]) -> Result<(), ValidationError> {
    let missing: Vec<&str> = params
        .iter()
        .filter(|(_, value)| value.is_none_or(|v| v.trim().is_empty()))
        .map(|(name, _)| *name)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::MissingParameter(missing.join(", ")))
    }
}

/// Parse `address` + `prefix` into a [`Cidr`].
pub fn parse_cidr(address: &str, prefix: &str) -> Result<Cidr, ValidationError> {
    let invalid = || ValidationError::InvalidCidr {
        address: address.to_string(),
        prefix: prefix.to_string(),
    };

    let addr: IpAddr = address.parse().map_err(|_| invalid())?;
    // Plain decimal only: `u8::from_str` would also take "+24"
    if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let len: u8 = prefix.parse().map_err(|_| invalid())?;

    let net = match addr {
        IpAddr::V4(v4) => Ipv4Net::new(v4, len).map(IpNet::V4),
        IpAddr::V6(v6) => Ipv6Net::new(v6, len).map(IpNet::V6),
    }
    .map_err(|_| invalid())?;

    Ok(Cidr(net.trunc()))
}

/// Parse a single IPv4/IPv6 literal.
pub fn parse_ip(ip: &str) -> Result<IpAddr, ValidationError> {
    ip.trim()
        .parse()
        .map_err(|_| ValidationError::InvalidIp(ip.to_string()))
}

/// Fail with `IpOutOfRange` unless `ip` lies inside `cidr`.
pub fn ip_in_cidr(ip: &IpAddr, cidr: &Cidr) -> Result<(), ValidationError> {
    if cidr.contains(ip) {
        Ok(())
    } else {
        Err(ValidationError::IpOutOfRange { ip: *ip, cidr: *cidr })
    }
}
