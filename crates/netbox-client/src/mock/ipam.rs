//! IPAM operations for MockNetBoxClient
//!
//! Handles prefixes, IP addresses, available IPs and VRFs. Filters mirror the
//! subset of NetBox's filtersets the proxy relies on.

use super::{lock, MockNetBoxClient};
use crate::error::NetBoxError;
use crate::models::*;
use ipnet::IpNet;
use std::collections::HashSet;
use std::net::IpAddr;

pub fn get_prefix(client: &MockNetBoxClient, id: u64) -> Result<Prefix, NetBoxError> {
    lock(&client.prefixes)
        .get(&id)
        .cloned()
        .ok_or_else(|| NetBoxError::NotFound(format!("Prefix {} not found", id)))
}

pub fn query_prefixes(client: &MockNetBoxClient, filters: &[(&str, &str)], _fetch_all: bool) -> Result<Vec<Prefix>, NetBoxError> {
    let mut results: Vec<Prefix> = lock(&client.prefixes).values().cloned().collect();

    for (key, value) in filters {
        match *key {
            "prefix" => {
                let wanted = parse_net(value)?;
                results.retain(|p| p.network().map(|n| n.trunc()) == Some(wanted));
            }
            "vrf_id" => results.retain(|p| vrf_matches(p.vrf.as_ref(), value)),
            "id" => results.retain(|p| p.id.to_string() == *value),
            _ => {}
        }
    }

    results.sort_by_key(|p| p.id);
    Ok(results)
}

pub fn get_available_ips(client: &MockNetBoxClient, prefix_id: u64, limit: Option<u32>) -> Result<Vec<AvailableIP>, NetBoxError> {
    let prefix = get_prefix(client, prefix_id)?;
    let network = prefix
        .network()
        .ok_or_else(|| NetBoxError::Api(format!("Prefix {} has invalid network {}", prefix_id, prefix.prefix)))?;
    let vrf_id = prefix.vrf.as_ref().map(|v| v.id);

    let taken: HashSet<IpAddr> = lock(&client.ip_addresses)
        .values()
        .filter(|ip| ip.vrf.as_ref().map(|v| v.id) == vrf_id)
        .filter_map(IPAddress::host)
        .collect();

    let limit = limit.map_or(usize::MAX, |l| l as usize);
    let available = network
        .hosts()
        .filter(|host| !taken.contains(host))
        .take(limit)
        .map(|host| AvailableIP {
            family: if host.is_ipv4() { 4 } else { 6 },
            address: format!("{}/{}", host, network.prefix_len()),
            vrf: prefix.vrf.clone(),
        })
        .collect();

    Ok(available)
}

pub fn query_ip_addresses(client: &MockNetBoxClient, filters: &[(&str, &str)], _fetch_all: bool) -> Result<Vec<IPAddress>, NetBoxError> {
    let mut results: Vec<IPAddress> = lock(&client.ip_addresses).values().cloned().collect();

    for (key, value) in filters {
        match *key {
            "address" => {
                let wanted = host_of(value)
                    .ok_or_else(|| NetBoxError::InvalidRequest(format!("Invalid address filter {}", value)))?;
                results.retain(|ip| ip.host() == Some(wanted));
            }
            "parent" => {
                let parent = parse_net(value)?;
                results.retain(|ip| ip.host().is_some_and(|host| parent.contains(&host)));
            }
            "vrf_id" => results.retain(|ip| vrf_matches(ip.vrf.as_ref(), value)),
            _ => {}
        }
    }

    results.sort_by_key(|ip| ip.id);
    Ok(results)
}

pub fn create_ip_address(client: &MockNetBoxClient, address: &str, request: Option<AllocateIPRequest>) -> Result<IPAddress, NetBoxError> {
    let host = host_of(address)
        .ok_or_else(|| NetBoxError::InvalidRequest(format!("Invalid address {}", address)))?;
    let request = request.unwrap_or_default();
    let vrf = request.vrf.and_then(|id| lock(&client.vrfs).get(&id).cloned());

    if vrf.as_ref().is_some_and(|v| v.enforce_unique) {
        let duplicate = lock(&client.ip_addresses)
            .values()
            .any(|ip| ip.host() == Some(host) && ip.vrf.as_ref().map(|v| v.id) == request.vrf);
        if duplicate {
            return Err(NetBoxError::InvalidRequest(format!(
                "Duplicate IP address found in VRF: {}",
                address
            )));
        }
    }

    let id = client.next_id();
    let helpers = client.helpers();
    let mut ip = helpers.build_ip_address(id, address, vrf.as_ref(), &request.description.unwrap_or_default());
    if let Some(status) = request.status {
        let label = format!("{:?}", status);
        ip.status = ChoiceField::new(status, label);
    }
    ip.dns_name = request.dns_name.unwrap_or_default();
    ip.tags = request
        .tags
        .unwrap_or_default()
        .iter()
        .map(|slug| helpers.create_nested_tag(slug))
        .collect();

    lock(&client.ip_addresses).insert(id, ip.clone());
    Ok(ip)
}

pub fn delete_ip_address(client: &MockNetBoxClient, id: u64) -> Result<(), NetBoxError> {
    lock(&client.ip_addresses)
        .remove(&id)
        .map(|_| ())
        .ok_or_else(|| NetBoxError::NotFound(format!("IP address {} not found", id)))
}

pub fn query_vrfs(client: &MockNetBoxClient, filters: &[(&str, &str)], _fetch_all: bool) -> Result<Vec<Vrf>, NetBoxError> {
    let mut results: Vec<Vrf> = lock(&client.vrfs).values().cloned().collect();

    for (key, value) in filters {
        if *key == "name" {
            results.retain(|vrf| vrf.name.eq_ignore_ascii_case(value));
        }
    }

    results.sort_by_key(|vrf| vrf.id);
    Ok(results)
}

pub fn get_vrf_by_name(client: &MockNetBoxClient, name: &str) -> Result<Option<Vrf>, NetBoxError> {
    Ok(query_vrfs(client, &[("name", name)], false)?
        .into_iter()
        .find(|vrf| vrf.name == name))
}

fn parse_net(value: &str) -> Result<IpNet, NetBoxError> {
    value
        .parse::<IpNet>()
        .map(|net| net.trunc())
        .map_err(|e| NetBoxError::InvalidRequest(format!("Invalid prefix filter {}: {}", value, e)))
}

// NetBox accepts `vrf_id=null` for the global table
fn vrf_matches(vrf: Option<&NestedVrf>, value: &str) -> bool {
    match vrf {
        Some(vrf) => vrf.id.to_string() == value,
        None => value == "null",
    }
}
