//! Test utilities for unit testing the service layer
//!
//! [`FakeProvider`] is an in-memory [`IpamProvider`] that counts every call,
//! so tests can assert that validation failures never reach the backend.

use crate::provider::{error_payload, ErrorPayload, IpamProvider, ProviderError, Section, SubnetRecord};
use crate::validate::{parse_cidr, Cidr};
use std::collections::{HashMap, HashSet};
use std::net::IpAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Default)]
pub struct FakeProvider {
    subnets: Mutex<Vec<(Cidr, Option<String>, SubnetRecord)>>,
    sections: Mutex<Vec<(Section, Vec<SubnetRecord>)>>,
    addresses: Mutex<HashSet<(u64, IpAddr)>>,
    free: Mutex<HashMap<u64, IpAddr>>,
    rejection: Mutex<Option<ErrorPayload>>,
    backend_error: Mutex<Option<String>>,
    unreachable: AtomicBool,
    calls: AtomicUsize,
}

/// Build a CIDR from "address/prefix"
pub fn cidr(s: &str) -> Cidr {
    let (address, prefix) = s.split_once('/').unwrap();
    parse_cidr(address, prefix).unwrap()
}

pub fn record(cidr_str: &str, id: u64, description: &str) -> SubnetRecord {
    let c = cidr(cidr_str);
    SubnetRecord {
        subnet: c.network().to_string(),
        mask: c.prefix_len().to_string(),
        description: description.to_string(),
        id,
    }
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subnet, globally (`group = None`) or inside a group
    pub fn with_subnet(self, cidr_str: &str, group: Option<&str>, id: u64) -> Self {
        self.subnets
            .lock()
            .unwrap()
            .push((cidr(cidr_str), group.map(str::to_string), record(cidr_str, id, "")));
        self
    }

    pub fn with_section(self, id: u64, name: &str, subnets: Vec<SubnetRecord>) -> Self {
        let section = Section {
            id,
            name: name.to_string(),
            description: String::new(),
        };
        self.sections.lock().unwrap().push((section, subnets));
        self
    }

    pub fn with_ip(self, subnet_id: u64, ip: &str) -> Self {
        self.addresses.lock().unwrap().insert((subnet_id, ip.parse().unwrap()));
        self
    }

    pub fn with_free_ip(self, subnet_id: u64, ip: &str) -> Self {
        self.free.lock().unwrap().insert(subnet_id, ip.parse().unwrap());
        self
    }

    /// Make every mutation fail with this payload
    pub fn rejecting(self, payload: ErrorPayload) -> Self {
        *self.rejection.lock().unwrap() = Some(payload);
        self
    }

    /// Make every call fail with a backend error
    pub fn failing(self, message: &str) -> Self {
        *self.backend_error.lock().unwrap() = Some(message.to_string());
        self
    }

    pub fn unreachable(self) -> Self {
        self.unreachable.store(true, Ordering::SeqCst);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn has_ip(&self, subnet_id: u64, ip: &str) -> bool {
        self.addresses.lock().unwrap().contains(&(subnet_id, ip.parse().unwrap()))
    }

    fn enter(&self) -> Result<(), ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(ProviderError::Connectivity("connection reset by peer".to_string()));
        }
        match self.backend_error.lock().unwrap().clone() {
            Some(message) => Err(ProviderError::Backend(message)),
            None => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl IpamProvider for FakeProvider {
    async fn resolve_subnet(&self, cidr: &Cidr, group: Option<&str>) -> Result<Option<SubnetRecord>, ProviderError> {
        self.enter()?;
        Ok(self
            .subnets
            .lock()
            .unwrap()
            .iter()
            .find(|(c, g, _)| c == cidr && g.as_deref() == group)
            .map(|(_, _, rec)| rec.clone()))
    }

    async fn resolve_section(&self, group: &str) -> Result<Option<Section>, ProviderError> {
        self.enter()?;
        Ok(self
            .sections
            .lock()
            .unwrap()
            .iter()
            .find(|(s, _)| s.name == group)
            .map(|(s, _)| s.clone()))
    }

    async fn list_subnets(&self, section_id: u64) -> Result<Vec<SubnetRecord>, ProviderError> {
        self.enter()?;
        Ok(self
            .sections
            .lock()
            .unwrap()
            .iter()
            .find(|(s, _)| s.id == section_id)
            .map(|(_, subnets)| subnets.clone())
            .unwrap_or_default())
    }

    async fn next_available_ip(
        &self,
        subnet_id: u64,
        _mac: &str,
        _group: Option<&str>,
        _cidr: &Cidr,
    ) -> Result<Option<IpAddr>, ProviderError> {
        self.enter()?;
        Ok(self.free.lock().unwrap().get(&subnet_id).copied())
    }

    async fn ip_exists(&self, ip: IpAddr, subnet_id: u64) -> Result<bool, ProviderError> {
        self.enter()?;
        Ok(self.addresses.lock().unwrap().contains(&(subnet_id, ip)))
    }

    async fn add_ip(&self, ip: IpAddr, subnet_id: u64, _description: &str) -> Result<Option<ErrorPayload>, ProviderError> {
        self.enter()?;
        if let Some(payload) = self.rejection.lock().unwrap().clone() {
            return Ok(Some(payload));
        }
        if !self.addresses.lock().unwrap().insert((subnet_id, ip)) {
            return Ok(Some(error_payload(format!("IP {} already exists", ip))));
        }
        Ok(None)
    }

    async fn delete_ip(&self, ip: IpAddr, subnet_id: u64) -> Result<Option<ErrorPayload>, ProviderError> {
        self.enter()?;
        if let Some(payload) = self.rejection.lock().unwrap().clone() {
            return Ok(Some(payload));
        }
        if !self.addresses.lock().unwrap().remove(&(subnet_id, ip)) {
            return Ok(Some(error_payload(format!("IP {} not found", ip))));
        }
        Ok(None)
    }
}
