//! Mock NetBoxClient for unit testing
//!
//! This module provides a mock implementation of NetBoxClientTrait that can be used
//! in unit tests without requiring a running NetBox instance.
//!
//! - `ipam.rs` - prefixes, IP addresses, available IPs and VRFs
//! - `helpers.rs` - builders for nested types and choice fields
//!
//! Two failure switches let tests exercise error paths: [`MockNetBoxClient::set_unreachable`]
//! makes every call fail as if the connection were refused, and
//! [`MockNetBoxClient::set_write_error`] makes create/delete calls fail with an API error
//! ([`MockNetBoxClient::set_write_error_after`] lets a number of writes through first).

mod helpers;
mod ipam;

use crate::error::NetBoxError;
use crate::models::*;
use crate::netbox_trait::NetBoxClientTrait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Mock NetBoxClient for testing
///
/// This mock stores resources in memory and can be configured to return
/// specific responses for testing different scenarios.
#[derive(Clone)]
pub struct MockNetBoxClient {
    pub(crate) base_url: String,
    // In-memory storage for resources
    pub(crate) prefixes: Arc<Mutex<HashMap<u64, Prefix>>>,
    pub(crate) ip_addresses: Arc<Mutex<HashMap<u64, IPAddress>>>,
    pub(crate) vrfs: Arc<Mutex<HashMap<u64, Vrf>>>,
    // Counter for generating IDs
    pub(crate) next_id: Arc<Mutex<u64>>,
    // Failure injection
    pub(crate) unreachable: Arc<AtomicBool>,
    // (writes still allowed, message once exhausted)
    pub(crate) write_error: Arc<Mutex<Option<(usize, String)>>>,
    pub(crate) calls: Arc<AtomicUsize>,
}

impl MockNetBoxClient {
    /// Create a new mock client
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            prefixes: Arc::new(Mutex::new(HashMap::new())),
            ip_addresses: Arc::new(Mutex::new(HashMap::new())),
            vrfs: Arc::new(Mutex::new(HashMap::new())),
            next_id: Arc::new(Mutex::new(1)),
            unreachable: Arc::new(AtomicBool::new(false)),
            write_error: Arc::new(Mutex::new(None)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Add a prefix to the mock store (for test setup)
    pub fn add_prefix(&self, prefix: Prefix) {
        lock(&self.prefixes).insert(prefix.id, prefix);
    }

    /// Add an IP address to the mock store (for test setup)
    pub fn add_ip_address(&self, ip: IPAddress) {
        lock(&self.ip_addresses).insert(ip.id, ip);
    }

    /// Add a VRF to the mock store (for test setup)
    pub fn add_vrf(&self, vrf: Vrf) {
        lock(&self.vrfs).insert(vrf.id, vrf);
    }

    /// Create and store a prefix, optionally inside a VRF
    pub fn seed_prefix(&self, prefix: &str, vrf_id: Option<u64>, description: &str) -> Prefix {
        let id = self.next_id();
        let vrf = vrf_id.and_then(|vrf_id| lock(&self.vrfs).get(&vrf_id).cloned());
        let prefix = self.helpers().build_prefix(id, prefix, vrf.as_ref(), description);
        self.add_prefix(prefix.clone());
        prefix
    }

    /// Create and store a VRF
    pub fn seed_vrf(&self, name: &str) -> Vrf {
        let id = self.next_id();
        let vrf = self.helpers().build_vrf(id, name);
        self.add_vrf(vrf.clone());
        vrf
    }

    /// Create and store an IP address (e.g. "10.0.0.5/24"), optionally inside a VRF
    pub fn seed_ip_address(&self, address: &str, vrf_id: Option<u64>) -> IPAddress {
        let id = self.next_id();
        let vrf = vrf_id.and_then(|vrf_id| lock(&self.vrfs).get(&vrf_id).cloned());
        let ip = self.helpers().build_ip_address(id, address, vrf.as_ref(), "");
        self.add_ip_address(ip.clone());
        ip
    }

    /// Snapshot of all stored IP addresses
    pub fn ip_addresses(&self) -> Vec<IPAddress> {
        lock(&self.ip_addresses).values().cloned().collect()
    }

    /// Simulate a NetBox that refuses connections
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    /// Make create/delete calls fail with `NetBoxError::Api(message)`
    pub fn set_write_error(&self, message: Option<&str>) {
        *lock(&self.write_error) = message.map(|m| (0, m.to_string()));
    }

    /// Let `successes` more create/delete calls through, then fail the rest
    pub fn set_write_error_after(&self, successes: usize, message: &str) {
        *lock(&self.write_error) = Some((successes, message.to_string()));
    }

    /// Number of trait calls served so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Generate next ID
    pub(crate) fn next_id(&self) -> u64 {
        let mut id = lock(&self.next_id);
        let current = *id;
        *id += 1;
        current
    }

    /// Get helpers instance
    pub(crate) fn helpers(&self) -> helpers::Helpers {
        helpers::Helpers::new(self.base_url.clone())
    }

    /// Count the call and fail it if the backend is marked unreachable
    pub(crate) fn enter(&self) -> Result<(), NetBoxError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(NetBoxError::Unreachable(
                "Connection refused (os error 111)".to_string(),
            ));
        }
        Ok(())
    }

    pub(crate) fn check_write(&self) -> Result<(), NetBoxError> {
        match lock(&self.write_error).as_mut() {
            Some((0, message)) => Err(NetBoxError::Api(message.clone())),
            Some((remaining, _)) => {
                *remaining -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }
}

/// Lock a store, recovering the data if a panicking test poisoned it
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait::async_trait]
impl NetBoxClientTrait for MockNetBoxClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn validate_token(&self) -> Result<(), NetBoxError> {
        self.enter()
    }

    async fn get_prefix(&self, id: u64) -> Result<Prefix, NetBoxError> {
        self.enter()?;
        ipam::get_prefix(self, id)
    }

    async fn query_prefixes(&self, filters: &[(&str, &str)], fetch_all: bool) -> Result<Vec<Prefix>, NetBoxError> {
        self.enter()?;
        ipam::query_prefixes(self, filters, fetch_all)
    }

    async fn get_available_ips(&self, prefix_id: u64, limit: Option<u32>) -> Result<Vec<AvailableIP>, NetBoxError> {
        self.enter()?;
        ipam::get_available_ips(self, prefix_id, limit)
    }

    async fn query_ip_addresses(&self, filters: &[(&str, &str)], fetch_all: bool) -> Result<Vec<IPAddress>, NetBoxError> {
        self.enter()?;
        ipam::query_ip_addresses(self, filters, fetch_all)
    }

    async fn create_ip_address(&self, address: &str, request: Option<AllocateIPRequest>) -> Result<IPAddress, NetBoxError> {
        self.enter()?;
        self.check_write()?;
        ipam::create_ip_address(self, address, request)
    }

    async fn delete_ip_address(&self, id: u64) -> Result<(), NetBoxError> {
        self.enter()?;
        self.check_write()?;
        ipam::delete_ip_address(self, id)
    }

    async fn query_vrfs(&self, filters: &[(&str, &str)], fetch_all: bool) -> Result<Vec<Vrf>, NetBoxError> {
        self.enter()?;
        ipam::query_vrfs(self, filters, fetch_all)
    }

    async fn get_vrf_by_name(&self, name: &str) -> Result<Option<Vrf>, NetBoxError> {
        self.enter()?;
        ipam::get_vrf_by_name(self, name)
    }
}
