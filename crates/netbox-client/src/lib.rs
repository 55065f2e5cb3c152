//! NetBox REST API Client
//!
//! A Rust client library for the IPAM part of the NetBox REST API.
//! Provides type-safe models and methods for prefixes, IP addresses and VRFs.
//!
//! # Example
//!
//! ```no_run
//! use netbox_client::{NetBoxClient, AllocateIPRequest, IPAddressStatus};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Create a client
//! let client = NetBoxClient::new(
//!     "http://netbox:80".to_string(),
//!     "your-api-token".to_string(),
//! )?;
//!
//! // Resolve a prefix
//! let prefixes = client.query_prefixes(&[("prefix", "10.100.60.0/24")], false).await?;
//!
//! // Ask NetBox for the next free address
//! let free = client.get_available_ips(prefixes[0].id, Some(1)).await?;
//!
//! // Record an address
//! let request = AllocateIPRequest {
//!     description: Some("Address auto added by Foreman".to_string()),
//!     status: Some(IPAddressStatus::Active),
//!     ..Default::default()
//! };
//! let ip = client.create_ip_address(&free[0].address, Some(request)).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - **IPAM Operations**: Query prefixes, available IPs, IP addresses and VRFs
//! - **Pagination**: Support for fetching all pages of large result sets
//! - **Fault classification**: connectivity failures surface as [`NetBoxError::Unreachable`]
//! - **Mocking**: `test-util` feature exposes an in-memory [`MockNetBoxClient`]

pub mod client;
pub mod common;
pub mod error;
pub mod models;
#[path = "trait.rs"]
pub mod netbox_trait;
#[cfg(feature = "test-util")]
pub mod mock;

pub use client::NetBoxClient;
pub use common::{HttpClient, PaginatedResponse};
pub use error::NetBoxError;
pub use models::*;
pub use netbox_trait::NetBoxClientTrait;
#[cfg(feature = "test-util")]
pub use mock::MockNetBoxClient;
