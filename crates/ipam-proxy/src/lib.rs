//! Foreman smart-proxy external IPAM API backed by NetBox.
//!
//! Requests flow through three layers:
//!
//! - [`request`] / [`validate`]: path and query strings become typed, checked inputs
//! - [`service`]: orchestrates lookups and mutations against an [`provider::IpamProvider`]
//! - [`api`]: axum handlers and router, rendering [`envelope::Envelope`] and [`error::ApiError`]
//!
//! NetBox is reached through [`provider::NetBoxProvider`], which maps subnets to
//! prefixes and groups to VRFs.

pub mod api;
pub mod config;
pub mod envelope;
pub mod error;
pub mod provider;
pub mod request;
pub mod service;
pub mod validate;

#[cfg(test)]
mod service_test;
#[cfg(test)]
mod test_utils;

pub use api::create_router;
pub use config::{ConfigError, ProxyConfig};
pub use error::ApiError;
pub use provider::{IpamProvider, NetBoxProvider, ProviderError};
pub use service::IpamService;
