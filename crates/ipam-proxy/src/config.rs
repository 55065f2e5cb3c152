//! Proxy configuration, read from the environment at startup.

use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_NETBOX_URL: &str = "http://netbox.netbox:80";
pub const DEFAULT_LISTEN: &str = "0.0.0.0:8080";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    pub netbox_url: String,
    pub netbox_token: String,
    pub timeout: Duration,
    pub listen: SocketAddr,
    /// Check the token against NetBox before accepting requests
    pub validate_token: bool,
}

impl ProxyConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let netbox_url = get("NETBOX_URL").unwrap_or_else(|| DEFAULT_NETBOX_URL.to_string());
        let netbox_token = get("NETBOX_TOKEN").ok_or(ConfigError::Missing("NETBOX_TOKEN"))?;

        let timeout = match get("NETBOX_TIMEOUT_SECS") {
            Some(value) => match value.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => return Err(ConfigError::Invalid { name: "NETBOX_TIMEOUT_SECS", value }),
            },
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let listen_raw = get("IPAM_PROXY_LISTEN").unwrap_or_else(|| DEFAULT_LISTEN.to_string());
        let listen = listen_raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name: "IPAM_PROXY_LISTEN", value: listen_raw.clone() })?;

        let validate_token = match get("NETBOX_VALIDATE_TOKEN") {
            Some(value) => parse_bool(&value)
                .ok_or(ConfigError::Invalid { name: "NETBOX_VALIDATE_TOKEN", value })?,
            None => true,
        };

        Ok(Self {
            netbox_url: netbox_url.trim_end_matches('/').to_string(),
            netbox_token,
            timeout,
            listen,
            validate_token,
        })
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
