//! IPAM proxy
//!
//! Serves the Foreman smart-proxy external IPAM API on top of NetBox.

use anyhow::Context;
use ipam_proxy::{create_router, IpamService, NetBoxProvider, ProxyConfig};
use netbox_client::NetBoxClient;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting NetBox IPAM proxy");

    let config = ProxyConfig::from_env().context("Failed to load configuration")?;

    info!("Configuration:");
    info!("  NetBox URL: {}", config.netbox_url);
    info!("  Timeout: {}s", config.timeout.as_secs());
    info!("  Listen: {}", config.listen);

    let client = NetBoxClient::with_timeout(config.netbox_url.clone(), config.netbox_token.clone(), config.timeout)
        .context("Failed to create NetBox client")?;

    if config.validate_token {
        client
            .validate_token()
            .await
            .context("NetBox rejected the configured token")?;
        info!("NetBox token validated");
    }

    let provider = NetBoxProvider::new(Arc::new(client));
    let app = create_router(IpamService::new(Arc::new(provider)));

    let listener = tokio::net::TcpListener::bind(config.listen)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen))?;
    info!("Listening on {}", config.listen);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("IPAM proxy stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
