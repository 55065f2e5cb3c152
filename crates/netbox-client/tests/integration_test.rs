//! Integration tests for NetBox client
//!
//! These tests require a running NetBox instance.
//! Set NETBOX_URL and NETBOX_TOKEN environment variables to run.

use netbox_client::{AllocateIPRequest, IPAddressStatus, NetBoxClient, NetBoxError};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

fn client() -> NetBoxClient {
    let url = std::env::var("NETBOX_URL")
        .unwrap_or_else(|_| "http://localhost:8001".to_string());
    let token = std::env::var("NETBOX_TOKEN")
        .expect("NETBOX_TOKEN environment variable must be set");

    NetBoxClient::new(url, token).expect("Failed to create client")
}

#[tokio::test]
#[ignore] // Requires running NetBox instance
async fn test_validate_token() {
    client().validate_token().await.expect("Token rejected");
}

#[tokio::test]
#[ignore]
async fn test_query_prefixes() {
    let prefixes = client().query_prefixes(&[], true).await
        .expect("Failed to query prefixes");

    for prefix in &prefixes {
        assert!(prefix.network().is_some(), "unparsable prefix {}", prefix.prefix);
    }
}

#[tokio::test]
#[ignore]
async fn test_query_vrfs() {
    let client = client();
    let vrfs = client.query_vrfs(&[], false).await
        .expect("Failed to query VRFs");

    if let Some(vrf) = vrfs.first() {
        let found = client.get_vrf_by_name(&vrf.name).await.expect("VRF lookup failed");
        assert_eq!(found.map(|v| v.id), Some(vrf.id));
    }
}

#[tokio::test]
#[ignore]
async fn test_create_and_delete_ip() {
    let client = client();

    let request = AllocateIPRequest {
        description: Some("Test IP address".to_string()),
        status: Some(IPAddressStatus::Active),
        ..Default::default()
    };

    let ip = client.create_ip_address("192.168.100.1/24", Some(request)).await
        .expect("Failed to create IP address");
    assert_eq!(ip.host(), Some("192.168.100.1".parse().unwrap()));

    client.delete_ip_address(ip.id).await.expect("Failed to delete IP address");

    let again = client.delete_ip_address(ip.id).await;
    assert!(matches!(again, Err(NetBoxError::NotFound(_))));
}

#[tokio::test]
async fn test_unreachable_host_is_a_connectivity_fault() {
    // Port 9 (discard) on loopback is closed on CI hosts.
    let client = NetBoxClient::new("http://127.0.0.1:9".to_string(), "t".to_string())
        .expect("Failed to create client");

    let err = client.query_vrfs(&[], false).await.unwrap_err();
    assert!(err.is_connectivity(), "expected connectivity fault, got {err:?}");
}

/// Serve one request with headers and a truncated body, then drop the socket.
/// With `reset` the socket closes with SO_LINGER 0, so the peer sees a RST.
async fn truncating_server(reset: bool) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).await.unwrap();
            if n == 0 {
                return;
            }
            request.extend_from_slice(&buf[..n]);
        }

        stream
            .write_all(b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 500\r\n\r\n{\"count\":1,")
            .await
            .unwrap();
        stream.flush().await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        if reset {
            #[allow(deprecated)]
            stream.set_linger(Some(Duration::ZERO)).unwrap();
        }
        drop(stream);
    });

    format!("http://{}", addr)
}

#[tokio::test]
async fn test_reset_mid_body_is_a_connectivity_fault() {
    let url = truncating_server(true).await;
    let client = NetBoxClient::new(url, "t".to_string()).expect("Failed to create client");

    let err = client.query_vrfs(&[], false).await.unwrap_err();
    assert!(err.is_connectivity(), "expected connectivity fault, got {err:?}");
}

#[tokio::test]
async fn test_truncated_body_is_a_connectivity_fault() {
    let url = truncating_server(false).await;
    let client = NetBoxClient::new(url, "t".to_string()).expect("Failed to create client");

    let err = client.get_prefix(1).await.unwrap_err();
    assert!(err.is_connectivity(), "expected connectivity fault, got {err:?}");
}
