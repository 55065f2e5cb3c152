//! Unit tests for the service layer

#[cfg(test)]
mod tests {
    use crate::envelope::{Envelope, IpReply};
    use crate::error::ApiError;
    use crate::request::{GroupSubnetQuery, IpRequest, NextIpRequest, SubnetQuery};
    use crate::service::{IpamService, GROUPS_UNSUPPORTED};
    use crate::test_utils::*;
    use serde_json::json;
    use std::sync::Arc;

    fn service(provider: FakeProvider) -> (Arc<FakeProvider>, IpamService) {
        let provider = Arc::new(provider);
        (provider.clone(), IpamService::new(provider))
    }

    fn ip_request(cidr: &str, ip: &str, group: Option<&str>) -> IpRequest {
        let (address, prefix) = cidr.split_once('/').unwrap();
        IpRequest::parse(Some(address), Some(prefix), Some(ip), group).unwrap()
    }

    fn next_ip_request(cidr: &str, group: Option<&str>) -> NextIpRequest {
        let (address, prefix) = cidr.split_once('/').unwrap();
        NextIpRequest::parse(Some(address), Some(prefix), Some("00:11:22:33:44:55"), group).unwrap()
    }

    #[tokio::test]
    async fn test_next_ip() {
        let (_, svc) = service(
            FakeProvider::new()
                .with_subnet("100.55.55.0/24", None, 5)
                .with_free_ip(5, "100.55.55.3"),
        );

        let ip = svc.next_ip(&next_ip_request("100.55.55.0/24", None)).await.unwrap();
        assert_eq!(ip.to_string(), "100.55.55.3");
    }

    #[tokio::test]
    async fn test_next_ip_unknown_subnet_and_full_subnet() {
        let (provider, svc) = service(FakeProvider::new().with_subnet("10.0.0.0/30", None, 1));

        let err = svc.next_ip(&next_ip_request("10.0.1.0/24", None)).await.unwrap_err();
        assert_eq!(err, ApiError::NotFound("No subnet 10.0.1.0/24 found".to_string()));
        assert_eq!(provider.calls(), 1, "no allocation call after a failed resolve");

        let err = svc.next_ip(&next_ip_request("10.0.0.0/30", None)).await.unwrap_err();
        assert_eq!(err, ApiError::NotFound("No free addresses found in subnet 10.0.0.0/30".to_string()));
    }

    #[tokio::test]
    async fn test_next_ip_group_falls_back_to_global() {
        let (provider, svc) = service(
            FakeProvider::new()
                .with_subnet("10.0.0.0/24", None, 1)
                .with_free_ip(1, "10.0.0.10"),
        );

        let ip = svc.next_ip(&next_ip_request("10.0.0.0/24", Some("lab"))).await.unwrap();
        assert_eq!(ip.to_string(), "10.0.0.10");
        // scoped resolve, unscoped resolve, allocation
        assert_eq!(provider.calls(), 3);
    }

    #[tokio::test]
    async fn test_next_ip_prefers_group_subnet() {
        let (provider, svc) = service(
            FakeProvider::new()
                .with_subnet("10.0.0.0/24", None, 1)
                .with_subnet("10.0.0.0/24", Some("lab"), 2)
                .with_free_ip(1, "10.0.0.10")
                .with_free_ip(2, "10.0.0.20"),
        );

        let ip = svc.next_ip(&next_ip_request("10.0.0.0/24", Some("lab"))).await.unwrap();
        assert_eq!(ip.to_string(), "10.0.0.20");
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn test_get_subnet_group_is_strict() {
        let (_, svc) = service(FakeProvider::new().with_subnet("10.100.60.0/24", None, 3));

        let found = svc
            .get_subnet(&SubnetQuery::parse(Some("10.100.60.0"), Some("24"), None).unwrap())
            .await
            .unwrap();
        assert_eq!(found, record("10.100.60.0/24", 3, ""));

        let err = svc
            .get_subnet(&SubnetQuery::parse(Some("10.100.60.0"), Some("24"), Some("lab")).unwrap())
            .await
            .unwrap_err();
        assert_eq!(err, ApiError::Absent);
    }

    #[tokio::test]
    async fn test_groups_are_unsupported_without_backend_calls() {
        let (provider, svc) = service(FakeProvider::new());

        assert_eq!(svc.list_groups(), Envelope::Error(GROUPS_UNSUPPORTED.to_string()));
        assert_eq!(svc.get_group("lab"), Envelope::Error(GROUPS_UNSUPPORTED.to_string()));
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_group_subnets() {
        let subnets = vec![record("10.0.1.0/24", 11, "one"), record("10.0.2.0/24", 12, "two")];
        let (_, svc) = service(FakeProvider::new().with_section(7, "lab", subnets.clone()));

        assert_eq!(svc.group_subnets("lab").await.unwrap(), subnets);

        let err = svc.group_subnets("prod").await.unwrap_err();
        assert_eq!(err, ApiError::NotFound("No section prod found".to_string()));
    }

    #[tokio::test]
    async fn test_check_ip_is_repeatable() {
        let (_, svc) = service(
            FakeProvider::new()
                .with_subnet("10.100.60.0/24", None, 3)
                .with_ip(3, "10.100.60.1"),
        );

        let req = ip_request("10.100.60.0/24", "10.100.60.1", None);
        let first = svc.check_ip(&req).await.unwrap();
        let second = svc.check_ip(&req).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first, IpReply { ip: req.ip });

        let missing = ip_request("10.100.60.0/24", "10.100.60.2", None);
        let err = svc.check_ip(&missing).await.unwrap_err();
        assert_eq!(
            err,
            ApiError::NotFound("IP 10.100.60.2 was not found in subnet 10.100.60.0/24".to_string())
        );
    }

    #[tokio::test]
    async fn test_check_ip_ignores_group() {
        let (provider, svc) = service(
            FakeProvider::new()
                .with_subnet("10.100.60.0/24", None, 3)
                .with_subnet("10.100.60.0/24", Some("lab"), 4)
                .with_ip(3, "10.100.60.1"),
        );

        let req = ip_request("10.100.60.0/24", "10.100.60.1", Some("lab"));
        assert_eq!(svc.check_ip(&req).await.unwrap().ip, req.ip);
        // one unscoped resolve, one existence check
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn test_add_then_delete() {
        let (provider, svc) = service(FakeProvider::new().with_subnet("100.10.10.0/24", None, 4));
        let req = ip_request("100.10.10.0/24", "100.10.10.123", None);

        assert_eq!(svc.add_ip(&req).await.unwrap().ip, req.ip);
        assert!(provider.has_ip(4, "100.10.10.123"));

        svc.delete_ip(&req).await.unwrap();
        assert!(!provider.has_ip(4, "100.10.10.123"));
    }

    #[tokio::test]
    async fn test_mutation_rejection_passes_payload_through() {
        let payload = json!({ "error": "IP 100.10.10.123 already exists in subnet 100.10.10.0/24" });
        let (_, svc) = service(
            FakeProvider::new()
                .with_subnet("100.10.10.0/24", None, 4)
                .rejecting(payload.clone()),
        );
        let req = ip_request("100.10.10.0/24", "100.10.10.123", None);

        assert_eq!(svc.add_ip(&req).await.unwrap_err(), ApiError::Rejected(payload.clone()));
        assert_eq!(svc.delete_ip(&req).await.unwrap_err(), ApiError::Rejected(payload));
    }

    #[tokio::test]
    async fn test_mutation_on_unknown_subnet() {
        let (provider, svc) = service(FakeProvider::new());
        let req = ip_request("100.10.10.0/24", "100.10.10.123", Some("lab"));

        let err = svc.add_ip(&req).await.unwrap_err();
        assert_eq!(err, ApiError::NotFound("No subnet 100.10.10.0/24 found".to_string()));
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn test_subnet_in_group() {
        let (_, svc) = service(FakeProvider::new().with_subnet("10.0.0.0/24", Some("lab"), 9));

        let found = svc
            .subnet_in_group(&GroupSubnetQuery::parse(Some("10.0.0.0"), Some("24"), Some("lab")).unwrap())
            .await
            .unwrap();
        assert_eq!(found.id, 9);

        let err = svc
            .subnet_in_group(&GroupSubnetQuery::parse(Some("10.0.0.0"), Some("24"), Some("prod")).unwrap())
            .await
            .unwrap_err();
        assert_eq!(err, ApiError::Absent);
    }

    #[tokio::test]
    async fn test_connectivity_fault_propagates() {
        let (_, svc) = service(FakeProvider::new().with_subnet("10.0.0.0/24", None, 1).unreachable());

        let err = svc.add_ip(&ip_request("10.0.0.0/24", "10.0.0.5", None)).await.unwrap_err();
        assert_eq!(err, ApiError::Connectivity("connection reset by peer".to_string()));

        let err = svc.group_subnets("lab").await.unwrap_err();
        assert!(matches!(err, ApiError::Connectivity(_)));
    }

    #[tokio::test]
    async fn test_backend_error_on_read() {
        let (_, svc) = service(FakeProvider::new().failing("NetBox API error: 500"));

        let err = svc.group_subnets("lab").await.unwrap_err();
        assert_eq!(err, ApiError::Backend("NetBox API error: 500".to_string()));
    }
}
