//! Scaleway provider implementation.

use crate::scw::{CreateServerRequest, ScalewayApi, ScwCli};
use async_trait::async_trait;
use flexinfra_cloud::{
    CloudError, CloudProvider, NetworkHandle, SecurityGroupHandle, ServerHandle, SubnetHandle,
    TranslationTable,
};
use flexinfra_core::{NetworkConfig, SecurityGroup, Server};
use std::sync::{Mutex, OnceLock};

const SIZES: &[(&str, &str)] = &[
    ("small", "DEV1-S"),
    ("medium", "DEV1-M"),
    ("large", "DEV1-L"),
    ("xlarge", "DEV1-XL"),
];

const IMAGES: &[(&str, &str)] = &[
    ("ubuntu22", "ubuntu_jammy"),
    ("debian11", "debian_bullseye"),
    ("rocky9", "rockylinux_9"),
    ("centos7", "centos_7.9"),
];

/// Scaleway provider.
///
/// Scaleway's private network is flat, so this backend reports no subnet
/// support. Each server gets a public IP allocated right before creation;
/// a failed allocation aborts that server and is surfaced to the caller.
pub struct ScalewayProvider {
    engine: Box<dyn ScalewayApi>,
    // Installed through the vendor's account-level key store, not per call
    #[allow(dead_code)]
    ssh_keys: Vec<String>,
    sizes: TranslationTable,
    images: TranslationTable,
    network: OnceLock<NetworkHandle>,
    servers: Mutex<Vec<ServerHandle>>,
}

impl ScalewayProvider {
    pub fn new(engine: Box<dyn ScalewayApi>, ssh_keys: Vec<String>) -> Self {
        Self {
            engine,
            ssh_keys,
            sizes: TranslationTable::from_pairs(SIZES),
            images: TranslationTable::from_pairs(IMAGES),
            network: OnceLock::new(),
            servers: Mutex::new(Vec::new()),
        }
    }

    /// Construct against the real `scw` CLI.
    pub fn with_cli(ssh_keys: Vec<String>) -> Self {
        Self::new(Box::new(ScwCli::new()), ssh_keys)
    }

    fn invalid_resource(&self, server: &Server) -> CloudError {
        let mut unknown = Vec::new();
        if !self.sizes.contains(&server.size) {
            unknown.push(format!("size '{}'", server.size));
        }
        if !self.images.contains(&server.image) {
            unknown.push(format!("image '{}'", server.image));
        }
        CloudError::InvalidResource {
            server: server.name.clone(),
            provider: self.name().to_string(),
            reason: format!("unknown {}", unknown.join(" and ")),
        }
    }
}

#[async_trait]
impl CloudProvider for ScalewayProvider {
    fn name(&self) -> &str {
        "scaleway"
    }

    fn display_name(&self) -> &str {
        "Scaleway"
    }

    fn size_table(&self) -> &TranslationTable {
        &self.sizes
    }

    fn image_table(&self) -> &TranslationTable {
        &self.images
    }

    fn supports_subnets(&self) -> bool {
        false
    }

    async fn provision_network(
        &self,
        config: &NetworkConfig,
    ) -> flexinfra_cloud::Result<NetworkHandle> {
        if let Some(existing) = self.network.get() {
            return Ok(existing.clone());
        }

        tracing::info!(range = %config.private_ip_range, "Provisioning private network");
        let info = self
            .engine
            .create_private_network("network")
            .await
            .map_err(|e| CloudError::upstream(self.name(), "network", e))?;

        let handle = NetworkHandle {
            id: info.id,
            name: info.name,
            ip_range: config.private_ip_range,
        };
        let _ = self.network.set(handle.clone());
        Ok(handle)
    }

    async fn provision_subnets(
        &self,
        _config: &NetworkConfig,
        _network: &NetworkHandle,
    ) -> flexinfra_cloud::Result<Vec<SubnetHandle>> {
        Err(CloudError::Unsupported {
            provider: self.name().to_string(),
            operation: "subnets".to_string(),
        })
    }

    async fn provision_server(&self, server: &Server) -> flexinfra_cloud::Result<ServerHandle> {
        if self.network.get().is_none() {
            return Err(CloudError::NotReady(self.name().to_string()));
        }

        if !self.validate_server(server) {
            return Err(self.invalid_resource(server));
        }

        let commercial_type = self
            .sizes
            .resolve(&server.size)
            .ok_or_else(|| self.invalid_resource(server))?
            .to_string();
        let image = self
            .images
            .resolve(&server.image)
            .ok_or_else(|| self.invalid_resource(server))?
            .to_string();

        // The public IP must exist before the server referencing it
        let ip = self.engine.create_ip().await.map_err(|e| {
            CloudError::upstream(self.name(), format!("public_ip_{}", server.name), e)
        })?;

        let request = CreateServerRequest {
            name: server.name.clone(),
            commercial_type: commercial_type.clone(),
            image: image.clone(),
            ip_id: ip.id,
        };

        let info = self
            .engine
            .create_server(&request)
            .await
            .map_err(|e| CloudError::upstream(self.name(), &server.name, e))?;

        let handle = ServerHandle {
            id: info.id,
            name: server.name.clone(),
            provider: self.name().to_string(),
            server_type: commercial_type,
            image,
            ip_address: Some(ip.address),
        };

        self.servers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(handle.clone());
        tracing::info!(server = %handle.name, id = %handle.id, "Provisioned server");
        Ok(handle)
    }

    async fn provision_security_group(
        &self,
        group: &SecurityGroup,
    ) -> flexinfra_cloud::Result<SecurityGroupHandle> {
        tracing::debug!(group = %group.name, "Security groups are not implemented for Scaleway");
        Err(CloudError::Unsupported {
            provider: self.name().to_string(),
            operation: "security groups".to_string(),
        })
    }

    fn servers(&self) -> Vec<ServerHandle> {
        self.servers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScalewayError;
    use crate::scw::{IpInfo, PrivateNetworkInfo, ServerInfo};
    use flexinfra_cloud::Infra;
    use std::sync::Arc;

    /// Engine double that records every vendor call.
    #[derive(Clone, Default)]
    struct FakeScw {
        calls: Arc<Mutex<Vec<String>>>,
        fail_ip_create: bool,
    }

    impl FakeScw {
        fn new() -> Self {
            Self::default()
        }

        fn failing_ip_create() -> Self {
            Self {
                calls: Arc::default(),
                fail_ip_create: true,
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: &str) {
            self.calls.lock().unwrap().push(call.to_string());
        }
    }

    #[async_trait]
    impl ScalewayApi for FakeScw {
        async fn create_private_network(&self, name: &str) -> crate::Result<PrivateNetworkInfo> {
            self.record("create_private_network");
            Ok(PrivateNetworkInfo {
                id: "pn-1".to_string(),
                name: name.to_string(),
            })
        }

        async fn create_ip(&self) -> crate::Result<IpInfo> {
            self.record("create_ip");
            if self.fail_ip_create {
                return Err(ScalewayError::CommandFailed(
                    "not enough credit".to_string(),
                ));
            }
            Ok(IpInfo {
                id: "ip-1".to_string(),
                address: "51.15.0.1".to_string(),
            })
        }

        async fn create_server(&self, request: &CreateServerRequest) -> crate::Result<ServerInfo> {
            self.record("create_server");
            Ok(ServerInfo {
                id: "srv-1".to_string(),
                name: request.name.clone(),
                public_ip: None,
            })
        }
    }

    fn network_with_subnet() -> NetworkConfig {
        NetworkConfig::new("172.22.0.0/16".parse().unwrap())
            .with_subnet("subnet1", "172.22.0.0/24".parse().unwrap())
    }

    fn test_provider(engine: FakeScw) -> Arc<ScalewayProvider> {
        Arc::new(ScalewayProvider::new(
            Box::new(engine),
            vec!["daniel@laptop".to_string()],
        ))
    }

    #[tokio::test]
    async fn test_declared_subnets_are_skipped_not_attempted() {
        let engine = FakeScw::new();
        let provider = test_provider(engine.clone());

        let mut infra = Infra::new();
        infra
            .register("scaleway", provider.clone(), &network_with_subnet())
            .await
            .unwrap();

        // Only the network call went to the vendor
        assert_eq!(engine.calls(), vec!["create_private_network"]);
    }

    #[tokio::test]
    async fn test_direct_subnet_call_is_unsupported() {
        let provider = test_provider(FakeScw::new());
        let config = NetworkConfig::new("172.22.0.0/16".parse().unwrap());
        let network = provider.provision_network(&config).await.unwrap();

        let err = provider
            .provision_subnets(&config, &network)
            .await
            .unwrap_err();
        assert!(matches!(err, CloudError::Unsupported { .. }));
    }

    #[tokio::test]
    async fn test_provision_server_allocates_ip_first() {
        let engine = FakeScw::new();
        let provider = test_provider(engine.clone());

        let mut infra = Infra::new();
        infra
            .register(
                "scaleway",
                provider.clone(),
                &NetworkConfig::new("172.22.0.0/16".parse().unwrap()),
            )
            .await
            .unwrap();

        let server = Server::new("xardas", "small", "rocky9");
        let handle = infra.provision_server(&server, "scaleway").await.unwrap();

        assert_eq!(handle.server_type, "DEV1-S");
        assert_eq!(handle.image, "rockylinux_9");
        assert_eq!(handle.ip_address, Some("51.15.0.1".to_string()));
        assert_eq!(
            engine.calls(),
            vec!["create_private_network", "create_ip", "create_server"]
        );
        assert_eq!(provider.servers().len(), 1);
    }

    #[tokio::test]
    async fn test_ip_allocation_failure_is_upstream_with_context() {
        let engine = FakeScw::failing_ip_create();
        let provider = test_provider(engine.clone());

        let mut infra = Infra::new();
        infra
            .register(
                "scaleway",
                provider.clone(),
                &NetworkConfig::new("172.22.0.0/16".parse().unwrap()),
            )
            .await
            .unwrap();

        let server = Server::new("xardas", "small", "rocky9");
        let err = infra.provision_server(&server, "scaleway").await.unwrap_err();

        match err {
            CloudError::Upstream {
                provider: provider_name,
                resource,
                message,
            } => {
                assert_eq!(provider_name, "scaleway");
                assert_eq!(resource, "public_ip_xardas");
                assert!(message.contains("not enough credit"));
            }
            other => panic!("expected Upstream, got {other:?}"),
        }

        // No server creation was attempted after the failed allocation
        assert!(!engine.calls().contains(&"create_server".to_string()));
        assert!(provider.servers().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_server_makes_no_vendor_calls() {
        let engine = FakeScw::new();
        let provider = test_provider(engine.clone());

        let mut infra = Infra::new();
        infra
            .register(
                "scaleway",
                provider.clone(),
                &NetworkConfig::new("172.22.0.0/16".parse().unwrap()),
            )
            .await
            .unwrap();

        let bogus = Server::new("xardas", "medium", "slackware");
        let err = infra.provision_server(&bogus, "scaleway").await.unwrap_err();

        assert!(matches!(err, CloudError::InvalidResource { .. }));
        assert_eq!(engine.calls(), vec!["create_private_network"]);
        assert!(provider.servers().is_empty());
    }

    #[tokio::test]
    async fn test_security_groups_fail_loudly() {
        let provider = test_provider(FakeScw::new());
        let group = SecurityGroup::new("web");

        let err = provider.provision_security_group(&group).await.unwrap_err();
        match err {
            CloudError::Unsupported {
                provider: provider_name,
                operation,
            } => {
                assert_eq!(provider_name, "scaleway");
                assert_eq!(operation, "security groups");
            }
            other => panic!("expected Unsupported, got {other:?}"),
        }
    }
}
