//! Hetzner Cloud provider implementation.

use crate::hcloud::{CreateServerRequest, FirewallRule, HcloudApi, HcloudCli};
use async_trait::async_trait;
use flexinfra_cloud::{
    CloudError, CloudProvider, NetworkHandle, SecurityGroupHandle, ServerHandle, SubnetHandle,
    TranslationTable,
};
use flexinfra_core::{Direction, NetworkConfig, SecurityGroup, Server};
use std::sync::{Mutex, OnceLock};

const SIZES: &[(&str, &str)] = &[
    ("small", "cx11"),
    ("medium", "cx21"),
    ("large", "cx31"),
    ("xlarge", "cx41"),
];

const IMAGES: &[(&str, &str)] = &[
    ("ubuntu22", "ubuntu-22.04"),
    ("debian11", "debian-11"),
    ("rocky9", "rocky-9"),
    ("centos7", "centos-7"),
];

const NETWORK_ZONE: &str = "eu-central";
const SUBNET_TYPE: &str = "cloud";

/// Hetzner Cloud provider.
///
/// The private network and its subnets are provisioned once, during
/// registration; servers accumulate afterwards.
pub struct HetznerProvider {
    engine: Box<dyn HcloudApi>,
    ssh_keys: Vec<String>,
    location: Option<String>,
    sizes: TranslationTable,
    images: TranslationTable,
    network: OnceLock<NetworkHandle>,
    subnets: OnceLock<Vec<SubnetHandle>>,
    servers: Mutex<Vec<ServerHandle>>,
}

impl HetznerProvider {
    pub fn new(engine: Box<dyn HcloudApi>, ssh_keys: Vec<String>, location: Option<String>) -> Self {
        Self {
            engine,
            ssh_keys,
            location,
            sizes: TranslationTable::from_pairs(SIZES),
            images: TranslationTable::from_pairs(IMAGES),
            network: OnceLock::new(),
            subnets: OnceLock::new(),
            servers: Mutex::new(Vec::new()),
        }
    }

    /// Construct against the real `hcloud` CLI.
    pub fn with_cli(ssh_keys: Vec<String>, location: Option<String>) -> Self {
        Self::new(Box::new(HcloudCli::new()), ssh_keys, location)
    }

    /// Subnet handles created during registration.
    pub fn subnets(&self) -> Vec<SubnetHandle> {
        self.subnets.get().cloned().unwrap_or_default()
    }

    fn network_id(&self, network: &NetworkHandle) -> flexinfra_cloud::Result<u64> {
        network.id.parse::<u64>().map_err(|_| {
            CloudError::Configuration(format!("invalid hetzner network id '{}'", network.id))
        })
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
impl CloudProvider for HetznerProvider {
    fn name(&self) -> &str {
        "hetzner"
    }

    fn display_name(&self) -> &str {
        "Hetzner Cloud"
    }

    fn size_table(&self) -> &TranslationTable {
        &self.sizes
    }

    fn image_table(&self) -> &TranslationTable {
        &self.images
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
            .create_network("network", &config.private_ip_range.to_string())
            .await
            .map_err(|e| CloudError::upstream(self.name(), "network", e))?;

        let handle = NetworkHandle {
            id: info.id.to_string(),
            name: info.name,
            ip_range: config.private_ip_range,
        };
        let _ = self.network.set(handle.clone());
        Ok(handle)
    }

    async fn provision_subnets(
        &self,
        config: &NetworkConfig,
        network: &NetworkHandle,
    ) -> flexinfra_cloud::Result<Vec<SubnetHandle>> {
        if let Some(existing) = self.subnets.get() {
            return Ok(existing.clone());
        }

        let network_id = self.network_id(network)?;
        let mut handles = Vec::with_capacity(config.subnets.len());

        for subnet in &config.subnets {
            let info = self
                .engine
                .add_subnet(
                    network_id,
                    &subnet.ip_range.to_string(),
                    NETWORK_ZONE,
                    SUBNET_TYPE,
                )
                .await
                .map_err(|e| CloudError::upstream(self.name(), &subnet.name, e))?;

            tracing::info!(subnet = %subnet.name, range = %subnet.ip_range, "Provisioned subnet");
            handles.push(SubnetHandle {
                id: format!("{}:{}", info.network_id, info.ip_range),
                name: subnet.name.clone(),
                ip_range: subnet.ip_range,
            });
        }

        let _ = self.subnets.set(handles.clone());
        Ok(handles)
    }

    async fn provision_server(&self, server: &Server) -> flexinfra_cloud::Result<ServerHandle> {
        let network = self
            .network
            .get()
            .ok_or_else(|| CloudError::NotReady(self.name().to_string()))?;

        if !self.validate_server(server) {
            return Err(self.invalid_resource(server));
        }

        let server_type = self
            .sizes
            .resolve(&server.size)
            .ok_or_else(|| self.invalid_resource(server))?
            .to_string();
        let image = self
            .images
            .resolve(&server.image)
            .ok_or_else(|| self.invalid_resource(server))?
            .to_string();

        if let Some(ip) = server.ip_address {
            if !network.ip_range.contains(ip) {
                return Err(CloudError::Configuration(format!(
                    "server '{}' ip address {} is outside the network range {}",
                    server.name, ip, network.ip_range
                )));
            }
        }

        let request = CreateServerRequest {
            name: server.name.clone(),
            server_type: server_type.clone(),
            image: image.clone(),
            location: self.location.clone(),
            ssh_keys: self.ssh_keys.clone(),
            network_id: Some(self.network_id(network)?),
            private_ip: server.ip_address.map(|ip| ip.to_string()),
        };

        let info = self
            .engine
            .create_server(&request)
            .await
            .map_err(|e| CloudError::upstream(self.name(), &server.name, e))?;

        let handle = ServerHandle {
            id: info.id.to_string(),
            name: server.name.clone(),
            provider: self.name().to_string(),
            server_type,
            image,
            ip_address: server
                .ip_address
                .map(|ip| ip.to_string())
                .or_else(|| info.public_ip()),
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
        let rules: Vec<FirewallRule> = group
            .rules
            .iter()
            .map(|rule| FirewallRule {
                direction: match rule.direction {
                    Direction::Ingress => "in".to_string(),
                    Direction::Egress => "out".to_string(),
                },
                protocol: rule.protocol.clone(),
                port: rule.port.clone(),
                source_ips: rule.source_ips.clone(),
            })
            .collect();

        let info = self
            .engine
            .create_firewall(&group.name, &rules)
            .await
            .map_err(|e| CloudError::upstream(self.name(), &group.name, e))?;

        tracing::info!(firewall = %group.name, rules = rules.len(), "Provisioned firewall");
        Ok(SecurityGroupHandle {
            id: info.id.to_string(),
            name: group.name.clone(),
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
    use crate::error::HcloudError;
    use crate::hcloud::{FirewallInfo, NetworkInfo, ServerInfo, SubnetInfo};
    use flexinfra_cloud::Infra;
    use flexinfra_core::Rule;
    use std::sync::Arc;

    /// Engine double that records every vendor call.
    #[derive(Clone, Default)]
    struct FakeHcloud {
        calls: Arc<Mutex<Vec<String>>>,
        fail_server_create: bool,
    }

    impl FakeHcloud {
        fn new() -> Self {
            Self::default()
        }

        fn failing_server_create() -> Self {
            Self {
                calls: Arc::default(),
                fail_server_create: true,
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
    impl HcloudApi for FakeHcloud {
        async fn create_network(&self, name: &str, _ip_range: &str) -> crate::Result<NetworkInfo> {
            self.record("create_network");
            Ok(NetworkInfo {
                id: 100,
                name: name.to_string(),
                ip_range: None,
            })
        }

        async fn add_subnet(
            &self,
            network_id: u64,
            ip_range: &str,
            network_zone: &str,
            _subnet_type: &str,
        ) -> crate::Result<SubnetInfo> {
            self.record("add_subnet");
            Ok(SubnetInfo {
                network_id,
                ip_range: ip_range.to_string(),
                network_zone: network_zone.to_string(),
            })
        }

        async fn create_server(
            &self,
            request: &CreateServerRequest,
        ) -> crate::Result<ServerInfo> {
            self.record("create_server");
            if self.fail_server_create {
                return Err(HcloudError::CommandFailed("quota exceeded".to_string()));
            }
            Ok(ServerInfo {
                id: 4242,
                name: request.name.clone(),
                public_net: None,
            })
        }

        async fn create_firewall(
            &self,
            name: &str,
            rules: &[FirewallRule],
        ) -> crate::Result<FirewallInfo> {
            self.record(&format!("create_firewall:{}", rules.len()));
            Ok(FirewallInfo {
                id: 7,
                name: name.to_string(),
            })
        }
    }

    fn test_network() -> NetworkConfig {
        NetworkConfig::new("172.21.0.0/16".parse().unwrap())
            .with_subnet("subnet1", "172.21.0.0/24".parse().unwrap())
    }

    fn test_provider(engine: FakeHcloud) -> Arc<HetznerProvider> {
        Arc::new(HetznerProvider::new(
            Box::new(engine),
            vec!["daniel@laptop".to_string()],
            Some("fsn1".to_string()),
        ))
    }

    #[tokio::test]
    async fn test_provision_server_end_to_end() {
        let engine = FakeHcloud::new();
        let provider = test_provider(engine.clone());

        let mut infra = Infra::new();
        infra
            .register("hetzner", provider.clone(), &test_network())
            .await
            .unwrap();

        let server = Server::new("xardas", "small", "rocky9")
            .with_ip_address("172.21.0.10".parse().unwrap());
        let handle = infra.provision_server(&server, "hetzner").await.unwrap();

        assert_eq!(handle.server_type, "cx11");
        assert_eq!(handle.image, "rocky-9");
        assert_eq!(handle.ip_address, Some("172.21.0.10".to_string()));
        assert_eq!(handle.provider, "hetzner");
        assert_eq!(provider.servers().len(), 1);
        assert_eq!(
            engine.calls(),
            vec!["create_network", "add_subnet", "create_server"]
        );
    }

    #[tokio::test]
    async fn test_invalid_server_never_reaches_the_engine() {
        let engine = FakeHcloud::new();
        let provider = test_provider(engine.clone());

        let mut infra = Infra::new();
        infra
            .register("hetzner", provider.clone(), &test_network())
            .await
            .unwrap();

        let bogus = Server::new("xardas", "tiny", "fedora");
        let err = infra.provision_server(&bogus, "hetzner").await.unwrap_err();

        match err {
            CloudError::InvalidResource {
                server,
                provider: provider_name,
                reason,
            } => {
                assert_eq!(server, "xardas");
                assert_eq!(provider_name, "hetzner");
                assert!(reason.contains("size 'tiny'"));
                assert!(reason.contains("image 'fedora'"));
            }
            other => panic!("expected InvalidResource, got {other:?}"),
        }

        // Registration calls only; the server list is untouched
        assert_eq!(engine.calls(), vec!["create_network", "add_subnet"]);
        assert!(provider.servers().is_empty());
    }

    #[tokio::test]
    async fn test_provision_server_requires_registered_network() {
        let provider = test_provider(FakeHcloud::new());
        let server = Server::new("xardas", "small", "rocky9");

        let err = provider.provision_server(&server).await.unwrap_err();
        assert!(matches!(err, CloudError::NotReady(name) if name == "hetzner"));
    }

    #[tokio::test]
    async fn test_ip_outside_network_range_is_rejected() {
        let engine = FakeHcloud::new();
        let provider = test_provider(engine.clone());

        let mut infra = Infra::new();
        infra
            .register("hetzner", provider.clone(), &test_network())
            .await
            .unwrap();

        let server = Server::new("xardas", "small", "rocky9")
            .with_ip_address("10.0.0.5".parse().unwrap());
        let err = infra.provision_server(&server, "hetzner").await.unwrap_err();

        assert!(matches!(err, CloudError::Configuration(_)));
        assert!(!engine.calls().contains(&"create_server".to_string()));
        assert!(provider.servers().is_empty());
    }

    #[tokio::test]
    async fn test_engine_failure_surfaces_as_upstream() {
        let engine = FakeHcloud::failing_server_create();
        let provider = test_provider(engine.clone());

        let mut infra = Infra::new();
        infra
            .register("hetzner", provider.clone(), &test_network())
            .await
            .unwrap();

        let server = Server::new("xardas", "small", "rocky9");
        let err = infra.provision_server(&server, "hetzner").await.unwrap_err();

        match err {
            CloudError::Upstream {
                provider: provider_name,
                resource,
                message,
            } => {
                assert_eq!(provider_name, "hetzner");
                assert_eq!(resource, "xardas");
                assert!(message.contains("quota exceeded"));
            }
            other => panic!("expected Upstream, got {other:?}"),
        }
        // The failed creation leaves no handle behind
        assert!(provider.servers().is_empty());
    }

    #[tokio::test]
    async fn test_subnet_handles_preserve_declaration_order() {
        let engine = FakeHcloud::new();
        let provider = test_provider(engine.clone());

        let network = NetworkConfig::new("10.0.0.0/8".parse().unwrap())
            .with_subnet("c", "10.3.0.0/16".parse().unwrap())
            .with_subnet("a", "10.1.0.0/16".parse().unwrap())
            .with_subnet("b", "10.2.0.0/16".parse().unwrap());

        let mut infra = Infra::new();
        infra
            .register("hetzner", provider.clone(), &network)
            .await
            .unwrap();

        let names: Vec<String> = provider.subnets().iter().map(|s| s.name.clone()).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }

    #[tokio::test]
    async fn test_security_group_translates_rules() {
        let engine = FakeHcloud::new();
        let provider = test_provider(engine.clone());

        let mut infra = Infra::new();
        infra
            .register("hetzner", provider.clone(), &test_network())
            .await
            .unwrap();

        let group = SecurityGroup::new("web")
            .with_rule(Rule {
                direction: Direction::Ingress,
                protocol: "tcp".to_string(),
                port: Some("443".to_string()),
                source_ips: vec!["0.0.0.0/0".to_string()],
            })
            .with_rule(Rule {
                direction: Direction::Egress,
                protocol: "udp".to_string(),
                port: None,
                source_ips: vec![],
            });

        let handle = infra
            .provision_security_group(&group, "hetzner")
            .await
            .unwrap();

        assert_eq!(handle.name, "web");
        assert!(engine.calls().contains(&"create_firewall:2".to_string()));
    }

    #[tokio::test]
    async fn test_validation_is_pure() {
        let provider = test_provider(FakeHcloud::new());
        let good = Server::new("xardas", "small", "rocky9");
        let bad = Server::new("xardas", "medium", "slackware");

        for _ in 0..3 {
            assert!(provider.validate_server(&good));
            assert!(!provider.validate_server(&bad));
        }
        assert!(provider.servers().is_empty());
    }
}
