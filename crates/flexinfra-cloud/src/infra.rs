//! The `Infra` orchestrator.
//!
//! Owns the provider-name -> provider mapping and routes provisioning
//! requests to the selected backend without knowing vendor specifics.

use crate::error::{CloudError, Result};
use crate::handle::{SecurityGroupHandle, ServerHandle};
use crate::provider::CloudProvider;
use flexinfra_core::{NetworkConfig, SecurityGroup, Server};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// All infrastructure for one environment, across any number of cloud
/// providers.
///
/// Constructed explicitly, then populated through [`register`](Self::register).
/// A provider only becomes routable after its private network (and, where
/// supported, its subnets) has been provisioned, so no server request can
/// ever reach an unready backend.
#[derive(Default)]
pub struct Infra {
    providers: HashMap<String, Arc<dyn CloudProvider>>,
}

impl Infra {
    pub fn new() -> Self {
        Self {
            providers: HashMap::new(),
        }
    }

    /// Register a provider under `name`, provisioning its base network
    /// first.
    ///
    /// Drives `provision_network` and, only when the backend reports
    /// subnet support, `provision_subnets`. Declared subnets on a
    /// flat-network provider are skipped, not attempted. The provider is
    /// inserted into the routing map only after the base network exists.
    pub async fn register(
        &mut self,
        name: impl Into<String>,
        provider: Arc<dyn CloudProvider>,
        network: &NetworkConfig,
    ) -> Result<()> {
        let name = name.into();
        network.validate()?;

        let handle = provider.provision_network(network).await?;
        info!(provider = %name, network = %handle.ip_range, "Provisioned private network");

        if provider.supports_subnets() {
            let subnets = provider.provision_subnets(network, &handle).await?;
            info!(provider = %name, subnets = subnets.len(), "Provisioned subnets");
        } else if !network.subnets.is_empty() {
            warn!(
                provider = %name,
                skipped = network.subnets.len(),
                "Provider has no subnet support, skipping declared subnets"
            );
        }

        self.providers.insert(name, provider);
        Ok(())
    }

    /// Look up a registered provider by name.
    pub fn provider(&self, name: &str) -> Result<&Arc<dyn CloudProvider>> {
        self.providers
            .get(name)
            .ok_or_else(|| CloudError::UnknownProvider(name.to_string()))
    }

    /// Registered provider names, sorted for stable output.
    pub fn provider_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.providers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Provision a server on the named provider, propagating the
    /// provider's result unchanged.
    pub async fn provision_server(
        &self,
        server: &Server,
        provider_name: &str,
    ) -> Result<ServerHandle> {
        let provider = self.provider(provider_name)?;
        provider.provision_server(server).await
    }

    /// Provision a security group on the named provider.
    pub async fn provision_security_group(
        &self,
        group: &SecurityGroup,
        provider_name: &str,
    ) -> Result<SecurityGroupHandle> {
        let provider = self.provider(provider_name)?;
        provider.provision_security_group(group).await
    }

    /// Handles of every server provisioned in this run, across all
    /// providers. This is what a post-provision configuration tool gets
    /// to work with.
    pub fn provisioned_servers(&self) -> Vec<ServerHandle> {
        let mut servers = Vec::new();
        for name in self.provider_names() {
            if let Some(provider) = self.providers.get(name) {
                servers.extend(provider.servers());
            }
        }
        servers
    }

    /// Post-provision configuration hook.
    ///
    /// Extension point for a configuration-management tool; the core only
    /// exposes the provisioned servers with their assigned addresses.
    pub async fn deploy(&self) -> Result<()> {
        for handle in self.provisioned_servers() {
            info!(
                server = %handle.name,
                provider = %handle.provider,
                ip = handle.ip_address.as_deref().unwrap_or("unassigned"),
                "Deploy hook: server ready for configuration"
            );
        }
        Ok(())
    }
}
