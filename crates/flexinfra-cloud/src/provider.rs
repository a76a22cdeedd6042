//! Cloud provider trait definition.

use crate::error::Result;
use crate::handle::{NetworkHandle, SecurityGroupHandle, ServerHandle, SubnetHandle};
use async_trait::async_trait;
use flexinfra_core::{NetworkConfig, SecurityGroup, Server};
use std::collections::BTreeMap;

/// Cloud provider abstraction trait
///
/// All cloud backends (Hetzner, Scaleway, etc.) implement this trait to
/// provide a unified provisioning interface. A backend brings two
/// translation tables mapping logical size/image classes to its own
/// vendor identifiers, a capability flag for subnet support, and thin
/// wrappers around its vendor SDK returning opaque handles. Validation
/// and routing stay generic.
#[async_trait]
pub trait CloudProvider: Send + Sync {
    /// Returns the provider name (e.g. "hetzner", "scaleway")
    fn name(&self) -> &str;

    /// Returns the provider display name for UI
    fn display_name(&self) -> &str;

    /// Logical size class -> vendor size identifier. Fixed per provider.
    fn size_table(&self) -> &TranslationTable;

    /// Logical image class -> vendor image identifier. Fixed per provider.
    fn image_table(&self) -> &TranslationTable;

    /// Whether the vendor supports subnets inside a private network.
    /// Flat-network vendors return false, and [`Infra`](crate::Infra)
    /// will never ask them to provision subnets.
    fn supports_subnets(&self) -> bool {
        true
    }

    /// Create the provider's private network. Called once during
    /// registration; calling it again returns the existing handle.
    async fn provision_network(&self, config: &NetworkConfig) -> Result<NetworkHandle>;

    /// Create the declared subnets inside `network`, one handle per
    /// subnet, declaration order preserved. Only called when
    /// [`supports_subnets`](Self::supports_subnets) is true.
    async fn provision_subnets(
        &self,
        config: &NetworkConfig,
        network: &NetworkHandle,
    ) -> Result<Vec<SubnetHandle>>;

    /// Pre-flight check for a server descriptor: true iff both the size
    /// and the image resolve against this provider's tables. Pure; no
    /// provider state is touched, and IP validity is out of scope here.
    fn validate_server(&self, server: &Server) -> bool {
        self.size_table().contains(&server.size) && self.image_table().contains(&server.image)
    }

    /// Create a server. Implementations must validate first and fail with
    /// [`CloudError::InvalidResource`](crate::CloudError::InvalidResource)
    /// before any vendor call when the descriptor does not resolve. On
    /// success the handle is recorded in the provider's server list.
    async fn provision_server(&self, server: &Server) -> Result<ServerHandle>;

    /// Create a security group, translating the generic rules into the
    /// vendor's firewall representation. Backends without the capability
    /// fail with [`CloudError::Unsupported`](crate::CloudError::Unsupported)
    /// rather than silently doing nothing.
    async fn provision_security_group(&self, group: &SecurityGroup)
        -> Result<SecurityGroupHandle>;

    /// Handles of every server this provider has provisioned so far.
    fn servers(&self) -> Vec<ServerHandle>;
}

/// Immutable logical-name -> vendor-identifier mapping.
///
/// Built once when a provider is constructed; there is deliberately no
/// way to mutate it afterwards.
#[derive(Debug, Clone, Default)]
pub struct TranslationTable {
    entries: BTreeMap<String, String>,
}

impl TranslationTable {
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self {
            entries: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// Resolve a logical name to the vendor identifier.
    pub fn resolve(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
