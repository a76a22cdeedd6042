//! Parsed manifest model.

use crate::model::{NetworkConfig, SecurityGroup, Server};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Everything a flexinfra manifest declares for one environment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    /// Project name.
    pub name: String,

    /// SSH keys installed on every provisioned server.
    #[serde(default)]
    pub ssh_keys: Vec<String>,

    /// Provider settings, keyed by provider name (`hetzner`, `scaleway`).
    #[serde(default)]
    pub providers: HashMap<String, ProviderSettings>,

    /// Servers in declaration order.
    #[serde(default)]
    pub servers: Vec<ServerDecl>,

    /// Security groups in declaration order.
    #[serde(default)]
    pub security_groups: Vec<SecurityGroupDecl>,
}

/// Per-provider configuration from the manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Private network layout for this provider.
    pub network: NetworkConfig,

    /// Vendor location/zone for the servers (e.g. `fsn1`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Provider-specific keys the core does not interpret.
    #[serde(default)]
    pub extra: HashMap<String, String>,
}

/// A server bound to the provider that will realize it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerDecl {
    pub provider: String,
    pub server: Server,
}

/// A security group bound to the provider that will realize it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityGroupDecl {
    pub provider: String,
    pub group: SecurityGroup,
}
