//! Handles for provisioned resources.
//!
//! A handle is the opaque reference the provisioning engine returns for a
//! created resource. Handles wire dependent resources together (a server
//! is attached to the network its provider already provisioned) and are
//! what the deploy hook receives at the end of a run.

use flexinfra_core::Ipv4Cidr;
use serde::{Deserialize, Serialize};

/// A provisioned private network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkHandle {
    /// Vendor-side resource id.
    pub id: String,

    pub name: String,

    pub ip_range: Ipv4Cidr,
}

/// A provisioned subnet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubnetHandle {
    pub id: String,

    pub name: String,

    pub ip_range: Ipv4Cidr,
}

/// A provisioned server.
///
/// `server_type` and `image` carry the translated vendor identifiers
/// (e.g. `cx11` / `rocky-9`), not the logical class labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerHandle {
    pub id: String,

    pub name: String,

    /// Name of the provider that created the server.
    pub provider: String,

    pub server_type: String,

    pub image: String,

    /// Address the server is reachable at, once assigned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
}

/// A provisioned security group / firewall.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityGroupHandle {
    pub id: String,

    pub name: String,
}
