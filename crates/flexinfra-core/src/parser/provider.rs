//! Provider node parsing.

use super::first_string;
use crate::error::{CoreError, Result};
use crate::model::{Ipv4Cidr, NetworkConfig, ProviderSettings, Subnet};
use kdl::KdlNode;

/// Parse a `provider` node.
///
/// ```kdl
/// provider "hetzner" {
///     location "fsn1"
///     network {
///         ip-range "172.21.0.0/16"
///         subnet "subnet1" ip-range="172.21.0.0/24"
///     }
/// }
/// ```
pub fn parse_provider(node: &KdlNode) -> Result<(String, ProviderSettings)> {
    let name = first_string(node)
        .ok_or_else(|| CoreError::InvalidConfig("provider requires a name".to_string()))?;

    let mut network = None;
    let mut location = None;
    let mut extra = std::collections::HashMap::new();

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "location" => {
                    location = first_string(child);
                }
                "network" => {
                    network = Some(parse_network(child)?);
                }
                // Provider-specific keys are kept as-is
                other => {
                    if let Some(value) = first_string(child) {
                        extra.insert(other.to_string(), value);
                    }
                }
            }
        }
    }

    let network = network.ok_or_else(|| CoreError::MissingKey {
        node: format!("provider \"{}\"", name),
        key: "network".to_string(),
    })?;

    Ok((
        name,
        ProviderSettings {
            network,
            location,
            extra,
        },
    ))
}

/// Parse a `network` node into a [`NetworkConfig`].
fn parse_network(node: &KdlNode) -> Result<NetworkConfig> {
    let mut ip_range = None;
    let mut subnets = Vec::new();

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "ip-range" => {
                    if let Some(value) = first_string(child) {
                        ip_range = Some(value.parse::<Ipv4Cidr>()?);
                    }
                }
                "subnet" => {
                    subnets.push(parse_subnet(child)?);
                }
                _ => {}
            }
        }
    }

    let private_ip_range = ip_range.ok_or_else(|| CoreError::MissingKey {
        node: "network".to_string(),
        key: "ip-range".to_string(),
    })?;

    Ok(NetworkConfig {
        private_ip_range,
        subnets,
    })
}

/// Parse a `subnet` node: `subnet "subnet1" ip-range="172.21.0.0/24"`.
fn parse_subnet(node: &KdlNode) -> Result<Subnet> {
    let name = first_string(node)
        .ok_or_else(|| CoreError::InvalidConfig("subnet requires a name".to_string()))?;

    let ip_range = node
        .get("ip-range")
        .and_then(|v| v.as_string())
        .ok_or_else(|| CoreError::MissingKey {
            node: format!("subnet \"{}\"", name),
            key: "ip-range".to_string(),
        })?
        .parse::<Ipv4Cidr>()?;

    Ok(Subnet { name, ip_range })
}
