//! Server node parsing.

use super::first_string;
use crate::error::{CoreError, Result};
use crate::model::{Server, ServerDecl};
use kdl::KdlNode;

/// Parse a `server` node.
///
/// ```kdl
/// server "xardas" {
///     provider "hetzner"
///     size "small"
///     image "rocky9"
///     ip-address "172.21.0.10"
/// }
/// ```
pub fn parse_server(node: &KdlNode) -> Result<ServerDecl> {
    let name = first_string(node)
        .ok_or_else(|| CoreError::InvalidConfig("server requires a name".to_string()))?;

    let mut provider = None;
    let mut size = None;
    let mut image = None;
    let mut ip_address = None;

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "provider" => provider = first_string(child),
                "size" => size = first_string(child),
                "image" => image = first_string(child),
                "ip-address" | "ip_address" => {
                    if let Some(value) = first_string(child) {
                        ip_address = Some(value.parse().map_err(|e| {
                            CoreError::InvalidConfig(format!(
                                "server \"{}\" has an invalid ip-address '{}': {}",
                                name, value, e
                            ))
                        })?);
                    }
                }
                _ => {}
            }
        }
    }

    let missing = |key: &str| CoreError::MissingKey {
        node: format!("server \"{}\"", name),
        key: key.to_string(),
    };

    let provider = provider.ok_or_else(|| missing("provider"))?;
    let size = size.ok_or_else(|| missing("size"))?;
    let image = image.ok_or_else(|| missing("image"))?;

    Ok(ServerDecl {
        provider,
        server: Server {
            name,
            size,
            image,
            ip_address,
        },
    })
}
