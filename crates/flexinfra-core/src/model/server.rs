//! Server descriptor.

use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

/// A server, described independently of any cloud vendor.
///
/// `size` and `image` are logical class labels (`small`, `medium`,
/// `large`, `xlarge` and `ubuntu22`, `debian11`, `rocky9`, `centos7`)
/// that each provider resolves against its own translation tables. A
/// label unknown to the selected provider is rejected at validation
/// time, before any vendor call is made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    /// Server name, unique per run.
    pub name: String,

    /// Logical size class.
    pub size: String,

    /// Logical image class.
    pub image: String,

    /// Fixed private IP to assign on the provider's network, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<Ipv4Addr>,
}

impl Server {
    pub fn new(name: impl Into<String>, size: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size: size.into(),
            image: image.into(),
            ip_address: None,
        }
    }

    pub fn with_ip_address(mut self, ip_address: Ipv4Addr) -> Self {
        self.ip_address = Some(ip_address);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_construction() {
        let server = Server::new("xardas", "small", "rocky9")
            .with_ip_address("172.21.0.10".parse().unwrap());
        assert_eq!(server.name, "xardas");
        assert_eq!(server.size, "small");
        assert_eq!(server.image, "rocky9");
        assert_eq!(server.ip_address, Some("172.21.0.10".parse().unwrap()));
    }

    #[test]
    fn test_server_equality() {
        let a = Server::new("xardas", "small", "rocky9");
        let b = Server::new("xardas", "small", "rocky9");
        let c = Server::new("xardas", "medium", "rocky9");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
