//! Private network descriptors and the CIDR value object.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize, de, ser};
use std::collections::HashSet;
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

/// IPv4 network range in CIDR notation.
///
/// Parsed once at manifest load, so a malformed range fails before any
/// provider is touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ipv4Cidr {
    address: Ipv4Addr,
    prefix_len: u8,
}

impl Ipv4Cidr {
    pub fn new(address: Ipv4Addr, prefix_len: u8) -> Result<Self> {
        if prefix_len > 32 {
            return Err(CoreError::InvalidCidr(format!(
                "prefix length must be <= 32, got {}",
                prefix_len
            )));
        }
        Ok(Self {
            address,
            prefix_len,
        })
    }

    pub fn address(&self) -> Ipv4Addr {
        self.address
    }

    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    fn mask(&self) -> u32 {
        if self.prefix_len == 0 {
            0
        } else {
            u32::MAX << (32 - self.prefix_len)
        }
    }

    /// The network address of the range (host bits zeroed).
    pub fn network(&self) -> Ipv4Addr {
        Ipv4Addr::from(u32::from(self.address) & self.mask())
    }

    /// Whether `ip` falls inside this range.
    pub fn contains(&self, ip: Ipv4Addr) -> bool {
        u32::from(ip) & self.mask() == u32::from(self.network())
    }

    /// Whether `other` is fully contained in this range.
    pub fn contains_net(&self, other: &Ipv4Cidr) -> bool {
        other.prefix_len >= self.prefix_len && self.contains(other.network())
    }
}

impl fmt::Display for Ipv4Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.address, self.prefix_len)
    }
}

impl FromStr for Ipv4Cidr {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let (address, prefix) = s
            .split_once('/')
            .ok_or_else(|| CoreError::InvalidCidr(format!("not in CIDR notation: '{}'", s)))?;

        let address = address
            .parse::<Ipv4Addr>()
            .map_err(|e| CoreError::InvalidCidr(format!("invalid IPv4 address in '{}': {}", s, e)))?;

        let prefix_len = prefix
            .parse::<u8>()
            .map_err(|e| CoreError::InvalidCidr(format!("invalid prefix length in '{}': {}", s, e)))?;

        Self::new(address, prefix_len)
    }
}

impl ser::Serialize for Ipv4Cidr {
    fn serialize<S: ser::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> de::Deserialize<'de> for Ipv4Cidr {
    fn deserialize<D: de::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// Desired private network layout for one provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Main IP range of the private network.
    pub private_ip_range: Ipv4Cidr,

    /// Subnets carved out of the main range, in declaration order.
    /// Providers without subnet support ignore these.
    #[serde(default)]
    pub subnets: Vec<Subnet>,
}

/// A subnet inside a private network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subnet {
    pub name: String,
    pub ip_range: Ipv4Cidr,
}

impl NetworkConfig {
    pub fn new(private_ip_range: Ipv4Cidr) -> Self {
        Self {
            private_ip_range,
            subnets: Vec::new(),
        }
    }

    pub fn with_subnet(mut self, name: impl Into<String>, ip_range: Ipv4Cidr) -> Self {
        self.subnets.push(Subnet {
            name: name.into(),
            ip_range,
        });
        self
    }

    /// Check the internal consistency of the layout: subnet names must be
    /// unique and every subnet range must fall inside the main range.
    pub fn validate(&self) -> Result<()> {
        let mut seen: HashSet<&str> = HashSet::new();
        for subnet in &self.subnets {
            if !seen.insert(subnet.name.as_str()) {
                return Err(CoreError::InvalidConfig(format!(
                    "duplicate subnet name '{}'",
                    subnet.name
                )));
            }
            if !self.private_ip_range.contains_net(&subnet.ip_range) {
                return Err(CoreError::InvalidConfig(format!(
                    "subnet '{}' range {} is outside the network range {}",
                    subnet.name, subnet.ip_range, self.private_ip_range
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cidr_parse_and_display() {
        let net: Ipv4Cidr = "172.21.0.0/16".parse().unwrap();
        assert_eq!(net.prefix_len(), 16);
        assert_eq!(net.to_string(), "172.21.0.0/16");
    }

    #[test]
    fn test_cidr_parse_rejects_garbage() {
        assert!("172.21.0.0".parse::<Ipv4Cidr>().is_err());
        assert!("172.21.0.0/33".parse::<Ipv4Cidr>().is_err());
        assert!("not-an-ip/16".parse::<Ipv4Cidr>().is_err());
        assert!("172.21.0.0/banana".parse::<Ipv4Cidr>().is_err());
    }

    #[test]
    fn test_cidr_contains_ip() {
        let net: Ipv4Cidr = "172.21.0.0/16".parse().unwrap();
        assert!(net.contains("172.21.0.10".parse().unwrap()));
        assert!(net.contains("172.21.255.1".parse().unwrap()));
        assert!(!net.contains("172.22.0.10".parse().unwrap()));
    }

    #[test]
    fn test_cidr_contains_net() {
        let net: Ipv4Cidr = "172.21.0.0/16".parse().unwrap();
        let inside: Ipv4Cidr = "172.21.0.0/24".parse().unwrap();
        let outside: Ipv4Cidr = "172.22.0.0/24".parse().unwrap();
        let wider: Ipv4Cidr = "172.0.0.0/8".parse().unwrap();
        assert!(net.contains_net(&inside));
        assert!(!net.contains_net(&outside));
        assert!(!net.contains_net(&wider));
    }

    #[test]
    fn test_network_config_validate_ok() {
        let config = NetworkConfig::new("172.21.0.0/16".parse().unwrap())
            .with_subnet("subnet1", "172.21.0.0/24".parse().unwrap())
            .with_subnet("subnet2", "172.21.1.0/24".parse().unwrap());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_network_config_rejects_subnet_outside_range() {
        let config = NetworkConfig::new("172.21.0.0/16".parse().unwrap())
            .with_subnet("subnet1", "10.0.0.0/24".parse().unwrap());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("outside the network range"));
    }

    #[test]
    fn test_network_config_rejects_duplicate_subnet_names() {
        let config = NetworkConfig::new("172.21.0.0/16".parse().unwrap())
            .with_subnet("subnet1", "172.21.0.0/24".parse().unwrap())
            .with_subnet("subnet1", "172.21.1.0/24".parse().unwrap());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate subnet name"));
    }

    #[test]
    fn test_cidr_serde_round_trip() {
        let net: Ipv4Cidr = "172.21.0.0/16".parse().unwrap();
        let json = serde_json::to_string(&net).unwrap();
        assert_eq!(json, "\"172.21.0.0/16\"");
        let back: Ipv4Cidr = serde_json::from_str(&json).unwrap();
        assert_eq!(back, net);
    }
}
