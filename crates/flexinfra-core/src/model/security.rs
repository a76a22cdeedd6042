//! Security group descriptors.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A uniform way to define security groups across providers.
///
/// Rules are pass-through records: the core does not interpret them
/// beyond carrying them to the provider, which translates them into its
/// vendor's firewall representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityGroup {
    pub name: String,
    #[serde(default)]
    pub rules: Vec<Rule>,
}

impl SecurityGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: Vec::new(),
        }
    }

    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }
}

/// A single traffic rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(default)]
    pub direction: Direction,

    /// Protocol name as the vendor understands it (`tcp`, `udp`, `icmp`).
    pub protocol: String,

    /// Port or port range (`"443"`, `"6000-6999"`); `None` means any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,

    /// Source ranges the rule applies to.
    #[serde(default)]
    pub source_ips: Vec<String>,
}

/// Traffic direction of a rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Ingress,
    Egress,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Ingress => "ingress",
            Direction::Egress => "egress",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
