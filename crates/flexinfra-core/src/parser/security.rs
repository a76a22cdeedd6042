//! Security group node parsing.

use super::{first_string, string_entries};
use crate::error::{CoreError, Result};
use crate::model::{Direction, Rule, SecurityGroup, SecurityGroupDecl};
use kdl::KdlNode;

/// Parse a `security-group` node.
///
/// ```kdl
/// security-group "web" {
///     provider "hetzner"
///     rule direction="ingress" protocol="tcp" port="443" {
///         source-ips "0.0.0.0/0"
///     }
/// }
/// ```
pub fn parse_security_group(node: &KdlNode) -> Result<SecurityGroupDecl> {
    let name = first_string(node)
        .ok_or_else(|| CoreError::InvalidConfig("security-group requires a name".to_string()))?;

    let mut provider = None;
    let mut rules = Vec::new();

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "provider" => provider = first_string(child),
                "rule" => rules.push(parse_rule(child, &name)?),
                _ => {}
            }
        }
    }

    let provider = provider.ok_or_else(|| CoreError::MissingKey {
        node: format!("security-group \"{}\"", name),
        key: "provider".to_string(),
    })?;

    Ok(SecurityGroupDecl {
        provider,
        group: SecurityGroup { name, rules },
    })
}

fn parse_rule(node: &KdlNode, group: &str) -> Result<Rule> {
    let direction = match node.get("direction").and_then(|v| v.as_string()) {
        None => Direction::default(),
        Some("ingress") => Direction::Ingress,
        Some("egress") => Direction::Egress,
        Some(other) => {
            return Err(CoreError::InvalidConfig(format!(
                "security-group \"{}\" rule has unknown direction '{}'",
                group, other
            )));
        }
    };

    let protocol = node
        .get("protocol")
        .and_then(|v| v.as_string())
        .ok_or_else(|| CoreError::MissingKey {
            node: format!("security-group \"{}\" rule", group),
            key: "protocol".to_string(),
        })?
        .to_string();

    let port = node
        .get("port")
        .and_then(|v| v.as_string())
        .map(|s| s.to_string());

    let mut source_ips = Vec::new();
    if let Some(children) = node.children() {
        for child in children.nodes() {
            if child.name().value() == "source-ips" {
                source_ips.extend(string_entries(child));
            }
        }
    }

    Ok(Rule {
        direction,
        protocol,
        port,
        source_ips,
    })
}
