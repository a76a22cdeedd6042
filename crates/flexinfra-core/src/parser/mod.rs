//! KDL manifest parser.
//!
//! Parses flexinfra manifests. Each node type has its own parse module.

mod provider;
mod security;
mod server;


use provider::parse_provider;
use security::parse_security_group;
use server::parse_server;

use crate::error::Result;
use crate::model::Manifest;
use kdl::{KdlDocument, KdlNode};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Parse a manifest file into a [`Manifest`].
pub fn parse_manifest_file<P: AsRef<Path>>(path: P) -> Result<Manifest> {
    let content = fs::read_to_string(path.as_ref())?;
    let name = path
        .as_ref()
        .parent()
        .and_then(|p| p.file_name())
        .and_then(|n| n.to_str())
        .unwrap_or("unnamed")
        .to_string();
    parse_manifest_str(&content, name)
}

/// Parse a manifest string into a [`Manifest`].
pub fn parse_manifest_str(content: &str, default_name: String) -> Result<Manifest> {
    let doc: KdlDocument = content.parse()?;

    let mut name = default_name;
    let mut ssh_keys = Vec::new();
    let mut providers = HashMap::new();
    let mut servers = Vec::new();
    let mut security_groups = Vec::new();

    for node in doc.nodes() {
        match node.name().value() {
            "project" => {
                if let Some(project_name) =
                    node.entries().first().and_then(|e| e.value().as_string())
                {
                    name = project_name.to_string();
                }
            }
            "ssh-key" | "ssh-keys" => {
                ssh_keys.extend(string_entries(node));
            }
            "provider" => {
                let (provider_name, settings) = parse_provider(node)?;
                providers.insert(provider_name, settings);
            }
            "server" => {
                servers.push(parse_server(node)?);
            }
            "security-group" => {
                security_groups.push(parse_security_group(node)?);
            }
            other => {
                debug!("Ignoring unknown top-level node '{}'", other);
            }
        }
    }

    info!(
        providers = providers.len(),
        servers = servers.len(),
        security_groups = security_groups.len(),
        "Manifest parsed"
    );

    Ok(Manifest {
        name,
        ssh_keys,
        providers,
        servers,
        security_groups,
    })
}

/// First positional string entry of a node.
pub(crate) fn first_string(node: &KdlNode) -> Option<String> {
    node.entries()
        .first()
        .and_then(|e| e.value().as_string())
        .map(|s| s.to_string())
}

/// All positional string entries of a node.
pub(crate) fn string_entries(node: &KdlNode) -> Vec<String> {
    node.entries()
        .iter()
        .filter_map(|e| e.value().as_string())
        .map(|s| s.to_string())
        .collect()
}
