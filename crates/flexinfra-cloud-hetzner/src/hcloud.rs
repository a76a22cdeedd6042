//! `hcloud` CLI wrapper.
//!
//! Wraps the hcloud CLI commands the provider needs. The [`HcloudApi`]
//! trait is the seam between the provider and the vendor: the real
//! implementation shells out to `hcloud`, tests substitute a fake.

use crate::error::{HcloudError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::process::Stdio;
use tokio::process::Command;

/// The vendor calls the Hetzner provider issues.
#[async_trait]
pub trait HcloudApi: Send + Sync {
    /// Create a private network.
    async fn create_network(&self, name: &str, ip_range: &str) -> Result<NetworkInfo>;

    /// Add a subnet to an existing network.
    async fn add_subnet(
        &self,
        network_id: u64,
        ip_range: &str,
        network_zone: &str,
        subnet_type: &str,
    ) -> Result<SubnetInfo>;

    /// Create a server, attaching it to a network when requested.
    async fn create_server(&self, request: &CreateServerRequest) -> Result<ServerInfo>;

    /// Create a firewall with the given rules.
    async fn create_firewall(&self, name: &str, rules: &[FirewallRule]) -> Result<FirewallInfo>;
}

/// `hcloud` CLI backend for [`HcloudApi`].
#[derive(Debug, Clone, Default)]
pub struct HcloudCli;

impl HcloudCli {
    pub fn new() -> Self {
        Self
    }

    /// Run an hcloud command and return stdout.
    async fn run_command(&self, args: &[&str]) -> Result<String> {
        let mut cmd = Command::new("hcloud");
        cmd.args(args);
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        tracing::debug!("Running: hcloud {}", args.join(" "));

        let output = cmd.output().await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                HcloudError::HcloudNotFound
            } else {
                HcloudError::Io(e)
            }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(HcloudError::CommandFailed(stderr.to_string()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

#[async_trait]
impl HcloudApi for HcloudCli {
    async fn create_network(&self, name: &str, ip_range: &str) -> Result<NetworkInfo> {
        let output = self
            .run_command(&[
                "network",
                "create",
                "--name",
                name,
                "--ip-range",
                ip_range,
                "-o",
                "json",
            ])
            .await?;

        let network: NetworkInfo = serde_json::from_str(&output)?;
        Ok(network)
    }

    async fn add_subnet(
        &self,
        network_id: u64,
        ip_range: &str,
        network_zone: &str,
        subnet_type: &str,
    ) -> Result<SubnetInfo> {
        let network_id_str = network_id.to_string();
        // add-subnet prints no resource body, so the subnet view is
        // assembled from the arguments
        self.run_command(&[
            "network",
            "add-subnet",
            &network_id_str,
            "--ip-range",
            ip_range,
            "--network-zone",
            network_zone,
            "--type",
            subnet_type,
        ])
        .await?;

        Ok(SubnetInfo {
            network_id,
            ip_range: ip_range.to_string(),
            network_zone: network_zone.to_string(),
        })
    }

    async fn create_server(&self, request: &CreateServerRequest) -> Result<ServerInfo> {
        let mut args = vec![
            "server",
            "create",
            "--name",
            request.name.as_str(),
            "--type",
            request.server_type.as_str(),
            "--image",
            request.image.as_str(),
            "-o",
            "json",
        ];

        if let Some(ref location) = request.location {
            args.push("--location");
            args.push(location.as_str());
        }

        for key in &request.ssh_keys {
            args.push("--ssh-key");
            args.push(key.as_str());
        }

        let output = self.run_command(&args).await?;
        let created: ServerCreateResult = serde_json::from_str(&output)?;
        let server = created.server;

        // Network attachment is a separate call; a fixed private IP can
        // only be requested this way
        if let Some(network_id) = request.network_id {
            let server_id = server.id.to_string();
            let network_id_str = network_id.to_string();
            let mut attach = vec![
                "server",
                "attach-to-network",
                server_id.as_str(),
                "--network",
                network_id_str.as_str(),
            ];
            if let Some(ref ip) = request.private_ip {
                attach.push("--ip");
                attach.push(ip.as_str());
            }
            self.run_command(&attach).await?;
        }

        Ok(server)
    }

    async fn create_firewall(&self, name: &str, rules: &[FirewallRule]) -> Result<FirewallInfo> {
        let output = self
            .run_command(&["firewall", "create", "--name", name, "-o", "json"])
            .await?;
        let firewall: FirewallInfo = serde_json::from_str(&output)?;

        if !rules.is_empty() {
            let rules_json = serde_json::to_string(rules)?;
            let rules_path =
                std::env::temp_dir().join(format!("flexinfra-firewall-{}.json", firewall.id));
            tokio::fs::write(&rules_path, rules_json).await?;

            let firewall_id = firewall.id.to_string();
            let rules_path_str = rules_path.display().to_string();
            let result = self
                .run_command(&[
                    "firewall",
                    "replace-rules",
                    &firewall_id,
                    "--rules-file",
                    &rules_path_str,
                ])
                .await;
            let _ = tokio::fs::remove_file(&rules_path).await;
            result?;
        }

        Ok(firewall)
    }
}

/// Server creation parameters for the vendor call.
#[derive(Debug, Clone)]
pub struct CreateServerRequest {
    pub name: String,
    /// Vendor server type (e.g. `cx11`), already translated.
    pub server_type: String,
    /// Vendor image identifier (e.g. `rocky-9`), already translated.
    pub image: String,
    pub location: Option<String>,
    pub ssh_keys: Vec<String>,
    /// Network to attach the server to, if any.
    pub network_id: Option<u64>,
    /// Fixed private IP inside that network.
    pub private_ip: Option<String>,
}

/// A firewall rule in the vendor's representation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirewallRule {
    /// `in` or `out`.
    pub direction: String,
    pub protocol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,
    pub source_ips: Vec<String>,
}

/// Network resource as hcloud reports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkInfo {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub ip_range: Option<String>,
}

/// Subnet view; hcloud reports subnets as part of the network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubnetInfo {
    pub network_id: u64,
    pub ip_range: String,
    pub network_zone: String,
}

/// Server resource as hcloud reports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub public_net: Option<PublicNet>,
}

impl ServerInfo {
    pub fn public_ip(&self) -> Option<String> {
        self.public_net
            .as_ref()?
            .ipv4
            .as_ref()
            .map(|v| v.ip.clone())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicNet {
    #[serde(default)]
    pub ipv4: Option<Ipv4Net>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ipv4Net {
    pub ip: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ServerCreateResult {
    server: ServerInfo,
}

/// Firewall resource as hcloud reports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirewallInfo {
    pub id: u64,
    pub name: String,
}
