//! `scw` CLI wrapper.
//!
//! Wraps the scw CLI commands the provider needs, behind the
//! [`ScalewayApi`] trait so tests can substitute a fake engine.

use crate::error::{Result, ScalewayError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::process::Stdio;
use tokio::process::Command;

/// The vendor calls the Scaleway provider issues.
#[async_trait]
pub trait ScalewayApi: Send + Sync {
    /// Create a private network.
    async fn create_private_network(&self, name: &str) -> Result<PrivateNetworkInfo>;

    /// Allocate a public IP.
    async fn create_ip(&self) -> Result<IpInfo>;

    /// Create a server referencing a previously allocated IP.
    async fn create_server(&self, request: &CreateServerRequest) -> Result<ServerInfo>;
}

/// `scw` CLI backend for [`ScalewayApi`].
#[derive(Debug, Clone, Default)]
pub struct ScwCli;

impl ScwCli {
    pub fn new() -> Self {
        Self
    }

    /// Run a scw command and return stdout.
    async fn run_command(&self, args: &[&str]) -> Result<String> {
        let mut cmd = Command::new("scw");
        cmd.args(args);
        cmd.arg("-o").arg("json");
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        tracing::debug!("Running: scw {} -o json", args.join(" "));

        let output = cmd.output().await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ScalewayError::ScwNotFound
            } else {
                ScalewayError::Io(e)
            }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ScalewayError::CommandFailed(stderr.to_string()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

#[async_trait]
impl ScalewayApi for ScwCli {
    async fn create_private_network(&self, name: &str) -> Result<PrivateNetworkInfo> {
        let name_arg = format!("name={}", name);
        let output = self
            .run_command(&["vpc", "private-network", "create", &name_arg])
            .await?;

        let network: PrivateNetworkInfo = serde_json::from_str(&output)?;
        Ok(network)
    }

    async fn create_ip(&self) -> Result<IpInfo> {
        let output = self.run_command(&["instance", "ip", "create"]).await?;
        let created: IpCreateResult = serde_json::from_str(&output)?;
        Ok(created.ip)
    }

    async fn create_server(&self, request: &CreateServerRequest) -> Result<ServerInfo> {
        let name_arg = format!("name={}", request.name);
        let type_arg = format!("type={}", request.commercial_type);
        let image_arg = format!("image={}", request.image);
        let ip_arg = format!("ip={}", request.ip_id);

        let output = self
            .run_command(&[
                "instance",
                "server",
                "create",
                &name_arg,
                &type_arg,
                &image_arg,
                &ip_arg,
            ])
            .await?;

        let server: ServerInfo = serde_json::from_str(&output)?;
        Ok(server)
    }
}

/// Server creation parameters for the vendor call.
#[derive(Debug, Clone)]
pub struct CreateServerRequest {
    pub name: String,
    /// Vendor commercial type (e.g. `DEV1-S`), already translated.
    pub commercial_type: String,
    /// Vendor image label (e.g. `rockylinux_9`), already translated.
    pub image: String,
    /// Id of the public IP allocated for this server.
    pub ip_id: String,
}

/// Private network resource as scw reports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrivateNetworkInfo {
    pub id: String,
    pub name: String,
}

/// Public IP resource as scw reports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpInfo {
    pub id: String,
    pub address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct IpCreateResult {
    ip: IpInfo,
}

/// Server resource as scw reports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub public_ip: Option<IpInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ip_create_result_deserializes() {
        let json = r#"{"ip":{"id":"11111111-2222-3333-4444-555555555555","address":"51.15.0.1"}}"#;
        let created: IpCreateResult = serde_json::from_str(json).unwrap();
        assert_eq!(created.ip.address, "51.15.0.1");
    }

    #[test]
    fn test_server_info_without_public_ip() {
        let json = r#"{"id":"abc","name":"xardas"}"#;
        let server: ServerInfo = serde_json::from_str(json).unwrap();
        assert!(server.public_ip.is_none());
    }
}
