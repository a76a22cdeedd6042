//! Hetzner Cloud provider for flexinfra.
//!
//! Implements the CloudProvider trait for Hetzner Cloud, translating
//! universal resource descriptors into Hetzner resources: private
//! networks with subnets, servers, and firewalls.
//!
//! # Requirements
//!
//! - the `hcloud` CLI must be installed and configured with an active
//!   context; authentication is managed entirely through it
//!
//! # Example
//!
//! ```ignore
//! use flexinfra_cloud::{CloudProvider, Infra};
//! use flexinfra_cloud_hetzner::HetznerProvider;
//! use flexinfra_core::{NetworkConfig, Server};
//! use std::sync::Arc;
//!
//! let provider = Arc::new(HetznerProvider::with_cli(
//!     vec!["daniel@laptop".to_string()],
//!     Some("fsn1".to_string()),
//! ));
//!
//! let network = NetworkConfig::new("172.21.0.0/16".parse()?)
//!     .with_subnet("subnet1", "172.21.0.0/24".parse()?);
//!
//! let mut infra = Infra::new();
//! infra.register("hetzner", provider, &network).await?;
//!
//! let server = Server::new("xardas", "small", "rocky9");
//! let handle = infra.provision_server(&server, "hetzner").await?;
//! ```

pub mod error;
pub mod hcloud;
pub mod provider;

pub use error::{HcloudError, Result};
pub use hcloud::{CreateServerRequest, FirewallRule, HcloudApi, HcloudCli};
pub use provider::HetznerProvider;
