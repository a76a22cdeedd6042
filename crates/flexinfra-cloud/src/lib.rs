//! flexinfra cloud provider abstraction.
//!
//! This crate defines the capability contract every cloud backend must
//! satisfy, and the `Infra` orchestrator that routes provisioning
//! requests to registered backends by name.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                 flexinfra CLI                    │
//! │           (validate / provision / deploy)        │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │               flexinfra-cloud                    │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │          Provider Abstraction             │   │
//! │  │  trait CloudProvider { ... }              │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────┐  ┌──────────────┐            │
//! │  │ Infra router │  │   Handles    │            │
//! │  └──────────────┘  └──────────────┘            │
//! └───────┬─────────────────┬───────────────────────┘
//!         │                 │
//! ┌───────▼───────┐ ┌───────▼───────┐
//! │    hetzner    │ │   scaleway    │
//! │   provider    │ │   provider    │
//! └───────────────┘ └───────────────┘
//! ```
//!
//! A backend supplies its own size/image translation tables plus thin
//! vendor-SDK calls; the orchestrator never learns vendor specifics.

pub mod error;
pub mod handle;
pub mod infra;
pub mod provider;

// Re-exports
pub use error::{CloudError, Result};
pub use handle::{NetworkHandle, SecurityGroupHandle, ServerHandle, SubnetHandle};
pub use infra::Infra;
pub use provider::{CloudProvider, TranslationTable};
