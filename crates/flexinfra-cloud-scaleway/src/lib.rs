//! Scaleway provider for flexinfra.
//!
//! Implements the CloudProvider trait for Scaleway. Scaleway exposes a
//! flat private network without subnets, so the provider reports
//! `supports_subnets() == false` and the orchestrator never asks it to
//! provision any. Servers get a freshly allocated public IP before
//! creation.
//!
//! # Requirements
//!
//! - the `scw` CLI must be installed and configured; authentication is
//!   managed entirely through it

pub mod error;
pub mod provider;
pub mod scw;

pub use error::{Result, ScalewayError};
pub use provider::ScalewayProvider;
pub use scw::{CreateServerRequest, ScalewayApi, ScwCli};
