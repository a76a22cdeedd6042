pub mod provision;
pub mod validate;

use flexinfra_cloud::CloudProvider;
use flexinfra_cloud_hetzner::HetznerProvider;
use flexinfra_cloud_scaleway::ScalewayProvider;
use flexinfra_core::{Manifest, ProviderSettings};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Resolve the manifest path: explicit flag first, discovery otherwise.
pub fn resolve_manifest(config: Option<&Path>) -> anyhow::Result<PathBuf> {
    match config {
        Some(path) => Ok(path.to_path_buf()),
        None => Ok(flexinfra_core::find_manifest()?),
    }
}

/// Construct the backend for a provider declared in the manifest.
///
/// Construction is cheap and touches no vendor API; the first vendor
/// calls happen at registration.
pub fn build_provider(
    name: &str,
    manifest: &Manifest,
    settings: &ProviderSettings,
) -> anyhow::Result<Arc<dyn CloudProvider>> {
    match name {
        "hetzner" => Ok(Arc::new(HetznerProvider::with_cli(
            manifest.ssh_keys.clone(),
            settings.location.clone(),
        ))),
        "scaleway" => Ok(Arc::new(ScalewayProvider::with_cli(
            manifest.ssh_keys.clone(),
        ))),
        other => anyhow::bail!(
            "unknown provider '{}' (available: hetzner, scaleway)",
            other
        ),
    }
}
