//! Manifest file discovery.

use crate::error::{CoreError, Result};
use std::path::PathBuf;

const CANDIDATES: [&str; 4] = [
    "flexinfra.local.kdl",
    ".flexinfra.local.kdl",
    "flexinfra.kdl",
    ".flexinfra.kdl",
];

/// Find the manifest for the current invocation.
///
/// Search order:
/// 1. `FLEXINFRA_CONFIG_PATH` environment variable (direct path)
/// 2. Current directory: `flexinfra.local.kdl`, `.flexinfra.local.kdl`,
///    `flexinfra.kdl`, `.flexinfra.kdl`
/// 3. `./.flexinfra/` with the same candidates
/// 4. `~/.config/flexinfra/flexinfra.kdl` (global manifest)
pub fn find_manifest() -> Result<PathBuf> {
    if let Ok(config_path) = std::env::var("FLEXINFRA_CONFIG_PATH") {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(path);
        }
    }

    let current_dir = std::env::current_dir()?;

    for filename in &CANDIDATES {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(path);
        }
    }

    let local_dir = current_dir.join(".flexinfra");
    if local_dir.is_dir() {
        for filename in &CANDIDATES {
            let path = local_dir.join(filename);
            if path.exists() {
                return Ok(path);
            }
        }
    }

    if let Some(config_dir) = dirs::config_dir() {
        let global = config_dir.join("flexinfra").join("flexinfra.kdl");
        if global.exists() {
            return Ok(global);
        }
    }

    Err(CoreError::ManifestNotFound)
}
