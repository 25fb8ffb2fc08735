//! Locating the `sdb` executable
//!
//! Checks `PATH` first, then the tool directories of a Tizen SDK / Tizen
//! Studio installation pointed to by environment variables.

use std::path::{Path, PathBuf};

use tzb_core::prelude::*;

#[cfg(windows)]
const SDB_BINARY: &str = "sdb.exe";
#[cfg(not(windows))]
const SDB_BINARY: &str = "sdb";

/// Environment variables that may point at an SDK installation
const SDK_ENV_VARS: &[&str] = &["TIZEN_SDK", "TIZEN_STUDIO"];

/// Find the sdb executable
///
/// An explicitly configured path wins and is returned unchecked, so that
/// wrappers and scripts can stand in for sdb.
pub fn locate_sdb(configured: Option<&str>) -> Result<String> {
    if let Some(path) = configured {
        return Ok(path.to_string());
    }

    if let Ok(path) = which::which(SDB_BINARY) {
        debug!("Found sdb on PATH: {}", path.display());
        return Ok(path.to_string_lossy().to_string());
    }

    sdk_candidates()
        .into_iter()
        .find(|candidate| candidate.is_file())
        .map(|path| {
            debug!("Found sdb in SDK: {}", path.display());
            path.to_string_lossy().to_string()
        })
        .ok_or(Error::SdbNotFound)
}

/// SDK locations to try, in priority order
fn sdk_candidates() -> Vec<PathBuf> {
    SDK_ENV_VARS
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .map(|root| sdb_in_sdk(Path::new(&root)))
        .collect()
}

fn sdb_in_sdk(root: &Path) -> PathBuf {
    root.join("tools").join(SDB_BINARY)
}
