//! Local file expansion
//!
//! Resolves a [`FileSpec`] to the concrete, ordered list of local paths the
//! bridge should push.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tzb_core::prelude::*;
use tzb_core::{FileFilter, FileSpec};

/// Expands a [`FileSpec`] into concrete paths
#[trait_variant::make(FileLister: Send)]
pub trait LocalFileLister {
    async fn list(&self, spec: &FileSpec) -> Result<Vec<String>>;
}

/// [`FileLister`] over the local filesystem using glob patterns
///
/// Relative patterns are evaluated against `base_dir` when one is set,
/// otherwise against the process working directory.
#[derive(Debug, Clone, Default)]
pub struct GlobLister {
    base_dir: Option<PathBuf>,
}

impl GlobLister {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
        }
    }

    fn full_pattern(&self, pattern: &str) -> String {
        match &self.base_dir {
            Some(base) if Path::new(pattern).is_relative() => {
                base.join(pattern).to_string_lossy().to_string()
            }
            _ => pattern.to_string(),
        }
    }
}

impl FileLister for GlobLister {
    async fn list(&self, spec: &FileSpec) -> Result<Vec<String>> {
        let (pattern, filter) = match spec {
            FileSpec::Pattern { pattern, filter } => (self.full_pattern(pattern), *filter),
            literal => return Ok(literal.as_literal_paths().unwrap_or_default()),
        };

        let paths = tokio::task::spawn_blocking(move || expand(&pattern, filter))
            .await
            .map_err(|e| Error::transport(format!("File listing task failed: {}", e)))??;

        Ok(paths
            .into_iter()
            .map(|p| p.to_string_lossy().to_string())
            .collect())
    }
}

fn expand(pattern: &str, filter: Option<FileFilter>) -> Result<Vec<PathBuf>> {
    let entries = glob::glob(pattern)
        .map_err(|e| Error::invalid_request(format!("Invalid pattern '{}': {}", pattern, e)))?;

    let mut matches = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) => matches.push(path),
            Err(e) => debug!("Skipping unreadable match for '{}': {}", pattern, e),
        }
    }

    debug!("Pattern '{}' matched {} file(s)", pattern, matches.len());

    Ok(match filter {
        Some(FileFilter::Latest) => latest_path(&matches).into_iter().collect(),
        None => matches,
    })
}

/// The most recently modified of `paths`
///
/// Ties go to the path that comes first in `paths`. Paths whose metadata
/// cannot be read are ignored.
pub fn latest_path(paths: &[PathBuf]) -> Option<PathBuf> {
    let mut newest: Option<(SystemTime, &PathBuf)> = None;

    for path in paths {
        let Some(modified) = std::fs::metadata(path)
            .and_then(|m| m.modified())
            .inspect_err(|e| debug!("Cannot read mtime of {}: {}", path.display(), e))
            .ok()
        else {
            continue;
        };

        match newest {
            Some((best, _)) if modified <= best => {}
            _ => newest = Some((modified, path)),
        }
    }

    newest.map(|(_, path)| path.clone())
}
