//! Case input discovery and loading.
//!
//! Reads collector blobs from disk, either as three separate files or as a
//! single case bundle, and discovers the bundles of a batch directory.

use crate::models::{CaseBundle, SourceBlobs};
use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Largest input file accepted, in bytes.
pub const MAX_CASE_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// A case bundle found on disk.
#[derive(Debug, Clone)]
pub struct CaseFile {
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
}

/// Scanner for the case bundles of a batch directory.
pub struct CaseScanner {
    root: PathBuf,
}

impl CaseScanner {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// List every `*.json` bundle directly under the root, sorted by path.
    ///
    /// Hidden files, subdirectories and oversized files are skipped.
    pub fn scan(&self) -> Result<Vec<CaseFile>> {
        let entries = fs::read_dir(&self.root)
            .with_context(|| format!("Failed to read batch directory: {}", self.root.display()))?;

        let mut files = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if !self.matches(&path) {
                continue;
            }

            match fs::metadata(&path) {
                Ok(metadata) if metadata.len() <= MAX_CASE_FILE_SIZE => {
                    files.push(CaseFile {
                        path,
                        size: metadata.len(),
                    });
                }
                Ok(metadata) => {
                    warn!(
                        "Skipping {} ({} bytes exceeds the size limit)",
                        path.display(),
                        metadata.len()
                    );
                }
                Err(e) => debug!("Cannot stat {}: {}", path.display(), e),
            }
        }

        files.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(files)
    }

    /// Check if a path looks like a case bundle.
    fn matches(&self, path: &Path) -> bool {
        let hidden = path
            .file_name()
            .and_then(|n| n.to_str())
            .map_or(true, |name| name.starts_with('.'));
        if hidden || !path.is_file() {
            return false;
        }

        path.extension().and_then(|e| e.to_str()) == Some("json")
    }
}

/// Read and parse one JSON file.
pub fn read_json(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {}", path.display()))
}

/// Load a case bundle file.
pub fn load_case(path: &Path) -> Result<CaseBundle> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read case file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Invalid case bundle: {}", path.display()))
}

/// Load the blobs given as separate files; absent paths stay `None`.
pub fn load_blobs(
    social: Option<&Path>,
    images: Option<&Path>,
    emails: Option<&Path>,
) -> Result<SourceBlobs> {
    let load = |path: Option<&Path>| path.map(read_json).transpose();

    Ok(SourceBlobs {
        social: load(social)?,
        images: load(images)?,
        emails: load(emails)?,
    })
}
