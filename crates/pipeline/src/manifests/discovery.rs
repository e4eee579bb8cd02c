//! Manifest discovery over a directory tree.
//!
//! Walks the manifest root recursively, parses every `.yaml`/`.yml` file it
//! finds, and returns the valid objects as one eagerly materialized list.
//! Storage-layer failures abort the walk; individual files that fail to parse
//! or lack a full identity are logged and skipped so one bad file cannot hide
//! its valid siblings.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

use super::object::{parse_manifest, ManifestObject, ParseError};

/// File extensions considered manifest candidates.
const MANIFEST_EXTENSIONS: [&str; 2] = ["yaml", "yml"];

/// Fatal discovery failures. Each aborts the walk; partial scans are never
/// returned.
#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// The manifest root (or an entry under it) could not be accessed.
    #[error("cannot access manifest path '{}': {source}", path.display())]
    PathAccess { path: PathBuf, source: io::Error },

    /// The manifest root exists but is not a directory.
    #[error("manifest root '{}' is not a directory", path.display())]
    NotADirectory { path: PathBuf },

    /// A manifest file could not be read.
    #[error("failed to read manifest file '{}': {source}", path.display())]
    FileRead { path: PathBuf, source: io::Error },
}

fn is_manifest_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| MANIFEST_EXTENSIONS.contains(&ext))
}

/// Recursively discover valid manifest objects under `root`.
///
/// Zero discovered objects is a successful (empty) result; whether an empty
/// manifest set is acceptable is the caller's call, not discovery's.
pub fn locate_manifests(root: &Path) -> Result<Vec<ManifestObject>, DiscoveryError> {
    let metadata = fs::metadata(root).map_err(|source| DiscoveryError::PathAccess {
        path: root.to_path_buf(),
        source,
    })?;
    if !metadata.is_dir() {
        return Err(DiscoveryError::NotADirectory {
            path: root.to_path_buf(),
        });
    }

    let mut objects = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|err| {
            let path = err
                .path()
                .map_or_else(|| root.to_path_buf(), Path::to_path_buf);
            DiscoveryError::PathAccess {
                path,
                source: err.into(),
            }
        })?;

        if !entry.file_type().is_file() || !is_manifest_file(entry.path()) {
            continue;
        }

        let path = entry.path();
        let content = fs::read(path).map_err(|source| DiscoveryError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

        match parse_manifest(&content) {
            Ok(mut object) => {
                if !object.has_identity() {
                    debug!(
                        "Skipping {}: missing apiVersion, kind, or metadata.name",
                        path.display()
                    );
                    continue;
                }
                object.source_path = path.to_path_buf();
                objects.push(object);
            }
            Err(ParseError::UnsupportedMultiDocument) => {
                warn!(
                    "Skipping {}: multi-document manifests are not supported",
                    path.display()
                );
            }
            Err(err) => {
                warn!("Skipping {}: {}", path.display(), err);
            }
        }
    }

    debug!(
        "Discovered {} manifest(s) under {}",
        objects.len(),
        root.display()
    );
    Ok(objects)
}
