//! Discovery configuration.
//!
//! The process environment is read in exactly one place, at pipeline setup;
//! everything past this boundary receives the workspace root as a value.

use std::env;
use std::path::{Path, PathBuf};

/// Environment variable naming the workspace the pipeline operates in.
const WORKSPACE_ROOT_ENV: &str = "WORKSPACE_ROOT";

/// Directory under the workspace root that holds deployment manifests.
const MANIFESTS_DIR: &str = "manifests";

/// Where manifest discovery starts when no explicit path is supplied.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Workspace root for this pipeline run.
    pub workspace_root: PathBuf,
}

impl DiscoveryConfig {
    /// Create a config with an explicit workspace root.
    pub fn new(workspace_root: impl Into<PathBuf>) -> Self {
        Self {
            workspace_root: workspace_root.into(),
        }
    }

    /// Build from the process environment.
    ///
    /// Uses `WORKSPACE_ROOT` if set, otherwise the current directory.
    #[must_use]
    pub fn from_env() -> Self {
        let workspace_root =
            env::var(WORKSPACE_ROOT_ENV).map_or_else(|_| PathBuf::from("."), PathBuf::from);
        Self { workspace_root }
    }

    /// Resolve the manifest root for a discovery run.
    ///
    /// An empty or absent override falls back to `<workspace_root>/manifests`.
    #[must_use]
    pub fn manifest_root(&self, override_path: Option<&Path>) -> PathBuf {
        match override_path {
            Some(path) if !path.as_os_str().is_empty() => path.to_path_buf(),
            _ => self.workspace_root.join(MANIFESTS_DIR),
        }
    }
}
