//! Pipeline registry.
//!
//! Owns the keyed collection of discovered manifests for one pipeline run.
//! Populated once from a directory scan, then mutated in place by the deploy
//! stage (success flag, failure log) until the run ends. Entries are never
//! removed mid-run and there is no re-initialization path.

use std::collections::{BTreeSet, HashMap};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::manifests::{locate_manifests, DiscoveryError, ManifestObject};

/// Registry initialization failures. All are fatal to the pipeline run.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Discovery failed at the storage layer.
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    /// The walk succeeded but found nothing deployable. An empty manifest
    /// set is a configuration error for this stage, not a valid result.
    #[error("no deployable manifests found under '{}'", path.display())]
    NoManifestsFound { path: PathBuf },
}

/// Mutable pipeline state threaded through the analyze, build, scan, and
/// deploy stages of one run.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PipelineState {
    /// Discovered manifests keyed by `"<Kind>-<metadataName>"`.
    manifests: HashMap<String, ManifestObject>,
}

impl PipelineState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Populate the registry from a single scan of `root`.
    ///
    /// Expects an unpopulated state; the registry lifecycle is one
    /// initialization followed by field-level mutation only. Two manifests
    /// producing the same key collapse to the last one discovered.
    pub fn initialize_manifests(&mut self, root: &Path) -> Result<(), RegistryError> {
        let objects = locate_manifests(root)?;
        if objects.is_empty() {
            return Err(RegistryError::NoManifestsFound {
                path: root.to_path_buf(),
            });
        }

        for object in objects {
            self.register(object);
        }

        info!(
            "Registered {} manifest(s) from {}",
            self.manifests.len(),
            root.display()
        );
        Ok(())
    }

    fn register(&mut self, object: ManifestObject) {
        let key = object.registry_key();
        let source = object.source_path.clone();
        if let Some(previous) = self.manifests.insert(key.clone(), object) {
            warn!(
                "Duplicate manifest key '{}': {} replaces {}",
                key,
                source.display(),
                previous.source_path.display()
            );
        }
    }

    /// Keys of every manifest not yet marked deployed.
    #[must_use]
    pub fn pending_manifests(&self) -> BTreeSet<String> {
        self.manifests
            .iter()
            .filter(|(_, object)| !object.deployed)
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Aggregated deploy-failure report, one block per manifest with a
    /// non-empty error log. Empty when nothing has failed. Block order
    /// follows registry iteration and is unspecified.
    #[must_use]
    pub fn format_errors(&self) -> String {
        let mut report = String::new();
        for (key, object) in &self.manifests {
            if object.error_log.is_empty() {
                continue;
            }
            let _ = writeln!(report, "Manifest \"{key}\":");
            report.push_str(&object.error_log);
            if !object.error_log.ends_with('\n') {
                report.push('\n');
            }
        }
        report
    }

    /// Mark a manifest successfully deployed.
    ///
    /// Returns `false` when the key is not in the registry.
    pub fn mark_deployed(&mut self, key: &str) -> bool {
        match self.manifests.get_mut(key) {
            Some(object) => {
                object.deployed = true;
                true
            }
            None => false,
        }
    }

    /// Append a failure line to a manifest's error log.
    ///
    /// Returns `false` when the key is not in the registry.
    pub fn record_deploy_error(&mut self, key: &str, message: &str) -> bool {
        match self.manifests.get_mut(key) {
            Some(object) => {
                object.error_log.push_str(message);
                object.error_log.push('\n');
                true
            }
            None => false,
        }
    }

    /// Look up a manifest by registry key.
    #[must_use]
    pub fn manifest(&self, key: &str) -> Option<&ManifestObject> {
        self.manifests.get(key)
    }

    /// Number of registered manifests.
    #[must_use]
    pub fn manifest_count(&self) -> usize {
        self.manifests.len()
    }

    /// Whether the registry has been populated.
    #[must_use]
    pub fn is_populated(&self) -> bool {
        !self.manifests.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifests::parse_manifest;

    fn manifest(kind: &str, name: &str, source: &str) -> ManifestObject {
        let content = format!("apiVersion: apps/v1\nkind: {kind}\nmetadata:\n  name: {name}\n");
        let mut object = parse_manifest(content.as_bytes()).unwrap();
        object.source_path = PathBuf::from(source);
        object
    }

    fn populated_state() -> PipelineState {
        let mut state = PipelineState::new();
        state.register(manifest("Deployment", "app1", "manifests/app1.yaml"));
        state.register(manifest("Service", "web", "manifests/web.yaml"));
        state
    }

    #[test]
    fn test_pending_manifests_starts_with_every_key() {
        let state = populated_state();
        let pending = state.pending_manifests();
        assert_eq!(pending.len(), 2);
        assert!(pending.contains("Deployment-app1"));
        assert!(pending.contains("Service-web"));
    }

    #[test]
    fn test_mark_deployed_removes_key_from_pending() {
        let mut state = populated_state();
        assert!(state.mark_deployed("Deployment-app1"));

        let pending = state.pending_manifests();
        assert_eq!(pending.len(), 1);
        assert!(pending.contains("Service-web"));
        assert!(state.manifest("Deployment-app1").unwrap().deployed);
    }

    #[test]
    fn test_mark_deployed_unknown_key_is_rejected() {
        let mut state = populated_state();
        assert!(!state.mark_deployed("Deployment-ghost"));
    }

    #[test]
    fn test_format_errors_empty_when_nothing_failed() {
        let state = populated_state();
        assert_eq!(state.format_errors(), "");
    }

    #[test]
    fn test_format_errors_renders_one_block_per_failure() {
        let mut state = populated_state();
        assert!(state.record_deploy_error("Service-web", "image pull failed"));

        assert_eq!(
            state.format_errors(),
            "Manifest \"Service-web\":\nimage pull failed\n"
        );
    }

    #[test]
    fn test_record_deploy_error_accumulates_lines() {
        let mut state = populated_state();
        state.record_deploy_error("Service-web", "image pull failed");
        state.record_deploy_error("Service-web", "rollout timed out");

        let log = &state.manifest("Service-web").unwrap().error_log;
        assert_eq!(log, "image pull failed\nrollout timed out\n");
    }

    #[test]
    fn test_duplicate_key_overwrites_earlier_entry() {
        let mut state = PipelineState::new();
        state.register(manifest("Deployment", "app1", "manifests/a/app1.yaml"));
        state.register(manifest("Deployment", "app1", "manifests/b/app1.yaml"));

        assert_eq!(state.manifest_count(), 1);
        assert_eq!(
            state.manifest("Deployment-app1").unwrap().source_path,
            PathBuf::from("manifests/b/app1.yaml")
        );
    }
}
