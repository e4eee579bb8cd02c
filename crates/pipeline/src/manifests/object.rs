//! Manifest object parsing.
//!
//! Turns one file's raw bytes into a [`ManifestObject`] or a typed rejection
//! reason. Parsing is a pure transformation; it performs no I/O and does not
//! enforce the identity fields (the locator decides whether an object with
//! empty fields counts as a manifest at all).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Token that separates documents in a multi-document YAML stream.
const DOCUMENT_SEPARATOR: &str = "---";

/// Reasons a file's content is not usable as a manifest.
#[derive(Error, Debug)]
pub enum ParseError {
    /// Content contains a `---` document separator. Multi-document files are
    /// rejected outright, never split.
    #[error("multi-document manifests are not supported")]
    UnsupportedMultiDocument,

    /// Content is not decodable as a single YAML mapping.
    #[error("failed to decode manifest document: {0}")]
    MalformedDocument(#[from] serde_yaml::Error),
}

/// Decode shape for the identity fields of a Kubernetes resource.
///
/// Missing fields decode to empty strings so the locator can treat them as
/// "not a manifest" instead of a decode failure; unknown fields are ignored.
#[derive(Debug, Default, Deserialize)]
struct ManifestDoc {
    #[serde(rename = "apiVersion", default)]
    api_version: String,
    #[serde(default)]
    kind: String,
    #[serde(default)]
    metadata: ManifestMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct ManifestMetadata {
    #[serde(default)]
    name: String,
}

/// One parsed Kubernetes resource definition, tracked through the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestObject {
    /// `apiVersion` of the resource.
    pub api_version: String,

    /// Resource `kind` (Deployment, Service, ...).
    pub kind: String,

    /// `metadata.name` of the resource.
    pub name: String,

    /// Original file bytes, retained verbatim for re-emission and diffing.
    pub raw_content: Vec<u8>,

    /// Path the manifest was read from.
    pub source_path: PathBuf,

    /// Set once the deploy stage reports success.
    pub deployed: bool,

    /// Failure diagnostics appended by downstream stages.
    pub error_log: String,
}

impl ManifestObject {
    /// Registry key for this object: `"<Kind>-<metadataName>"`.
    #[must_use]
    pub fn registry_key(&self) -> String {
        format!("{}-{}", self.kind, self.name)
    }

    /// Returns `true` when `apiVersion`, `kind`, and `metadata.name` are all
    /// present. Objects without a full identity never enter the registry.
    #[must_use]
    pub fn has_identity(&self) -> bool {
        !self.api_version.is_empty() && !self.kind.is_empty() && !self.name.is_empty()
    }
}

/// Parse a single manifest file's bytes into a [`ManifestObject`].
///
/// The returned object has an empty `source_path`; the locator records the
/// path once it decides to keep the object.
pub fn parse_manifest(content: &[u8]) -> Result<ManifestObject, ParseError> {
    if String::from_utf8_lossy(content).contains(DOCUMENT_SEPARATOR) {
        return Err(ParseError::UnsupportedMultiDocument);
    }

    let doc: ManifestDoc = serde_yaml::from_slice(content)?;

    Ok(ManifestObject {
        api_version: doc.api_version,
        kind: doc.kind,
        name: doc.metadata.name,
        raw_content: content.to_vec(),
        source_path: PathBuf::new(),
        deployed: false,
        error_log: String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_DEPLOYMENT: &str = r"
apiVersion: apps/v1
kind: Deployment
metadata:
  name: app1
  labels:
    app: app1
spec:
  replicas: 2
";

    #[test]
    fn test_parse_valid_manifest() {
        let object = parse_manifest(VALID_DEPLOYMENT.as_bytes()).unwrap();
        assert_eq!(object.api_version, "apps/v1");
        assert_eq!(object.kind, "Deployment");
        assert_eq!(object.name, "app1");
        assert_eq!(object.raw_content, VALID_DEPLOYMENT.as_bytes());
        assert!(!object.deployed);
        assert!(object.error_log.is_empty());
    }

    #[test]
    fn test_registry_key_joins_kind_and_name() {
        let object = parse_manifest(VALID_DEPLOYMENT.as_bytes()).unwrap();
        assert_eq!(object.registry_key(), "Deployment-app1");
    }

    #[test]
    fn test_multi_document_rejected_even_with_valid_lead_document() {
        let content = format!("{VALID_DEPLOYMENT}---\nkind: Service\n");
        let err = parse_manifest(content.as_bytes()).unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedMultiDocument));
    }

    #[test]
    fn test_separator_anywhere_in_text_rejects() {
        let content = "kind: ConfigMap\ndata:\n  banner: \"---\"\n";
        let err = parse_manifest(content.as_bytes()).unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedMultiDocument));
    }

    #[test]
    fn test_malformed_yaml_rejected() {
        let err = parse_manifest(b"kind: [unclosed").unwrap_err();
        assert!(matches!(err, ParseError::MalformedDocument(_)));
    }

    #[test]
    fn test_missing_fields_decode_to_empty_strings() {
        let object = parse_manifest(b"apiVersion: v1\nmetadata:\n  name: cfg\n").unwrap();
        assert_eq!(object.api_version, "v1");
        assert!(object.kind.is_empty());
        assert_eq!(object.name, "cfg");
        assert!(!object.has_identity());
    }

    #[test]
    fn test_has_identity_requires_all_three_fields() {
        let object = parse_manifest(VALID_DEPLOYMENT.as_bytes()).unwrap();
        assert!(object.has_identity());

        let object = parse_manifest(b"kind: Service\nmetadata:\n  name: web\n").unwrap();
        assert!(!object.has_identity());
    }
}
