//! Manifest discovery and parsing.

pub mod discovery;
pub mod object;

pub use discovery::{locate_manifests, DiscoveryError};
pub use object::{parse_manifest, ManifestObject, ParseError};
