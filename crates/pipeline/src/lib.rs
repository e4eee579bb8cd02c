//! # Pipeline
//!
//! Manifest-handling core of the Stevedore containerization pipeline
//! (analyze, build, scan, deploy).
//!
//! This crate provides:
//! - Discovery of Kubernetes manifests under a workspace directory
//! - Parsing and validation of single-document manifest files
//! - A per-run registry tracking the deployment status of each manifest
//!
//! The surrounding pipeline surfaces (tool registry, session persistence,
//! transport, the AI analyze/build/scan stages) are external collaborators:
//! they hand this crate a manifest root and record per-object deploy
//! outcomes on the registry it owns.
//!
//! ## Example
//!
//! ```rust,ignore
//! use pipeline::{DiscoveryConfig, PipelineState};
//!
//! let config = DiscoveryConfig::from_env();
//! let mut state = PipelineState::new();
//! state.initialize_manifests(&config.manifest_root(None))?;
//!
//! for key in state.pending_manifests() {
//!     // deploy, then state.mark_deployed(&key) or
//!     // state.record_deploy_error(&key, "...")
//! }
//! ```

// Discovery configuration
pub mod config;

// Manifest parsing and discovery
pub mod manifests;

// Per-run deployment registry
pub mod registry;

// Re-export key types for convenience
pub use config::DiscoveryConfig;
pub use manifests::{locate_manifests, parse_manifest, DiscoveryError, ManifestObject, ParseError};
pub use registry::{PipelineState, RegistryError};
