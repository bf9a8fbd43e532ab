//! Artifact loading
//!
//! [`ModuleManifest`] replaces import-by-path: it maps module ids to the
//! factories compiled into the binary. [`discover`] walks one category
//! directory and imports each candidate from the manifest.

pub mod discovery;
pub mod manifest;

pub use discovery::{DiscoveredArtifact, discover};
pub use manifest::{ARTIFACT_MODULES, ModuleEntry, ModuleExport, ModuleManifest};
