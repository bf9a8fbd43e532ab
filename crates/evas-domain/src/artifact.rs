//! Artifact value objects
//!
//! Categories, lifecycle states, discovery modes and the instance keys used by
//! factories to memoize their singletons.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Category of a loadable artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactCategory {
    /// Top-level or nested domain scope
    Domain,
    /// Bounded context scope inside a domain or the server
    BoundedContext,
    /// Business-logic unit registering APIs
    Middleware,
    /// Command or query surface
    Surface,
    /// Event subscriber
    EventHandler,
    /// Infrastructure resource served through the IoC container
    Repository,
}

impl ArtifactCategory {
    /// Every category, in declaration order
    pub const ALL: [ArtifactCategory; 6] = [
        Self::Domain,
        Self::BoundedContext,
        Self::Middleware,
        Self::Surface,
        Self::EventHandler,
        Self::Repository,
    ];
}

impl fmt::Display for ArtifactCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Domain => "domain",
            Self::BoundedContext => "bounded context",
            Self::Middleware => "middleware",
            Self::Surface => "surface",
            Self::EventHandler => "event handler",
            Self::Repository => "repository",
        };
        f.write_str(name)
    }
}

/// How discovery enumerates candidate modules under a directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiscoveryMode {
    /// One artifact per child directory, each with an `index` entry module
    Subdirectories,
    /// One artifact per file directly under the directory
    FlatFiles,
}

/// Lifecycle state of an artifact
///
/// `Constructed → Loaded → Unloaded`; `Unloaded` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LifecycleState {
    /// Created, `load` not yet called
    #[default]
    Constructed,
    /// `load` completed
    Loaded,
    /// `unload` called
    Unloaded,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Constructed => "constructed",
            Self::Loaded => "loaded",
            Self::Unloaded => "unloaded",
        };
        f.write_str(name)
    }
}

/// Identity of one memoized instance inside a factory
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceKey(String);

impl InstanceKey {
    /// Key derived from an origin location
    pub fn from_location(location: &Path) -> Self {
        Self(location.to_string_lossy().into_owned())
    }

    /// Key derived from a configuration value
    ///
    /// Equal configurations always produce equal keys; object keys are
    /// serialized in sorted order.
    pub fn from_configuration(configuration: &serde_json::Value) -> Self {
        let digest = Sha256::digest(configuration.to_string().as_bytes());
        Self(hex::encode(digest))
    }

    /// Key for a missing configuration, identical to an empty object
    pub fn empty_configuration() -> Self {
        Self::from_configuration(&serde_json::Value::Object(serde_json::Map::new()))
    }

    /// Raw key text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstanceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for InstanceKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}
