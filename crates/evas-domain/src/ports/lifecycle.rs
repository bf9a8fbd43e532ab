//! Artifact lifecycle contract
//!
//! Every artifact moves through `Constructed → Loaded → Unloaded` exactly
//! once. Implementations compose shared base steps explicitly: base steps run
//! first in `load` and last in `unload`, so layers nest like destructors.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::artifact::{ArtifactCategory, LifecycleState};
use crate::error::Result;

/// Two-method lifecycle state machine
///
/// # Example
///
/// ```no_run
/// use evas_domain::ports::Lifecycle;
/// use std::sync::Arc;
///
/// async fn bounce(artifact: Arc<dyn Lifecycle>) -> evas_domain::Result<()> {
///     artifact.load().await?;
///     artifact.unload().await
/// }
/// ```
#[async_trait]
pub trait Lifecycle: Send + Sync {
    /// Bring the artifact up; fails if it was already loaded or unloaded
    async fn load(&self) -> Result<()>;

    /// Tear the artifact down; fails unless it is currently loaded
    async fn unload(&self) -> Result<()>;
}

/// A named, categorized, lifecycle-managed unit
pub trait Artifact: Lifecycle {
    /// Stable artifact name
    fn name(&self) -> &str;

    /// Category this artifact belongs to
    fn category(&self) -> ArtifactCategory;

    /// Current lifecycle state
    fn state(&self) -> LifecycleState;

    /// Origin location, released on unload
    fn location(&self) -> Option<PathBuf>;
}
