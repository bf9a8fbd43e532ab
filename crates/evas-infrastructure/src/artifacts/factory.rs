//! Artifact factories
//!
//! One factory per artifact module. A factory memoizes one instance per
//! origin location in a [`SingletonRegistry`]; the behaviour constructor
//! supplies the user code plugged into each new instance.

use std::marker::PhantomData;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use evas_domain::error::Result;
use evas_domain::{Artifact, ArtifactCategory, InstanceKey};

use crate::di::SingletonRegistry;
use crate::interface::DomainInterface;
use crate::loader::ModuleExport;

/// Factory exported by a domain, bounded context, middleware, surface or
/// event handler module
#[async_trait]
pub trait ArtifactFactory: Send + Sync {
    /// Category of the artifacts this factory creates
    fn category(&self) -> ArtifactCategory;

    /// Name shared by every instance
    fn artifact_name(&self) -> &str;

    /// Return the loaded instance for `location`, creating it on first use
    async fn create_instances(
        &self,
        location: &Path,
        interface: &DomainInterface,
    ) -> Result<Arc<dyn Artifact>>;

    /// Unload and evict the instance for `location`, or every instance
    async fn destroy_instances(&self, location: Option<&Path>) -> Result<()>;
}

/// Binds a category to its behaviour trait and artifact type
pub trait ArtifactKind: Send + Sync + 'static {
    const CATEGORY: ArtifactCategory;

    /// User behaviour trait object
    type Behavior: ?Sized + Send + Sync;

    /// Concrete artifact built by the factory
    type Instance: Artifact + 'static;

    /// Build an unloaded instance
    fn build(
        name: &str,
        location: &Path,
        interface: &DomainInterface,
        behavior: Box<Self::Behavior>,
    ) -> Self::Instance;
}

/// Produces a fresh behaviour for every new instance
pub type BehaviorConstructor<B> = Arc<dyn Fn() -> Box<B> + Send + Sync>;

/// Generic memoizing factory for one artifact kind
pub struct Factory<K: ArtifactKind> {
    name: String,
    behavior: BehaviorConstructor<K::Behavior>,
    instances: SingletonRegistry<K::Instance>,
    _kind: PhantomData<fn() -> K>,
}

impl<K: ArtifactKind> Factory<K> {
    pub fn new<S, F>(name: S, behavior: F) -> Self
    where
        S: Into<String>,
        F: Fn() -> Box<K::Behavior> + Send + Sync + 'static,
    {
        let name = name.into();
        Self {
            instances: SingletonRegistry::new(format!("{} {name}", K::CATEGORY)),
            name,
            behavior: Arc::new(behavior),
            _kind: PhantomData,
        }
    }

    /// Wrap the factory as a manifest export
    pub fn export(self) -> ModuleExport {
        ModuleExport::Artifact(Arc::new(self))
    }

    /// Loaded instance for `location`, if any
    pub fn instance(&self, location: &Path) -> Option<Arc<K::Instance>> {
        self.instances.get(&InstanceKey::from_location(location))
    }

    /// Number of live instances
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }
}

#[async_trait]
impl<K: ArtifactKind> ArtifactFactory for Factory<K> {
    fn category(&self) -> ArtifactCategory {
        K::CATEGORY
    }

    fn artifact_name(&self) -> &str {
        &self.name
    }

    async fn create_instances(
        &self,
        location: &Path,
        interface: &DomainInterface,
    ) -> Result<Arc<dyn Artifact>> {
        let behavior = Arc::clone(&self.behavior);
        let name = self.name.as_str();
        let instance: Arc<dyn Artifact> = self
            .instances
            .get_or_create(InstanceKey::from_location(location), || async move {
                Ok(Arc::new(K::build(name, location, interface, behavior())))
            })
            .await?;
        Ok(instance)
    }

    async fn destroy_instances(&self, location: Option<&Path>) -> Result<()> {
        match location {
            Some(location) => {
                self.instances
                    .destroy(&InstanceKey::from_location(location))
                    .await
            }
            None => self.instances.destroy_all().await,
        }
    }
}

impl<K: ArtifactKind> std::fmt::Debug for Factory<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Factory")
            .field("category", &K::CATEGORY)
            .field("name", &self.name)
            .field("instances", &self.instances.len())
            .finish()
    }
}
