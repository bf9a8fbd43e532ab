//! Repository contract
//!
//! Repositories are infrastructure resources served through the IoC
//! container. Callers receive an opaque `Arc<dyn Repository>` and downcast it
//! to the concrete type they expect.

use std::sync::Arc;

use async_trait::async_trait;
use downcast_rs::{DowncastSync, impl_downcast};
use evas_domain::error::Result;
use evas_domain::{InstanceKey, Lifecycle};
use serde_json::Value;

use super::container::IocContainer;
use super::registry::SingletonRegistry;

/// A loaded infrastructure resource
pub trait Repository: Lifecycle + DowncastSync {
    /// Name the repository is registered under
    fn name(&self) -> &str;
}

impl_downcast!(sync Repository);

/// Factory registered in an IoC container under a repository name
#[async_trait]
pub trait RepositoryFactory: Send + Sync {
    /// Registration name
    fn repository_name(&self) -> &str;

    /// Return the loaded instance for `configuration`, creating it on first use
    async fn create_instances(
        &self,
        configuration: &Value,
        container: &Arc<IocContainer>,
    ) -> Result<Arc<dyn Repository>>;

    /// Destroy the instance for `configuration`, or every instance for `None`
    async fn destroy_instances(&self, configuration: Option<&Value>) -> Result<()>;
}

/// Builds an unloaded repository from its configuration
pub type RepositoryConstructor =
    Arc<dyn Fn(&Value, &Arc<IocContainer>) -> Result<Arc<dyn Repository>> + Send + Sync>;

/// [`RepositoryFactory`] memoizing one instance per configuration
pub struct SingletonRepositoryFactory {
    name: String,
    constructor: RepositoryConstructor,
    instances: SingletonRegistry<dyn Repository>,
}

impl SingletonRepositoryFactory {
    /// Create a factory for `name` using `constructor`
    pub fn new<S, F>(name: S, constructor: F) -> Self
    where
        S: Into<String>,
        F: Fn(&Value, &Arc<IocContainer>) -> Result<Arc<dyn Repository>> + Send + Sync + 'static,
    {
        let name = name.into();
        Self {
            instances: SingletonRegistry::new(format!("repository {name}")),
            name,
            constructor: Arc::new(constructor),
        }
    }

    /// Number of live instances
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }
}

#[async_trait]
impl RepositoryFactory for SingletonRepositoryFactory {
    fn repository_name(&self) -> &str {
        &self.name
    }

    async fn create_instances(
        &self,
        configuration: &Value,
        container: &Arc<IocContainer>,
    ) -> Result<Arc<dyn Repository>> {
        let key = InstanceKey::from_configuration(configuration);
        let constructor = Arc::clone(&self.constructor);
        self.instances
            .get_or_create(key, || async move { constructor(configuration, container) })
            .await
    }

    async fn destroy_instances(&self, configuration: Option<&Value>) -> Result<()> {
        match configuration {
            Some(configuration) => {
                self.instances
                    .destroy(&InstanceKey::from_configuration(configuration))
                    .await
            }
            None => self.instances.destroy_all().await,
        }
    }
}

impl std::fmt::Debug for SingletonRepositoryFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SingletonRepositoryFactory")
            .field("name", &self.name)
            .field("instances", &self.instances.len())
            .finish()
    }
}
