//! Application server factory
//!
//! One server per artifact root. Creating an instance loads it; later calls
//! with the same root return the loaded server.

use std::path::Path;
use std::sync::Arc;

use evas_domain::InstanceKey;
use evas_domain::error::Result;
use evas_infrastructure::config::AppConfig;
use evas_infrastructure::di::SingletonRegistry;
use evas_infrastructure::loader::ModuleManifest;

use crate::server::ApplicationServer;

/// Memoizing factory of [`ApplicationServer`]
pub struct ApplicationServerFactory {
    manifest: ModuleManifest,
    instances: SingletonRegistry<ApplicationServer>,
}

impl ApplicationServerFactory {
    pub fn new(manifest: ModuleManifest) -> Self {
        Self {
            manifest,
            instances: SingletonRegistry::new("application server"),
        }
    }

    /// Loaded server for `config.server.root`, created on first use
    pub async fn create_instance(&self, config: AppConfig) -> Result<Arc<ApplicationServer>> {
        let key = InstanceKey::from_location(&config.server.root);
        let manifest = self.manifest.clone();
        self.instances
            .get_or_create(key, || async move {
                Ok(Arc::new(ApplicationServer::new(config, manifest)))
            })
            .await
    }

    /// Loaded server for `root`, if any
    pub fn instance(&self, root: &Path) -> Option<Arc<ApplicationServer>> {
        self.instances.get(&InstanceKey::from_location(root))
    }

    /// Unload and evict the server for `root`, or every server
    pub async fn destroy_instances(&self, root: Option<&Path>) -> Result<()> {
        match root {
            Some(root) => self.instances.destroy(&InstanceKey::from_location(root)).await,
            None => self.instances.destroy_all().await,
        }
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }
}

impl std::fmt::Debug for ApplicationServerFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApplicationServerFactory")
            .field("modules", &self.manifest.len())
            .field("instances", &self.instances.len())
            .finish()
    }
}
