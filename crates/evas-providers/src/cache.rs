//! Moka cache repository
//!
//! JSON values keyed by string, bounded by entry count with an optional
//! time-to-live. One cache per distinct configuration; unloading a cache
//! drops its entries.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use evas_domain::Lifecycle;
use evas_domain::error::Result;
use evas_infrastructure::artifacts::StateCell;
use evas_infrastructure::di::{IocContainer, Repository, SingletonRepositoryFactory};
use evas_infrastructure::loader::{ARTIFACT_MODULES, ModuleEntry, ModuleExport};
use moka::future::Cache;
use serde::Deserialize;
use serde_json::Value;

use crate::constants::{CACHE_DEFAULT_CAPACITY, CACHE_MODULE_ID, CACHE_REPOSITORY};
use crate::settings::from_configuration;

/// Cache configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Maximum number of entries
    pub max_capacity: u64,
    /// Entry lifetime in seconds; entries never expire when unset
    pub ttl_secs: Option<u64>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            max_capacity: CACHE_DEFAULT_CAPACITY,
            ttl_secs: None,
        }
    }
}

/// In-memory JSON cache
pub struct CacheRepository {
    cache: Cache<String, Value>,
    settings: CacheSettings,
    state: StateCell,
}

impl CacheRepository {
    pub fn new(settings: CacheSettings) -> Self {
        let mut builder = Cache::builder().max_capacity(settings.max_capacity);
        if let Some(ttl) = settings.ttl_secs {
            builder = builder.time_to_live(Duration::from_secs(ttl));
        }
        Self {
            cache: builder.build(),
            settings,
            state: StateCell::default(),
        }
    }

    pub fn settings(&self) -> &CacheSettings {
        &self.settings
    }

    pub async fn get(&self, key: &str) -> Option<Value> {
        self.cache.get(key).await
    }

    pub async fn set<K: Into<String>>(&self, key: K, value: Value) {
        self.cache.insert(key.into(), value).await;
    }

    /// Remove `key`; returns whether it was present
    pub async fn delete(&self, key: &str) -> bool {
        self.cache.remove(key).await.is_some()
    }

    pub async fn clear(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }

    /// Number of live entries
    pub async fn len(&self) -> u64 {
        // Run pending tasks to ensure entry_count is accurate
        self.cache.run_pending_tasks().await;
        self.cache.entry_count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl Lifecycle for CacheRepository {
    async fn load(&self) -> Result<()> {
        self.state.begin_load(CACHE_REPOSITORY)
    }

    async fn unload(&self) -> Result<()> {
        self.state.begin_unload(CACHE_REPOSITORY)?;
        self.clear().await;
        Ok(())
    }
}

impl Repository for CacheRepository {
    fn name(&self) -> &str {
        CACHE_REPOSITORY
    }
}

impl std::fmt::Debug for CacheRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheRepository")
            .field("settings", &self.settings)
            .field("entries", &self.cache.entry_count())
            .finish()
    }
}

/// Factory serving one [`CacheRepository`] per configuration
pub fn cache_factory() -> Arc<SingletonRepositoryFactory> {
    Arc::new(SingletonRepositoryFactory::new(
        CACHE_REPOSITORY,
        |configuration: &Value, _container: &Arc<IocContainer>| {
            let settings: CacheSettings = from_configuration(CACHE_REPOSITORY, configuration)?;
            let repository: Arc<dyn Repository> = Arc::new(CacheRepository::new(settings));
            Ok(repository)
        },
    ))
}

#[linkme::distributed_slice(ARTIFACT_MODULES)]
static CACHE_MODULE: ModuleEntry = ModuleEntry {
    path: CACHE_MODULE_ID,
    export: || ModuleExport::Repository(cache_factory()),
};
