//! Configuration repository
//!
//! Serves per-artifact configuration. Lookup order for an artifact `name`:
//!
//! 1. the `artifacts.<name>` entry of the server configuration
//! 2. the `EVAS_<NAME>` environment variable, parsed as JSON
//! 3. an empty object
//!
//! The server resolves this repository with `{ "artifacts": { .. } }`, so
//! every scope that borrows it sees the same table.

use std::env;
use std::sync::Arc;

use async_trait::async_trait;
use evas_domain::Lifecycle;
use evas_domain::error::{Error, Result};
use evas_infrastructure::artifacts::StateCell;
use evas_infrastructure::di::{IocContainer, Repository, SingletonRepositoryFactory};
use evas_infrastructure::error_ext::ErrorContext;
use evas_infrastructure::interface::DomainInterface;
use evas_infrastructure::loader::{ARTIFACT_MODULES, ModuleEntry, ModuleExport};
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::constants::{
    ARTIFACT_ENV_PREFIX, ARTIFACTS_KEY, CONFIGURATION_MODULE_ID, CONFIGURATION_REPOSITORY,
};

/// Per-artifact configuration table
#[derive(Debug)]
pub struct ConfigurationRepository {
    artifacts: Map<String, Value>,
    env_prefix: String,
    state: StateCell,
}

impl ConfigurationRepository {
    /// Repository over the `artifacts` object of `configuration`
    pub fn new(configuration: &Value) -> Result<Self> {
        let artifacts = match configuration.get(ARTIFACTS_KEY) {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(artifacts)) => artifacts.clone(),
            Some(other) => {
                return Err(Error::configuration(format!(
                    "'{ARTIFACTS_KEY}' must be an object, found {other}"
                )));
            }
        };
        Ok(Self {
            artifacts,
            env_prefix: ARTIFACT_ENV_PREFIX.to_string(),
            state: StateCell::default(),
        })
    }

    /// Use `prefix` instead of `EVAS_` for environment fallbacks
    #[must_use]
    pub fn with_env_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Configuration of `artifact`
    pub fn get_config(&self, artifact: &str) -> Result<Value> {
        if let Some(config) = self.artifacts.get(artifact) {
            return Ok(config.clone());
        }

        let variable = self.env_variable(artifact);
        match env::var(&variable) {
            Ok(raw) => serde_json::from_str(&raw)
                .config_context(format!("{variable} is not valid JSON")),
            Err(_) => Ok(Value::Object(Map::new())),
        }
    }

    /// Environment variable consulted for `artifact`
    pub fn env_variable(&self, artifact: &str) -> String {
        let suffix: String = artifact
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect();
        format!("{}{suffix}", self.env_prefix)
    }

    /// Artifact names present in the table, sorted
    pub fn artifact_names(&self) -> Vec<&str> {
        self.artifacts.keys().map(String::as_str).collect()
    }
}

#[async_trait]
impl Lifecycle for ConfigurationRepository {
    async fn load(&self) -> Result<()> {
        self.state.begin_load(CONFIGURATION_REPOSITORY)?;
        debug!(artifacts = self.artifacts.len(), "configuration repository loaded");
        Ok(())
    }

    async fn unload(&self) -> Result<()> {
        self.state.begin_unload(CONFIGURATION_REPOSITORY)
    }
}

impl Repository for ConfigurationRepository {
    fn name(&self) -> &str {
        CONFIGURATION_REPOSITORY
    }
}

/// Factory serving one [`ConfigurationRepository`] per artifacts table
pub fn configuration_factory() -> Arc<SingletonRepositoryFactory> {
    Arc::new(SingletonRepositoryFactory::new(
        CONFIGURATION_REPOSITORY,
        |configuration: &Value, _container: &Arc<IocContainer>| {
            let repository: Arc<dyn Repository> =
                Arc::new(ConfigurationRepository::new(configuration)?);
            Ok(repository)
        },
    ))
}

/// Configuration of `artifact` as seen from `interface`
///
/// Resolves the `Configuration` repository through the interface's
/// container with the server's artifacts table.
pub async fn configuration_for(interface: &DomainInterface, artifact: &str) -> Result<Value> {
    let arguments = json!({ ARTIFACTS_KEY: interface.runtime.artifacts_value() });
    let repository = interface
        .ioc_container
        .resolve_as::<ConfigurationRepository>(CONFIGURATION_REPOSITORY, &arguments)
        .await?;
    repository.get_config(artifact)
}

#[linkme::distributed_slice(ARTIFACT_MODULES)]
static CONFIGURATION_MODULE: ModuleEntry = ModuleEntry {
    path: CONFIGURATION_MODULE_ID,
    export: || ModuleExport::Repository(configuration_factory()),
};
