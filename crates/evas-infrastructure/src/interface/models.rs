//! Domain model lookup
//!
//! Models are requested by `{ type, name }` and built by the provider
//! registered for that type. Each request resolves independently.

use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use evas_domain::error::{Error, Result};
use futures::future::join_all;
use serde_json::Value;

use crate::di::IocContainer;

/// Opaque model handle; callers downcast to the type they expect
pub type Model = Arc<dyn Any + Send + Sync>;

/// Builds models of one type
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Build the model `name`, resolving backing repositories from `container`
    async fn load_model(
        &self,
        name: &str,
        configuration: &Value,
        container: &Arc<IocContainer>,
    ) -> Result<Model>;
}

/// One model to look up
#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequest {
    pub model_type: String,
    pub name: String,
    pub configuration: Value,
}

impl ModelRequest {
    pub fn new<T: Into<String>, N: Into<String>>(model_type: T, name: N) -> Self {
        Self {
            model_type: model_type.into(),
            name: name.into(),
            configuration: Value::Null,
        }
    }

    #[must_use]
    pub fn with_configuration(mut self, configuration: Value) -> Self {
        self.configuration = configuration;
        self
    }
}

/// Outcome of one [`ModelRequest`]
pub struct ModelResolution {
    pub request: ModelRequest,
    pub model: Result<Model>,
}

/// Model providers of one domain
#[derive(Clone)]
pub struct ModelCatalog {
    container: Arc<IocContainer>,
    providers: Arc<DashMap<String, Arc<dyn ModelProvider>>>,
}

impl ModelCatalog {
    /// Empty catalog resolving repositories from `container`
    pub fn new(container: Arc<IocContainer>) -> Self {
        Self {
            container,
            providers: Arc::new(DashMap::new()),
        }
    }

    /// Register the provider for `model_type`, replacing any previous one
    pub fn register_provider<S: Into<String>>(
        &self,
        model_type: S,
        provider: Arc<dyn ModelProvider>,
    ) {
        self.providers.insert(model_type.into(), provider);
    }

    /// True when a provider handles `model_type`
    pub fn has_provider(&self, model_type: &str) -> bool {
        self.providers.contains_key(model_type)
    }

    /// Resolve every request concurrently
    pub async fn get(&self, requests: Vec<ModelRequest>) -> Vec<ModelResolution> {
        join_all(requests.into_iter().map(|request| async move {
            let model = self.load(&request).await;
            ModelResolution { request, model }
        }))
        .await
    }

    async fn load(&self, request: &ModelRequest) -> Result<Model> {
        let provider = self
            .providers
            .get(&request.model_type)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| {
                Error::internal(format!("No model provider for type '{}'", request.model_type))
            })?;
        provider
            .load_model(request.name.trim(), &request.configuration, &self.container)
            .await
    }
}

impl std::fmt::Debug for ModelCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelCatalog")
            .field("domain_path", &self.container.domain_path())
            .field("providers", &self.providers.len())
            .finish()
    }
}
