//! Domain interface
//!
//! The capability bundle handed from every scope to its children. Each layer
//! clones its parent's interface and replaces the capabilities it scopes
//! itself; nothing the parent provided is ever removed.
//!
//! | Capability | Server | Domain | Bounded context |
//! |------------|--------|--------|-----------------|
//! | `api_registry` | root | child | child |
//! | `ioc_container` | root | child | inherited |
//! | `event_emitter` | root | inherited | inherited |
//! | `models` | empty | own | inherited |
//! | `templates` | empty | own | inherited |
//! | `serializer` | empty | own | inherited |
//! | `runtime` | root | inherited | inherited |

pub mod api_registry;
pub mod events;
pub mod models;
pub mod serializer;
pub mod templates;

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde_json::Value;

pub use api_registry::{ApiHandler, ApiRegistry};
pub use events::EventEmitter;
pub use models::{Model, ModelCatalog, ModelProvider, ModelRequest, ModelResolution};
pub use serializer::{ResourceType, TypeRegistry};
pub use templates::{TemplateRequest, TemplateResolution, TemplateStore};

use crate::di::IocContainer;
use crate::loader::ModuleManifest;

/// Process-wide runtime switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuntimeSettings {
    /// Trace constructor, load and unload steps of every artifact
    pub diagnostics: bool,
}

/// Shared state every scope can read
#[derive(Debug)]
pub struct RuntimeContext {
    manifest: ModuleManifest,
    settings: RuntimeSettings,
    artifacts: BTreeMap<String, Value>,
}

impl RuntimeContext {
    pub fn new(manifest: ModuleManifest, settings: RuntimeSettings) -> Self {
        Self {
            manifest,
            settings,
            artifacts: BTreeMap::new(),
        }
    }

    /// Attach the per-artifact configuration table
    #[must_use]
    pub fn with_artifacts(mut self, artifacts: BTreeMap<String, Value>) -> Self {
        self.artifacts = artifacts;
        self
    }

    pub fn manifest(&self) -> &ModuleManifest {
        &self.manifest
    }

    pub fn settings(&self) -> RuntimeSettings {
        self.settings
    }

    /// Configuration table entry for `artifact`
    pub fn artifact_config(&self, artifact: &str) -> Option<&Value> {
        self.artifacts.get(artifact)
    }

    /// The whole configuration table as one JSON object
    pub fn artifacts_value(&self) -> Value {
        Value::Object(
            self.artifacts
                .iter()
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect(),
        )
    }
}

/// Capabilities available to an artifact
#[derive(Clone, Debug)]
pub struct DomainInterface {
    pub api_registry: Arc<ApiRegistry>,
    pub ioc_container: Arc<IocContainer>,
    pub event_emitter: EventEmitter,
    pub models: ModelCatalog,
    pub templates: TemplateStore,
    pub serializer: TypeRegistry,
    pub runtime: Arc<RuntimeContext>,
}

impl DomainInterface {
    /// Server-level interface
    pub fn root(
        server_name: &str,
        runtime: Arc<RuntimeContext>,
        event_capacity: usize,
    ) -> Self {
        let ioc_container = IocContainer::root(server_name, runtime.settings().diagnostics);
        Self {
            api_registry: ApiRegistry::root(server_name),
            models: ModelCatalog::new(Arc::clone(&ioc_container)),
            ioc_container,
            event_emitter: EventEmitter::with_capacity(event_capacity),
            templates: TemplateStore::empty(),
            serializer: TypeRegistry::new(),
            runtime,
        }
    }

    /// Interface of a domain at `location`
    #[must_use]
    pub fn for_domain(&self, name: &str, location: &Path) -> Self {
        let ioc_container = self.ioc_container.child(name);
        Self {
            api_registry: self.api_registry.child(name),
            models: ModelCatalog::new(Arc::clone(&ioc_container)),
            ioc_container,
            event_emitter: self.event_emitter.clone(),
            templates: TemplateStore::for_domain(location),
            serializer: TypeRegistry::new(),
            runtime: Arc::clone(&self.runtime),
        }
    }

    /// Interface of a bounded context
    #[must_use]
    pub fn for_bounded_context(&self, name: &str) -> Self {
        Self {
            api_registry: self.api_registry.child(name),
            ..self.clone()
        }
    }

    /// True when lifecycle diagnostics are enabled
    pub fn diagnostics(&self) -> bool {
        self.runtime.settings().diagnostics
    }

    /// Module manifest used by discovery
    pub fn manifest(&self) -> &ModuleManifest {
        self.runtime.manifest()
    }
}
