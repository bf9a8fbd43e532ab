//! Named API handlers with parent chaining
//!
//! Middlewares and surfaces register handlers in their bounded context's
//! registry. Executing a name not registered locally falls back to the parent
//! registry, up to the server root.

use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;
use evas_domain::error::{Error, Result};
use futures::future::BoxFuture;
use serde_json::Value;
use tracing::debug;

/// Async API handler taking and returning JSON
pub type ApiHandler = Arc<dyn Fn(Value) -> BoxFuture<'static, Result<Value>> + Send + Sync>;

/// Handler registry of one scope
pub struct ApiRegistry {
    scope: String,
    parent: Option<Arc<ApiRegistry>>,
    handlers: DashMap<String, ApiHandler>,
}

impl ApiRegistry {
    /// Root registry
    pub fn root<S: Into<String>>(scope: S) -> Arc<Self> {
        Arc::new(Self {
            scope: scope.into(),
            parent: None,
            handlers: DashMap::new(),
        })
    }

    /// Registry chained to `self`
    pub fn child<S: Into<String>>(self: &Arc<Self>, scope: S) -> Arc<Self> {
        Arc::new(Self {
            scope: scope.into(),
            parent: Some(Arc::clone(self)),
            handlers: DashMap::new(),
        })
    }

    /// Scope name this registry belongs to
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Parent registry, `None` at the root
    pub fn parent(&self) -> Option<&Arc<ApiRegistry>> {
        self.parent.as_ref()
    }

    /// Register `handler` under `name`; names are unique per registry
    pub fn register<S: Into<String>>(&self, name: S, handler: ApiHandler) -> Result<()> {
        let name = name.into();
        match self.handlers.entry(name.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                Err(Error::api(name, "already registered"))
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(handler);
                debug!(scope = %self.scope, api = %name, "api registered");
                Ok(())
            }
        }
    }

    /// Register an async closure under `name`
    pub fn register_fn<S, F, Fut>(&self, name: S, handler: F) -> Result<()>
    where
        S: Into<String>,
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        let handler: ApiHandler = Arc::new(move |args| Box::pin(handler(args)));
        self.register(name, handler)
    }

    /// Remove `name`; returns `false` when it was not registered here
    pub fn unregister(&self, name: &str) -> bool {
        let removed = self.handlers.remove(name).is_some();
        if removed {
            debug!(scope = %self.scope, api = %name, "api unregistered");
        }
        removed
    }

    /// Handler for `name`, searching ancestors when absent locally
    pub fn lookup(&self, name: &str) -> Option<ApiHandler> {
        if let Some(handler) = self.handlers.get(name) {
            return Some(Arc::clone(handler.value()));
        }
        self.parent.as_ref().and_then(|parent| parent.lookup(name))
    }

    /// Run the handler for `name` with `args`
    pub async fn execute(&self, name: &str, args: Value) -> Result<Value> {
        let handler = self
            .lookup(name)
            .ok_or_else(|| Error::api(name, format!("not registered in {}", self.scope)))?;
        handler(args).await
    }

    /// True when `name` is registered in this registry (ancestors excluded)
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Number of handlers registered locally
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// True when no handler is registered locally
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for ApiRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiRegistry")
            .field("scope", &self.scope)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}
