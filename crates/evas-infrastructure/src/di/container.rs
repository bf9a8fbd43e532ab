//! Hierarchical IoC container
//!
//! Each scope (server, domain) owns one container. Names registered locally
//! are *owned*: the container destroys their instances on unregister and they
//! shadow the same name anywhere up the ancestor chain. Names found through an
//! ancestor are *borrowed*: the answer (including "not found") is cached
//! locally and never destroyed by this container.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::DashMap;
use evas_domain::ArtifactCategory;
use evas_domain::error::{AggregateError, Error, Result};
use futures::future::join_all;
use serde_json::Value;
use tracing::{debug, warn};

use super::repository::{Repository, RepositoryFactory};

/// Named repository factories of one scope
pub struct IocContainer {
    domain_name: String,
    parent: Option<Arc<IocContainer>>,
    owned: DashMap<String, Arc<dyn RepositoryFactory>>,
    // `None` caches a definitive miss in the ancestor chain
    borrowed: DashMap<String, Option<Arc<dyn RepositoryFactory>>>,
    diagnostics: bool,
    parent_lookups: AtomicUsize,
}

impl IocContainer {
    /// Root container of a server
    pub fn root<S: AsRef<str>>(domain_name: S, diagnostics: bool) -> Arc<Self> {
        Arc::new(Self::with_parent(domain_name.as_ref(), None, diagnostics))
    }

    /// Child container of a nested scope
    pub fn child<S: AsRef<str>>(self: &Arc<Self>, domain_name: S) -> Arc<Self> {
        Arc::new(Self::with_parent(
            domain_name.as_ref(),
            Some(Arc::clone(self)),
            self.diagnostics,
        ))
    }

    fn with_parent(
        domain_name: &str,
        parent: Option<Arc<IocContainer>>,
        diagnostics: bool,
    ) -> Self {
        let container = Self {
            domain_name: domain_name.to_uppercase(),
            parent,
            owned: DashMap::new(),
            borrowed: DashMap::new(),
            diagnostics,
            parent_lookups: AtomicUsize::new(0),
        };
        if diagnostics {
            debug!(domain_path = %container.domain_path(), "IoC container created");
        }
        container
    }

    /// Upper-cased name of the owning scope
    pub fn domain_name(&self) -> &str {
        &self.domain_name
    }

    /// Parent container, `None` at the root
    pub fn parent(&self) -> Option<&Arc<IocContainer>> {
        self.parent.as_ref()
    }

    /// `SERVER::DOMAIN::CONTEXT` path through the ancestor chain
    pub fn domain_path(&self) -> String {
        match &self.parent {
            Some(parent) => format!("{}::{}", parent.domain_path(), self.domain_name),
            None => self.domain_name.clone(),
        }
    }

    /// Register an owned factory under `name`
    ///
    /// The last registration wins; a displaced factory is returned to the
    /// caller, which becomes responsible for destroying its instances.
    pub fn register<S: Into<String>>(
        &self,
        name: S,
        factory: Arc<dyn RepositoryFactory>,
    ) -> Option<Arc<dyn RepositoryFactory>> {
        let name = name.into();
        let displaced = self.owned.insert(name.clone(), factory);
        if displaced.is_some() {
            warn!(
                domain_path = %self.domain_path(),
                repository = %name,
                "repository factory replaced"
            );
        } else if self.diagnostics {
            debug!(domain_path = %self.domain_path(), repository = %name, "repository registered");
        }
        displaced
    }

    /// Remove `name` from this container
    ///
    /// Owned factories have their instances destroyed first; borrowed entries
    /// (including cached misses) are simply forgotten. Returns `false` when the
    /// name was unknown.
    pub async fn unregister(&self, name: &str) -> Result<bool> {
        let owned = self.owned.get(name).map(|entry| Arc::clone(entry.value()));
        let Some(factory) = owned else {
            return Ok(self.borrowed.remove(name).is_some());
        };

        let destroyed = factory.destroy_instances(None).await;
        self.owned.remove(name);
        self.borrowed.remove(name);
        if self.diagnostics {
            debug!(
                domain_path = %self.domain_path(),
                repository = %name,
                "repository unregistered"
            );
        }
        destroyed.map(|()| true)
    }

    /// Destroy every owned factory concurrently and clear both maps
    pub async fn unregister_all(&self) -> Result<()> {
        let domain_path = self.domain_path();
        let factories: Vec<(String, Arc<dyn RepositoryFactory>)> = self
            .owned
            .iter()
            .map(|entry| (entry.key().clone(), Arc::clone(entry.value())))
            .collect();

        let results = join_all(factories.iter().map(|(name, factory)| {
            let domain_path = domain_path.clone();
            async move {
                factory
                    .destroy_instances(None)
                    .await
                    .map_err(|source| Error::ArtifactUnload {
                        scope: domain_path,
                        category: ArtifactCategory::Repository,
                        artifact: name.clone(),
                        source: Box::new(source),
                    })
            }
        }))
        .await;

        self.owned.clear();
        self.borrowed.clear();

        let causes: Vec<Error> = results.into_iter().filter_map(Result::err).collect();
        AggregateError::check(format!("Errors unregistering repositories in {domain_path}"), causes)
    }

    /// Find the factory for `name` here or in an ancestor, without creating
    /// anything
    pub fn borrow(&self, name: &str) -> Option<Arc<dyn RepositoryFactory>> {
        if let Some(factory) = self.owned.get(name) {
            return Some(Arc::clone(factory.value()));
        }
        self.borrow_from_parent(name)
    }

    fn borrow_from_parent(&self, name: &str) -> Option<Arc<dyn RepositoryFactory>> {
        if let Some(cached) = self.borrowed.get(name) {
            return cached.value().clone();
        }
        let parent = self.parent.as_ref()?;

        let entry = self.borrowed.entry(name.to_string()).or_insert_with(|| {
            self.parent_lookups.fetch_add(1, Ordering::Relaxed);
            parent.borrow(name)
        });
        entry.value().clone()
    }

    /// Resolve `name` and return the instance for `configuration`
    pub async fn resolve(
        self: &Arc<Self>,
        name: &str,
        configuration: &Value,
    ) -> Result<Arc<dyn Repository>> {
        let Some(factory) = self.borrow(name) else {
            return Err(Error::ResolutionNotFound {
                path: self.domain_path(),
                name: name.to_string(),
            });
        };

        factory
            .create_instances(configuration, self)
            .await
            .map_err(|source| Error::Instantiation {
                path: self.domain_path(),
                name: name.to_string(),
                source: Box::new(source),
            })
    }

    /// Resolve `name` and downcast the instance to `T`
    pub async fn resolve_as<T: Repository>(
        self: &Arc<Self>,
        name: &str,
        configuration: &Value,
    ) -> Result<Arc<T>> {
        let repository = self.resolve(name, configuration).await?;
        repository.downcast_arc::<T>().map_err(|_| Error::Instantiation {
            path: self.domain_path(),
            name: name.to_string(),
            source: Box::new(Error::internal(format!(
                "repository is not a {}",
                std::any::type_name::<T>()
            ))),
        })
    }

    /// Names registered as owned, sorted
    pub fn owned_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.owned.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// True when `name` is owned by this container
    pub fn owns(&self, name: &str) -> bool {
        self.owned.contains_key(name)
    }

    /// Number of cached borrow answers, misses included
    pub fn borrowed_len(&self) -> usize {
        self.borrowed.len()
    }

    /// Times this container asked its parent for a name
    pub fn parent_lookups(&self) -> usize {
        self.parent_lookups.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for IocContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IocContainer")
            .field("domain_path", &self.domain_path())
            .field("owned", &self.owned.len())
            .field("borrowed", &self.borrowed.len())
            .finish()
    }
}
