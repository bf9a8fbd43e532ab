//! Per-scope lifecycle manager
//!
//! Loads a scope's children category by category: discovery, then every
//! artifact of the category concurrently, then the next category. Failures
//! never stop the walk; they are collected and returned as one aggregate
//! error once every category has been attempted. Artifacts that loaded stay
//! registered.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use evas_domain::error::{AggregateError, Error, Result};
use evas_domain::{Artifact, ArtifactCategory, Lifecycle, LifecycleState};
use futures::future::join_all;
use tracing::{debug, info};

use super::plan::{CategoryPlan, ScopeKind};
use crate::artifacts::{ArtifactFactory, StateCell};
use crate::interface::DomainInterface;
use crate::loader::{DiscoveredArtifact, ModuleExport, discover};

enum ManagedChild {
    Artifact {
        factory: Arc<dyn ArtifactFactory>,
        instance: Arc<dyn Artifact>,
        location: PathBuf,
    },
    Repository,
}

/// Owner of one scope's children
pub struct LifecycleManager {
    kind: ScopeKind,
    scope: String,
    location: PathBuf,
    interface: DomainInterface,
    state: StateCell,
    // One map per plan entry, keyed by artifact name
    children: Vec<DashMap<String, ManagedChild>>,
}

impl LifecycleManager {
    pub fn new(
        kind: ScopeKind,
        scope: String,
        location: PathBuf,
        interface: DomainInterface,
    ) -> Self {
        if interface.diagnostics() {
            debug!(
                scope = %scope,
                kind = %kind,
                location = %location.display(),
                "lifecycle manager created"
            );
        }
        Self {
            children: kind.plan().iter().map(|_| DashMap::new()).collect(),
            kind,
            scope,
            location,
            interface,
            state: StateCell::default(),
        }
    }

    pub fn kind(&self) -> ScopeKind {
        self.kind
    }

    /// Domain path of the scope, used in error messages
    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    pub fn state(&self) -> LifecycleState {
        self.state.get()
    }

    /// Names of registered children of `category`, sorted
    pub fn artifact_names(&self, category: ArtifactCategory) -> Vec<String> {
        let mut names: Vec<String> = self
            .maps_of(category)
            .flat_map(|map| map.iter().map(|e| e.key().clone()).collect::<Vec<_>>())
            .collect();
        names.sort();
        names
    }

    /// Registered child `name` of `category`; repositories are served by the
    /// IoC container instead
    pub fn artifact(&self, category: ArtifactCategory, name: &str) -> Option<Arc<dyn Artifact>> {
        self.maps_of(category).find_map(|map| match map.get(name)?.value() {
            ManagedChild::Artifact { instance, .. } => Some(Arc::clone(instance)),
            ManagedChild::Repository => None,
        })
    }

    /// Total number of registered children
    pub fn len(&self) -> usize {
        self.children.iter().map(DashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn maps_of(
        &self,
        category: ArtifactCategory,
    ) -> impl Iterator<Item = &DashMap<String, ManagedChild>> {
        self.kind
            .plan()
            .iter()
            .zip(&self.children)
            .filter(move |(plan, _)| plan.category == category)
            .map(|(_, map)| map)
    }

    async fn load_category(&self, index: usize, plan: &CategoryPlan) -> Vec<Error> {
        let directory = self.location.join(plan.directory);
        let discovered =
            match discover(&directory, plan.mode, plan.category, self.interface.manifest()).await {
                Ok(discovered) => discovered,
                Err(Error::Aggregate(aggregate)) => return aggregate.into_causes(),
                Err(error) => return vec![error],
            };

        let mut causes = Vec::new();
        let accepted = reject_duplicates(plan.category, discovered, &mut causes);
        let map = &self.children[index];

        if plan.category == ArtifactCategory::Repository {
            for artifact in accepted {
                match artifact.export {
                    ModuleExport::Repository(factory) => {
                        let name = factory.repository_name().to_string();
                        // An earlier repository category already owns the name
                        if self.interface.ioc_container.owns(&name) {
                            causes.push(Error::DuplicateArtifact {
                                category: plan.category,
                                artifact: name,
                                location: artifact.location,
                            });
                            continue;
                        }
                        self.interface.ioc_container.register(name.clone(), factory);
                        map.insert(name, ManagedChild::Repository);
                    }
                    ModuleExport::Artifact(factory) => causes.push(unexpected_export(
                        &artifact.location,
                        factory.category(),
                        plan.category,
                    )),
                }
            }
            return causes;
        }

        let results = join_all(accepted.into_iter().map(|artifact| async move {
            let factory = match artifact.export {
                ModuleExport::Artifact(factory) => factory,
                ModuleExport::Repository(_) => {
                    return Err(unexpected_export(
                        &artifact.location,
                        ArtifactCategory::Repository,
                        plan.category,
                    ));
                }
            };
            let name = factory.artifact_name().to_string();
            match factory.create_instances(&artifact.location, &self.interface).await {
                Ok(instance) => {
                    map.insert(
                        name,
                        ManagedChild::Artifact {
                            factory,
                            instance,
                            location: artifact.location,
                        },
                    );
                    Ok(())
                }
                Err(source) => Err(Error::ArtifactLoad {
                    scope: self.scope.clone(),
                    category: plan.category,
                    artifact: name,
                    source: Box::new(source),
                }),
            }
        }))
        .await;

        causes.extend(results.into_iter().filter_map(Result::err));
        causes
    }

    async fn unload_category(&self, index: usize, plan: &CategoryPlan) -> Vec<Error> {
        let map = &self.children[index];
        let names: Vec<String> = map.iter().map(|e| e.key().clone()).collect();
        let entries: Vec<(String, ManagedChild)> =
            names.iter().filter_map(|name| map.remove(name)).collect();

        let results = join_all(entries.into_iter().map(|(name, child)| async move {
            let outcome = match &child {
                ManagedChild::Artifact {
                    factory, location, ..
                } => factory.destroy_instances(Some(location.as_path())).await,
                ManagedChild::Repository => self
                    .interface
                    .ioc_container
                    .unregister(&name)
                    .await
                    .map(|_| ()),
            };
            outcome.map_err(|source| Error::ArtifactUnload {
                scope: self.scope.clone(),
                category: plan.category,
                artifact: name,
                source: Box::new(source),
            })
        }))
        .await;

        results.into_iter().filter_map(Result::err).collect()
    }
}

#[async_trait]
impl Lifecycle for LifecycleManager {
    async fn load(&self) -> Result<()> {
        self.state.begin_load(&self.scope)?;

        let mut causes = Vec::new();
        for (index, plan) in self.kind.plan().iter().enumerate() {
            causes.extend(self.load_category(index, plan).await);
        }

        if self.interface.diagnostics() {
            info!(
                scope = %self.scope,
                kind = %self.kind,
                children = self.len(),
                failures = causes.len(),
                "children loaded"
            );
        }
        AggregateError::check(
            format!("Errors loading {} children of {}", self.kind, self.scope),
            causes,
        )
    }

    async fn unload(&self) -> Result<()> {
        self.state.begin_unload(&self.scope)?;

        let mut causes = Vec::new();
        for (index, plan) in self.kind.plan().iter().enumerate().rev() {
            causes.extend(self.unload_category(index, plan).await);
        }

        if self.interface.diagnostics() {
            info!(
                scope = %self.scope,
                kind = %self.kind,
                failures = causes.len(),
                "children unloaded"
            );
        }
        AggregateError::check(
            format!("Errors unloading {} children of {}", self.kind, self.scope),
            causes,
        )
    }
}

impl std::fmt::Debug for LifecycleManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleManager")
            .field("kind", &self.kind)
            .field("scope", &self.scope)
            .field("children", &self.len())
            .finish()
    }
}

/// Keep the first artifact of every name, in location order
fn reject_duplicates(
    category: ArtifactCategory,
    discovered: Vec<DiscoveredArtifact>,
    causes: &mut Vec<Error>,
) -> Vec<DiscoveredArtifact> {
    let mut seen = HashSet::new();
    let mut accepted = Vec::with_capacity(discovered.len());
    for artifact in discovered {
        if seen.insert(artifact.export.name().to_string()) {
            accepted.push(artifact);
        } else {
            causes.push(Error::DuplicateArtifact {
                category,
                artifact: artifact.export.name().to_string(),
                location: artifact.location,
            });
        }
    }
    accepted
}

fn unexpected_export(
    location: &Path,
    found: ArtifactCategory,
    expected: ArtifactCategory,
) -> Error {
    Error::discovery(
        location,
        format!("module exports a {found} factory, expected a {expected} factory"),
    )
}
