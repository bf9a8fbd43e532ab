//! Domain artifact
//!
//! A domain scopes its own API registry, IoC container, models, templates and
//! resource types, then runs a domain lifecycle manager over its
//! repositories, sub-domains and bounded contexts.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use evas_domain::error::{AggregateError, Result};
use evas_domain::{Artifact, ArtifactCategory, Lifecycle, LifecycleState};

use super::base::ArtifactCore;
use super::factory::{ArtifactKind, Factory};
use super::scope::{ScopeCell, ScopeSlot};
use crate::interface::{DomainInterface, TypeRegistry};
use crate::lifecycle::{LifecycleManager, ScopeKind};

/// User code plugged into a domain
#[async_trait]
pub trait DomainBehavior: Send + Sync {
    /// Register the domain's resource types
    fn register_serializer_types(&self, _serializer: &TypeRegistry) -> Result<()> {
        Ok(())
    }

    /// Runs after the domain's children are loaded
    async fn on_load(&self, _interface: &DomainInterface) -> Result<()> {
        Ok(())
    }

    /// Runs before the domain's children are unloaded
    async fn on_unload(&self, _interface: &DomainInterface) -> Result<()> {
        Ok(())
    }
}

/// Behaviour with no hooks
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultDomain;

impl DomainBehavior for DefaultDomain {}

/// A loaded domain
pub struct Domain {
    core: ArtifactCore,
    behavior: Box<dyn DomainBehavior>,
    scope: ScopeCell,
}

impl Domain {
    /// Interface this domain hands to its children; `None` unless loaded
    pub fn interface(&self) -> Option<DomainInterface> {
        self.scope.interface()
    }

    /// Child manager; `None` unless loaded
    pub fn manager(&self) -> Option<Arc<LifecycleManager>> {
        self.scope.manager()
    }

    async fn load_scope(&self) -> Result<()> {
        let parent = self.core.require_parent("load")?;
        let location = self.core.location().unwrap_or_default();
        let interface = parent.for_domain(self.core.name(), &location);
        self.behavior
            .register_serializer_types(&interface.serializer)?;

        let scope_path = interface.ioc_container.domain_path();
        let slot = ScopeSlot::new(ScopeKind::Domain, scope_path, location, interface.clone());
        let manager = slot.manager();
        self.scope.store(slot);
        manager.load().await?;

        self.behavior.on_load(&interface).await
    }
}

#[async_trait]
impl Lifecycle for Domain {
    async fn load(&self) -> Result<()> {
        self.core.load_base()?;
        if let Err(error) = self.load_scope().await {
            return Err(self.scope.abandon(&self.core, error).await);
        }
        Ok(())
    }

    async fn unload(&self) -> Result<()> {
        self.core.ensure_loaded("unload")?;

        let mut causes = Vec::new();
        if let Some(slot) = self.scope.take() {
            if let Err(error) = self.behavior.on_unload(slot.interface()).await {
                causes.push(error);
            }
            if let Err(error) = slot.release().await {
                causes.push(error);
            }
        }
        if let Err(error) = self.core.unload_base() {
            causes.push(error);
        }

        AggregateError::check(format!("Errors unloading domain {}", self.core.name()), causes)
    }
}

impl Artifact for Domain {
    fn name(&self) -> &str {
        self.core.name()
    }

    fn category(&self) -> ArtifactCategory {
        self.core.category()
    }

    fn state(&self) -> LifecycleState {
        self.core.state()
    }

    fn location(&self) -> Option<PathBuf> {
        self.core.location()
    }
}

/// [`ArtifactKind`] of domains
pub struct DomainKind;

impl ArtifactKind for DomainKind {
    const CATEGORY: ArtifactCategory = ArtifactCategory::Domain;
    type Behavior = dyn DomainBehavior;
    type Instance = Domain;

    fn build(
        name: &str,
        location: &Path,
        interface: &DomainInterface,
        behavior: Box<dyn DomainBehavior>,
    ) -> Domain {
        Domain {
            core: ArtifactCore::new(name, Self::CATEGORY, location, interface.clone()),
            behavior,
            scope: ScopeCell::default(),
        }
    }
}

/// Factory of one domain module
pub type DomainFactory = Factory<DomainKind>;
