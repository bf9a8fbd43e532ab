//! Bounded context artifact
//!
//! Scopes a child API registry and runs a bounded context lifecycle manager
//! over middlewares, command surfaces, query surfaces and event handlers.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use evas_domain::error::{AggregateError, Result};
use evas_domain::{Artifact, ArtifactCategory, Lifecycle, LifecycleState};

use super::base::ArtifactCore;
use super::factory::{ArtifactKind, Factory};
use super::scope::{ScopeCell, ScopeSlot};
use crate::interface::DomainInterface;
use crate::lifecycle::{LifecycleManager, ScopeKind};

/// User code plugged into a bounded context
#[async_trait]
pub trait BoundedContextBehavior: Send + Sync {
    async fn on_load(&self, _interface: &DomainInterface) -> Result<()> {
        Ok(())
    }

    async fn on_unload(&self, _interface: &DomainInterface) -> Result<()> {
        Ok(())
    }
}

/// Behaviour with no hooks
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultBoundedContext;

impl BoundedContextBehavior for DefaultBoundedContext {}

pub struct BoundedContext {
    core: ArtifactCore,
    behavior: Box<dyn BoundedContextBehavior>,
    scope: ScopeCell,
}

impl BoundedContext {
    pub fn interface(&self) -> Option<DomainInterface> {
        self.scope.interface()
    }

    pub fn manager(&self) -> Option<Arc<LifecycleManager>> {
        self.scope.manager()
    }

    async fn load_scope(&self) -> Result<()> {
        let parent = self.core.require_parent("load")?;
        let location = self.core.location().unwrap_or_default();
        let interface = parent.for_bounded_context(self.core.name());
        let scope_path = format!(
            "{}::{}",
            parent.ioc_container.domain_path(),
            self.core.name().to_uppercase()
        );

        let slot = ScopeSlot::new(
            ScopeKind::BoundedContext,
            scope_path,
            location,
            interface.clone(),
        );
        let manager = slot.manager();
        self.scope.store(slot);
        manager.load().await?;

        self.behavior.on_load(&interface).await
    }
}

#[async_trait]
impl Lifecycle for BoundedContext {
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

        AggregateError::check(
            format!("Errors unloading bounded context {}", self.core.name()),
            causes,
        )
    }
}

impl Artifact for BoundedContext {
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

pub struct BoundedContextKind;

impl ArtifactKind for BoundedContextKind {
    const CATEGORY: ArtifactCategory = ArtifactCategory::BoundedContext;
    type Behavior = dyn BoundedContextBehavior;
    type Instance = BoundedContext;

    fn build(
        name: &str,
        location: &Path,
        interface: &DomainInterface,
        behavior: Box<dyn BoundedContextBehavior>,
    ) -> BoundedContext {
        BoundedContext {
            core: ArtifactCore::new(name, Self::CATEGORY, location, interface.clone()),
            behavior,
            scope: ScopeCell::default(),
        }
    }
}

/// Factory of one bounded context module
pub type BoundedContextFactory = Factory<BoundedContextKind>;
