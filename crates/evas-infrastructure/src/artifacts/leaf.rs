//! Middleware, surface and event handler artifacts
//!
//! Leaf artifacts have no children. Middlewares and surfaces register API
//! handlers in their bounded context's registry; event handlers subscribe to
//! the event emitter and have their subscription tasks aborted on unload.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use evas_domain::error::{AggregateError, Result};
use evas_domain::{Artifact, ArtifactCategory, Lifecycle, LifecycleState};
use tokio::task::JoinHandle;

use super::base::ArtifactCore;
use super::factory::{ArtifactKind, Factory};
use crate::interface::DomainInterface;

/// Business logic registering APIs
#[async_trait]
pub trait MiddlewareBehavior: Send + Sync {
    async fn register_api(&self, interface: &DomainInterface) -> Result<()>;

    async fn unregister_api(&self, interface: &DomainInterface) -> Result<()>;
}

/// Command or query entry point registering APIs
#[async_trait]
pub trait SurfaceBehavior: Send + Sync {
    async fn register_api(&self, interface: &DomainInterface) -> Result<()>;

    async fn unregister_api(&self, interface: &DomainInterface) -> Result<()>;
}

/// Event subscriber
#[async_trait]
pub trait EventHandlerBehavior: Send + Sync {
    /// Subscribe and return the spawned subscription tasks
    async fn register_handlers(&self, interface: &DomainInterface) -> Result<Vec<JoinHandle<()>>>;

    async fn unregister_handlers(&self, _interface: &DomainInterface) -> Result<()> {
        Ok(())
    }
}

enum LeafBehavior {
    Middleware(Box<dyn MiddlewareBehavior>),
    Surface(Box<dyn SurfaceBehavior>),
    EventHandler(Box<dyn EventHandlerBehavior>),
}

impl LeafBehavior {
    async fn attach(&self, interface: &DomainInterface) -> Result<Vec<JoinHandle<()>>> {
        match self {
            Self::Middleware(behavior) => {
                behavior.register_api(interface).await.map(|()| Vec::new())
            }
            Self::Surface(behavior) => behavior.register_api(interface).await.map(|()| Vec::new()),
            Self::EventHandler(behavior) => behavior.register_handlers(interface).await,
        }
    }

    async fn detach(&self, interface: &DomainInterface) -> Result<()> {
        match self {
            Self::Middleware(behavior) => behavior.unregister_api(interface).await,
            Self::Surface(behavior) => behavior.unregister_api(interface).await,
            Self::EventHandler(behavior) => behavior.unregister_handlers(interface).await,
        }
    }
}

/// A loaded middleware, surface or event handler
pub struct LeafArtifact {
    core: ArtifactCore,
    behavior: LeafBehavior,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl LeafArtifact {
    fn new(
        name: &str,
        category: ArtifactCategory,
        location: &Path,
        interface: &DomainInterface,
        behavior: LeafBehavior,
    ) -> Self {
        Self {
            core: ArtifactCore::new(name, category, location, interface.clone()),
            behavior,
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Number of live subscription tasks
    pub fn task_count(&self) -> usize {
        self.tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|task| !task.is_finished())
            .count()
    }
}

#[async_trait]
impl Lifecycle for LeafArtifact {
    async fn load(&self) -> Result<()> {
        self.core.load_base()?;
        let interface = self.core.require_parent("load")?;
        let tasks = self.behavior.attach(&interface).await?;
        self.tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(tasks);
        Ok(())
    }

    async fn unload(&self) -> Result<()> {
        self.core.ensure_loaded("unload")?;

        let tasks = std::mem::take(&mut *self.tasks.lock().unwrap_or_else(PoisonError::into_inner));
        for task in tasks {
            task.abort();
        }

        let mut causes = Vec::new();
        if let Some(interface) = self.core.parent_interface() {
            if let Err(error) = self.behavior.detach(&interface).await {
                causes.push(error);
            }
        }
        if let Err(error) = self.core.unload_base() {
            causes.push(error);
        }
        AggregateError::check(
            format!("Errors unloading {} {}", self.core.category(), self.core.name()),
            causes,
        )
    }
}

impl Artifact for LeafArtifact {
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

pub struct MiddlewareKind;

impl ArtifactKind for MiddlewareKind {
    const CATEGORY: ArtifactCategory = ArtifactCategory::Middleware;
    type Behavior = dyn MiddlewareBehavior;
    type Instance = LeafArtifact;

    fn build(
        name: &str,
        location: &Path,
        interface: &DomainInterface,
        behavior: Box<dyn MiddlewareBehavior>,
    ) -> LeafArtifact {
        let behavior = LeafBehavior::Middleware(behavior);
        LeafArtifact::new(name, Self::CATEGORY, location, interface, behavior)
    }
}

pub struct SurfaceKind;

impl ArtifactKind for SurfaceKind {
    const CATEGORY: ArtifactCategory = ArtifactCategory::Surface;
    type Behavior = dyn SurfaceBehavior;
    type Instance = LeafArtifact;

    fn build(
        name: &str,
        location: &Path,
        interface: &DomainInterface,
        behavior: Box<dyn SurfaceBehavior>,
    ) -> LeafArtifact {
        let behavior = LeafBehavior::Surface(behavior);
        LeafArtifact::new(name, Self::CATEGORY, location, interface, behavior)
    }
}

pub struct EventHandlerKind;

impl ArtifactKind for EventHandlerKind {
    const CATEGORY: ArtifactCategory = ArtifactCategory::EventHandler;
    type Behavior = dyn EventHandlerBehavior;
    type Instance = LeafArtifact;

    fn build(
        name: &str,
        location: &Path,
        interface: &DomainInterface,
        behavior: Box<dyn EventHandlerBehavior>,
    ) -> LeafArtifact {
        let behavior = LeafBehavior::EventHandler(behavior);
        LeafArtifact::new(name, Self::CATEGORY, location, interface, behavior)
    }
}

pub type MiddlewareFactory = Factory<MiddlewareKind>;
pub type SurfaceFactory = Factory<SurfaceKind>;
pub type EventHandlerFactory = Factory<EventHandlerKind>;
