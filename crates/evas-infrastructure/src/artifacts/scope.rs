//! Scope layer shared by the server, domains and bounded contexts
//!
//! A loaded scope holds the interface it hands to its children and the
//! lifecycle manager that owns those children. A scope whose `load` fails
//! releases whatever loaded below it before reporting the failure; its
//! siblings in the parent manager are left alone.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use evas_domain::Lifecycle;
use evas_domain::error::{AggregateError, Error, Result};

use super::base::ArtifactCore;
use crate::interface::DomainInterface;
use crate::lifecycle::{LifecycleManager, ScopeKind};

/// Interface and manager of one loaded scope
#[derive(Debug)]
pub struct ScopeSlot {
    kind: ScopeKind,
    interface: DomainInterface,
    manager: Arc<LifecycleManager>,
}

impl ScopeSlot {
    /// Slot whose manager discovers children under `location`
    pub fn new(
        kind: ScopeKind,
        scope_path: String,
        location: PathBuf,
        interface: DomainInterface,
    ) -> Self {
        let manager = Arc::new(LifecycleManager::new(
            kind,
            scope_path,
            location,
            interface.clone(),
        ));
        Self {
            kind,
            interface,
            manager,
        }
    }

    pub fn interface(&self) -> &DomainInterface {
        &self.interface
    }

    pub fn manager(&self) -> Arc<LifecycleManager> {
        Arc::clone(&self.manager)
    }

    /// Unload the manager, then drop repositories owned by this scope's
    /// container
    ///
    /// Bounded contexts share their domain's container and leave it alone.
    pub async fn release(self) -> Result<()> {
        let mut causes = Vec::new();
        if let Err(error) = self.manager.unload().await {
            causes.push(error);
        }
        if self.kind != ScopeKind::BoundedContext {
            if let Err(error) = self.interface.ioc_container.unregister_all().await {
                causes.push(error);
            }
        }
        AggregateError::check(
            format!("Errors releasing {} scope {}", self.kind, self.manager.scope()),
            causes,
        )
    }
}

/// Holder for the slot of a scope artifact
#[derive(Debug, Default)]
pub struct ScopeCell(Mutex<Option<ScopeSlot>>);

impl ScopeCell {
    fn lock(&self) -> MutexGuard<'_, Option<ScopeSlot>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn store(&self, slot: ScopeSlot) {
        *self.lock() = Some(slot);
    }

    pub fn take(&self) -> Option<ScopeSlot> {
        self.lock().take()
    }

    pub fn interface(&self) -> Option<DomainInterface> {
        self.lock().as_ref().map(|slot| slot.interface.clone())
    }

    pub fn manager(&self) -> Option<Arc<LifecycleManager>> {
        self.lock().as_ref().map(ScopeSlot::manager)
    }

    /// Tear down a scope whose `load` failed after `load_base`
    ///
    /// A failed scope is never cached by its factory, so the children that
    /// did load have no other owner. They are released here and the artifact
    /// ends `Unloaded`. Release failures are appended after `error`.
    pub async fn abandon(&self, core: &ArtifactCore, error: Error) -> Error {
        let mut release_causes = Vec::new();
        if let Some(slot) = self.take() {
            if let Err(cause) = slot.release().await {
                release_causes.push(cause);
            }
        }
        if let Err(cause) = core.unload_base() {
            release_causes.push(cause);
        }

        if release_causes.is_empty() {
            return error;
        }
        let mut causes = vec![error];
        causes.extend(release_causes);
        Error::aggregate(
            format!("Errors loading {} {}", core.category(), core.name()),
            causes,
        )
    }
}
