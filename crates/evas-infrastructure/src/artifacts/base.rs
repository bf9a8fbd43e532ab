//! Shared artifact state
//!
//! [`ArtifactCore`] holds what every artifact has: name, category, lifecycle
//! state, origin location and the parent interface. Concrete artifacts call
//! [`ArtifactCore::load_base`] first thing in `load` and
//! [`ArtifactCore::unload_base`] last thing in `unload`.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use evas_domain::error::{Error, Result};
use evas_domain::{ArtifactCategory, LifecycleState};
use tracing::debug;

use crate::interface::DomainInterface;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// `Constructed → Loaded → Unloaded` state machine
#[derive(Debug, Default)]
pub struct StateCell(Mutex<LifecycleState>);

impl StateCell {
    pub fn get(&self) -> LifecycleState {
        *lock(&self.0)
    }

    /// Move `Constructed → Loaded`
    pub fn begin_load(&self, artifact: &str) -> Result<()> {
        self.transition(artifact, "load", LifecycleState::Constructed, LifecycleState::Loaded)
    }

    /// Move `Loaded → Unloaded`
    pub fn begin_unload(&self, artifact: &str) -> Result<()> {
        self.transition(artifact, "unload", LifecycleState::Loaded, LifecycleState::Unloaded)
    }

    fn transition(
        &self,
        artifact: &str,
        operation: &'static str,
        from: LifecycleState,
        to: LifecycleState,
    ) -> Result<()> {
        let mut state = lock(&self.0);
        if *state != from {
            return Err(Error::Lifecycle {
                artifact: artifact.to_string(),
                operation,
                state: *state,
            });
        }
        *state = to;
        Ok(())
    }
}

/// Base state composed into every artifact
#[derive(Debug)]
pub struct ArtifactCore {
    name: String,
    category: ArtifactCategory,
    state: StateCell,
    location: Mutex<Option<PathBuf>>,
    parent: Mutex<Option<DomainInterface>>,
    diagnostics: bool,
}

impl ArtifactCore {
    pub fn new<S: Into<String>>(
        name: S,
        category: ArtifactCategory,
        location: &Path,
        parent: DomainInterface,
    ) -> Self {
        let name = name.into();
        let diagnostics = parent.diagnostics();
        if diagnostics {
            debug!(
                artifact = %name,
                category = %category,
                location = %location.display(),
                "constructed"
            );
        }
        Self {
            name,
            category,
            state: StateCell::default(),
            location: Mutex::new(Some(location.to_path_buf())),
            parent: Mutex::new(Some(parent)),
            diagnostics,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> ArtifactCategory {
        self.category
    }

    pub fn state(&self) -> LifecycleState {
        self.state.get()
    }

    /// Origin location; `None` once unloaded
    pub fn location(&self) -> Option<PathBuf> {
        lock(&self.location).clone()
    }

    /// Interface received from the parent scope; `None` once unloaded
    pub fn parent_interface(&self) -> Option<DomainInterface> {
        lock(&self.parent).clone()
    }

    /// Parent interface, or a lifecycle error once it has been released
    pub fn require_parent(&self, operation: &'static str) -> Result<DomainInterface> {
        self.parent_interface().ok_or_else(|| Error::Lifecycle {
            artifact: self.name.clone(),
            operation,
            state: self.state(),
        })
    }

    pub fn diagnostics(&self) -> bool {
        self.diagnostics
    }

    /// First step of every `load`
    pub fn load_base(&self) -> Result<()> {
        self.state.begin_load(&self.name)?;
        if self.diagnostics {
            debug!(artifact = %self.name, category = %self.category, "load");
        }
        Ok(())
    }

    /// Last step of every `unload`; releases the location and parent interface
    pub fn unload_base(&self) -> Result<()> {
        self.state.begin_unload(&self.name)?;
        *lock(&self.location) = None;
        *lock(&self.parent) = None;
        if self.diagnostics {
            debug!(artifact = %self.name, category = %self.category, "unload");
        }
        Ok(())
    }

    /// Fail unless the artifact is currently loaded
    pub fn ensure_loaded(&self, operation: &'static str) -> Result<()> {
        match self.state() {
            LifecycleState::Loaded => Ok(()),
            state => Err(Error::Lifecycle {
                artifact: self.name.clone(),
                operation,
                state,
            }),
        }
    }
}
