//! Application server artifact
//!
//! The server has no parent scope. `load` builds the root interface from the
//! configuration, runs the server lifecycle manager over `server.root` and
//! writes a startup record through the `Logger` repository when one is
//! registered. `unload` reverses every step. A failed `load` releases
//! whatever loaded before returning the error.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use evas_domain::error::{AggregateError, Error, Result};
use evas_domain::{Lifecycle, LifecycleState};
use evas_infrastructure::artifacts::{ScopeCell, ScopeSlot, StateCell};
use evas_infrastructure::config::AppConfig;
use evas_infrastructure::interface::{DomainInterface, RuntimeContext, RuntimeSettings};
use evas_infrastructure::lifecycle::{LifecycleManager, ScopeKind};
use evas_infrastructure::loader::ModuleManifest;
use evas_infrastructure::logging::log_lifecycle;
use evas_providers::constants::LOGGER_REPOSITORY;
use evas_providers::{LoggerRepository, configuration_for};
use tracing::{info, warn};

use crate::constants::{SHUTDOWN_MESSAGE, STARTUP_MESSAGE};

/// Root artifact of a server process
pub struct ApplicationServer {
    config: AppConfig,
    manifest: ModuleManifest,
    state: StateCell,
    scope: ScopeCell,
}

impl ApplicationServer {
    /// Unloaded server over `manifest`; module ids resolve against the
    /// manifest root, children are discovered under `config.server.root`
    pub fn new(config: AppConfig, manifest: ModuleManifest) -> Self {
        log_lifecycle(config.runtime.diagnostics, &config.server.name, "construct");
        Self {
            config,
            manifest,
            state: StateCell::default(),
            scope: ScopeCell::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    pub fn root(&self) -> &Path {
        &self.config.server.root
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn state(&self) -> LifecycleState {
        self.state.get()
    }

    /// Root interface; `None` unless loaded
    pub fn interface(&self) -> Option<DomainInterface> {
        self.scope.interface()
    }

    /// Server lifecycle manager; `None` unless loaded
    pub fn manager(&self) -> Option<Arc<LifecycleManager>> {
        self.scope.manager()
    }

    fn root_interface(&self) -> DomainInterface {
        let runtime = RuntimeContext::new(
            self.manifest.clone(),
            RuntimeSettings {
                diagnostics: self.config.runtime.diagnostics,
            },
        )
        .with_artifacts(self.config.artifacts.clone());
        DomainInterface::root(
            &self.config.server.name,
            Arc::new(runtime),
            self.config.runtime.event_capacity,
        )
    }

    /// Release a partially loaded tree; the server ends `Unloaded`
    async fn abandon(&self, error: Error) -> Error {
        let mut causes = vec![error];
        if let Some(slot) = self.scope.take() {
            if let Err(cause) = slot.release().await {
                causes.push(cause);
            }
        }
        if let Err(cause) = self.state.begin_unload(self.name()) {
            causes.push(cause);
        }
        if causes.len() == 1 {
            return causes.swap_remove(0);
        }
        Error::aggregate(format!("Errors loading server {}", self.name()), causes)
    }

    /// Write `message` through the registered Logger; a missing or broken
    /// Logger never fails the server
    async fn announce(&self, interface: &DomainInterface, message: &str) {
        if !interface.ioc_container.owns(LOGGER_REPOSITORY) {
            return;
        }
        let logger = match configuration_for(interface, LOGGER_REPOSITORY).await {
            Ok(configuration) => {
                interface
                    .ioc_container
                    .resolve_as::<LoggerRepository>(LOGGER_REPOSITORY, &configuration)
                    .await
            }
            Err(error) => Err(error),
        };
        match logger {
            Ok(logger) => {
                logger.info(&format!("{message}: {}", self.name()));
            }
            Err(error) => warn!(server = %self.name(), error = %error, "Logger unavailable"),
        }
    }
}

#[async_trait]
impl Lifecycle for ApplicationServer {
    async fn load(&self) -> Result<()> {
        self.state.begin_load(self.name())?;
        log_lifecycle(self.config.runtime.diagnostics, self.name(), "load");

        let interface = self.root_interface();
        let scope_path = interface.ioc_container.domain_path();
        let slot = ScopeSlot::new(
            ScopeKind::Server,
            scope_path,
            PathBuf::from(self.root()),
            interface.clone(),
        );
        let manager = slot.manager();
        self.scope.store(slot);
        if let Err(error) = manager.load().await {
            return Err(self.abandon(error).await);
        }

        self.announce(&interface, STARTUP_MESSAGE).await;
        info!(
            server = %self.name(),
            root = %self.root().display(),
            "application server loaded"
        );
        Ok(())
    }

    async fn unload(&self) -> Result<()> {
        let mut causes = Vec::new();
        if let Some(slot) = self.scope.take() {
            self.announce(slot.interface(), SHUTDOWN_MESSAGE).await;
            if let Err(error) = slot.release().await {
                causes.push(error);
            }
        }
        if let Err(error) = self.state.begin_unload(self.name()) {
            causes.push(error);
        }
        log_lifecycle(self.config.runtime.diagnostics, self.name(), "unload");

        AggregateError::check(format!("Errors unloading server {}", self.name()), causes)
    }
}

impl std::fmt::Debug for ApplicationServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApplicationServer")
            .field("name", &self.config.server.name)
            .field("root", &self.config.server.root)
            .field("state", &self.state.get())
            .field("modules", &self.manifest.len())
            .finish()
    }
}
