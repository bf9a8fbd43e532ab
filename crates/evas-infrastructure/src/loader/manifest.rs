//! Module manifest
//!
//! Maps module ids to the factory each module exports. A module id is the
//! artifact location relative to the manifest root, `/`-separated, with the
//! file extension of flat-file artifacts stripped:
//!
//! ```text
//! <root>/domains/tenant                          -> domains/tenant
//! <root>/domains/tenant/bounded_contexts/users   -> domains/tenant/bounded_contexts/users
//! <root>/.../users/middlewares/audit.toml        -> .../users/middlewares/audit
//! ```
//!
//! Entries come from explicit [`ModuleManifest::register`] calls or from
//! [`ARTIFACT_MODULES`] slice entries submitted at compile time.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use evas_domain::error::{Error, Result};
use evas_domain::{ArtifactCategory, DiscoveryMode};
use tracing::warn;

use crate::artifacts::ArtifactFactory;
use crate::di::RepositoryFactory;

/// The factory a module exports
#[derive(Clone)]
pub enum ModuleExport {
    /// Domain, bounded context, middleware, surface or event handler factory
    Artifact(Arc<dyn ArtifactFactory>),
    /// Repository factory, registered with an IoC container
    Repository(Arc<dyn RepositoryFactory>),
}

impl ModuleExport {
    /// Category of the exported factory
    pub fn category(&self) -> ArtifactCategory {
        match self {
            Self::Artifact(factory) => factory.category(),
            Self::Repository(_) => ArtifactCategory::Repository,
        }
    }

    /// Artifact or repository name of the exported factory
    pub fn name(&self) -> &str {
        match self {
            Self::Artifact(factory) => factory.artifact_name(),
            Self::Repository(factory) => factory.repository_name(),
        }
    }
}

impl std::fmt::Debug for ModuleExport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleExport")
            .field("category", &self.category())
            .field("name", &self.name())
            .finish()
    }
}

/// Compile-time module registration entry
pub struct ModuleEntry {
    /// Module id relative to the server root
    pub path: &'static str,
    /// Builds the module's export
    pub export: fn() -> ModuleExport,
}

/// Modules submitted by linked crates
#[linkme::distributed_slice]
pub static ARTIFACT_MODULES: [ModuleEntry] = [..];

/// Startup-time mapping from module id to export
#[derive(Debug, Clone)]
pub struct ModuleManifest {
    root: PathBuf,
    modules: HashMap<String, ModuleExport>,
}

impl ModuleManifest {
    /// Empty manifest rooted at `root`
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            modules: HashMap::new(),
        }
    }

    /// Manifest pre-populated with every [`ARTIFACT_MODULES`] entry
    pub fn from_registered<P: Into<PathBuf>>(root: P) -> Self {
        let mut manifest = Self::new(root);
        for entry in ARTIFACT_MODULES {
            manifest.register(entry.path, (entry.export)());
        }
        manifest
    }

    /// Register `export` under `module_id`; a later registration replaces an
    /// earlier one
    pub fn register<S: Into<String>>(&mut self, module_id: S, export: ModuleExport) -> &mut Self {
        let module_id = module_id.into();
        if self.modules.insert(module_id.clone(), export).is_some() {
            warn!(module = %module_id, "module export replaced");
        }
        self
    }

    /// Builder form of [`ModuleManifest::register`]
    #[must_use]
    pub fn with_module<S: Into<String>>(mut self, module_id: S, export: ModuleExport) -> Self {
        self.register(module_id, export);
        self
    }

    /// Root every module id is relative to
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of registered modules
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// True when no module is registered
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Registered module ids, sorted
    pub fn module_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.modules.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Module id of the artifact at `location`
    pub fn module_id(&self, location: &Path, mode: DiscoveryMode) -> Result<String> {
        let relative = location.strip_prefix(&self.root).map_err(|_| {
            Error::discovery(
                location,
                format!("location is outside the module root {}", self.root.display()),
            )
        })?;
        let relative = match mode {
            DiscoveryMode::FlatFiles => relative.with_extension(""),
            DiscoveryMode::Subdirectories => relative.to_path_buf(),
        };

        let parts: Vec<String> = relative
            .components()
            .filter_map(|component| match component {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        Ok(parts.join("/"))
    }

    /// Look up the module at `location` and require an export of `category`
    pub fn import(
        &self,
        location: &Path,
        mode: DiscoveryMode,
        category: ArtifactCategory,
    ) -> Result<ModuleExport> {
        let module_id = self.module_id(location, mode)?;
        let export = self.modules.get(&module_id).ok_or_else(|| {
            Error::discovery(location, format!("no module registered as '{module_id}'"))
        })?;

        if export.category() != category {
            return Err(Error::discovery(
                location,
                format!(
                    "module '{module_id}' exports a {} factory, expected a {category} factory",
                    export.category()
                ),
            ));
        }
        Ok(export.clone())
    }
}
