//! Artifact tree fixtures

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use evas_infrastructure::interface::{DomainInterface, RuntimeContext, RuntimeSettings};
use evas_infrastructure::loader::ModuleManifest;
use tempfile::TempDir;

/// Temporary directory laid out like a server root
pub struct ArtifactTree {
    dir: TempDir,
}

impl ArtifactTree {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("create temp dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    /// Create an artifact directory holding an `index` entry module
    pub fn artifact_dir(&self, relative: &str) -> PathBuf {
        let dir = self.path(relative);
        fs::create_dir_all(&dir).expect("create artifact dir");
        fs::write(dir.join("index.toml"), "").expect("write entry module");
        dir
    }

    /// Create a directory without an entry module
    pub fn bare_dir(&self, relative: &str) -> PathBuf {
        let dir = self.path(relative);
        fs::create_dir_all(&dir).expect("create dir");
        dir
    }

    /// Create a file with `contents`, creating parents as needed
    pub fn file(&self, relative: &str, contents: &str) -> PathBuf {
        let file = self.path(relative);
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent).expect("create parent dir");
        }
        fs::write(&file, contents).expect("write file");
        file
    }
}

impl Default for ArtifactTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Server-level interface over `manifest` with diagnostics off
pub fn root_interface(manifest: ModuleManifest) -> DomainInterface {
    let runtime = RuntimeContext::new(manifest, RuntimeSettings { diagnostics: false });
    DomainInterface::root("Test Server", Arc::new(runtime), 64)
}
