//! Artifact discovery
//!
//! Scans one category directory and imports every candidate from the module
//! manifest. All candidates settle before the outcome is decided: a single
//! failure fails the whole call with every cause attached and no partial list.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use evas_domain::error::{Error, Result};
use evas_domain::{ArtifactCategory, DiscoveryMode};
use futures::future::join_all;
use tokio::fs;
use tracing::debug;

use super::manifest::{ModuleExport, ModuleManifest};
use crate::constants::ENTRY_MODULE_STEM;

/// One imported candidate, tagged with its origin location
#[derive(Debug, Clone)]
pub struct DiscoveredArtifact {
    /// Directory (subdirectories mode) or file (flat-files mode)
    pub location: PathBuf,
    /// Export found in the manifest
    pub export: ModuleExport,
}

/// Discover every `category` artifact under `root`
///
/// A missing directory yields an empty list. Results are ordered by location.
pub async fn discover(
    root: &Path,
    mode: DiscoveryMode,
    category: ArtifactCategory,
    manifest: &ModuleManifest,
) -> Result<Vec<DiscoveredArtifact>> {
    let failure = |cause: Error| {
        Error::aggregate(
            format!("Errors discovering {category} artifacts in {}", root.display()),
            vec![cause],
        )
    };

    let candidates = match list_candidates(root, mode).await {
        Ok(Some(candidates)) => candidates,
        Ok(None) => return Ok(Vec::new()),
        Err(cause) => return Err(failure(cause)),
    };

    let results = join_all(
        candidates
            .into_iter()
            .map(|location| import_candidate(location, mode, category, manifest)),
    )
    .await;

    let mut discovered = Vec::with_capacity(results.len());
    let mut causes = Vec::new();
    for result in results {
        match result {
            Ok(artifact) => discovered.push(artifact),
            Err(cause) => causes.push(cause),
        }
    }

    if !causes.is_empty() {
        return Err(Error::aggregate(
            format!("Errors discovering {category} artifacts in {}", root.display()),
            causes,
        ));
    }

    debug!(
        category = %category,
        root = %root.display(),
        count = discovered.len(),
        "artifacts discovered"
    );
    Ok(discovered)
}

/// Candidate locations under `root`; `None` when `root` does not exist
async fn list_candidates(root: &Path, mode: DiscoveryMode) -> Result<Option<Vec<PathBuf>>> {
    let mut entries = match fs::read_dir(root).await {
        Ok(entries) => entries,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(Error::discovery_with_source(root, "cannot read directory", err));
        }
    };

    let mut candidates = Vec::new();
    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(err) => {
                return Err(Error::discovery_with_source(root, "cannot read directory", err));
            }
        };
        let file_type = entry
            .file_type()
            .await
            .map_err(|err| Error::discovery_with_source(entry.path(), "cannot stat entry", err))?;

        let keep = match mode {
            DiscoveryMode::Subdirectories => file_type.is_dir(),
            DiscoveryMode::FlatFiles => {
                file_type.is_file() && !entry.file_name().to_string_lossy().starts_with('.')
            }
        };
        if keep {
            candidates.push(entry.path());
        }
    }

    candidates.sort();
    Ok(Some(candidates))
}

async fn import_candidate(
    location: PathBuf,
    mode: DiscoveryMode,
    category: ArtifactCategory,
    manifest: &ModuleManifest,
) -> Result<DiscoveredArtifact> {
    if mode == DiscoveryMode::Subdirectories && !has_entry_module(&location).await? {
        return Err(Error::discovery(
            &location,
            format!("missing entry module '{ENTRY_MODULE_STEM}'"),
        ));
    }

    let export = manifest.import(&location, mode, category)?;
    Ok(DiscoveredArtifact { location, export })
}

/// True when `directory` holds a file named `index` or `index.<ext>`
async fn has_entry_module(directory: &Path) -> Result<bool> {
    let mut entries = fs::read_dir(directory)
        .await
        .map_err(|err| Error::discovery_with_source(directory, "cannot read directory", err))?;

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|err| Error::discovery_with_source(directory, "cannot read directory", err))?
    {
        let path = entry.path();
        let is_entry = path
            .file_stem()
            .is_some_and(|stem| stem == ENTRY_MODULE_STEM);
        if is_entry && entry.file_type().await.is_ok_and(|kind| kind.is_file()) {
            return Ok(true);
        }
    }
    Ok(false)
}
