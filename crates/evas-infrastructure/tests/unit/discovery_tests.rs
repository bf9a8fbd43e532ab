//! Tests for directory discovery and the module manifest

use evas_domain::{ArtifactCategory, DiscoveryMode, Error};
use evas_infrastructure::artifacts::{DefaultDomain, DomainFactory};
use evas_infrastructure::loader::{ModuleExport, ModuleManifest, discover};

use crate::test_utils::{ArtifactTree, Journal, echo_middleware};

fn domain(name: &str) -> ModuleExport {
    DomainFactory::new(name, || Box::new(DefaultDomain)).export()
}

#[tokio::test]
async fn missing_directory_is_empty() {
    let tree = ArtifactTree::new();
    let manifest = ModuleManifest::new(tree.root());

    let found = discover(
        &tree.path("domains"),
        DiscoveryMode::Subdirectories,
        ArtifactCategory::Domain,
        &manifest,
    )
    .await
    .expect("missing dir is fine");
    assert!(found.is_empty());
}

#[tokio::test]
async fn subdirectory_without_entry_module_fails_whole_call() {
    let tree = ArtifactTree::new();
    tree.artifact_dir("domains/billing");
    tree.artifact_dir("domains/tenant");
    tree.bare_dir("domains/scratch");
    let manifest = ModuleManifest::new(tree.root())
        .with_module("domains/billing", domain("billing"))
        .with_module("domains/tenant", domain("tenant"));

    let error = discover(
        &tree.path("domains"),
        DiscoveryMode::Subdirectories,
        ArtifactCategory::Domain,
        &manifest,
    )
    .await
    .expect_err("scratch has no index");

    assert!(error.is_aggregate());
    assert_eq!(error.causes().len(), 1);
    assert!(matches!(
        &error.causes()[0],
        Error::Discovery { location, .. } if location.ends_with("scratch")
    ));
}

#[tokio::test]
async fn subdirectories_come_back_sorted() {
    let tree = ArtifactTree::new();
    tree.artifact_dir("domains/tenant");
    tree.artifact_dir("domains/billing");
    tree.file("domains/README.md", "not an artifact");
    let manifest = ModuleManifest::new(tree.root())
        .with_module("domains/billing", domain("billing"))
        .with_module("domains/tenant", domain("tenant"));

    let found = discover(
        &tree.path("domains"),
        DiscoveryMode::Subdirectories,
        ArtifactCategory::Domain,
        &manifest,
    )
    .await
    .expect("discover");

    let names: Vec<&str> = found.iter().map(|a| a.export.name()).collect();
    assert_eq!(names, vec!["billing", "tenant"]);
    assert_eq!(found[0].location, tree.path("domains/billing"));
}

#[tokio::test]
async fn flat_files_skip_hidden_files_and_subdirectories() {
    let tree = ArtifactTree::new();
    let journal = Journal::new();
    tree.file("middlewares/session.toml", "");
    tree.file("middlewares/audit.toml", "");
    tree.file("middlewares/.keep", "");
    tree.bare_dir("middlewares/helpers");
    let manifest = ModuleManifest::new(tree.root())
        .with_module("middlewares/audit", echo_middleware("audit", "audit", &journal, false))
        .with_module("middlewares/session", echo_middleware("session", "session", &journal, false));

    let found = discover(
        &tree.path("middlewares"),
        DiscoveryMode::FlatFiles,
        ArtifactCategory::Middleware,
        &manifest,
    )
    .await
    .expect("discover");

    let names: Vec<&str> = found.iter().map(|a| a.export.name()).collect();
    assert_eq!(names, vec!["audit", "session"]);
}

#[tokio::test]
async fn unregistered_module_is_a_discovery_error() {
    let tree = ArtifactTree::new();
    tree.artifact_dir("domains/tenant");
    let manifest = ModuleManifest::new(tree.root());

    let error = discover(
        &tree.path("domains"),
        DiscoveryMode::Subdirectories,
        ArtifactCategory::Domain,
        &manifest,
    )
    .await
    .expect_err("nothing registered");

    assert_eq!(error.causes().len(), 1);
    assert!(error.causes()[0].to_string().contains("Discovery error"));
}

#[tokio::test]
async fn wrong_category_is_rejected() {
    let tree = ArtifactTree::new();
    let journal = Journal::new();
    tree.artifact_dir("domains/audit");
    let manifest = ModuleManifest::new(tree.root())
        .with_module("domains/audit", echo_middleware("audit", "audit", &journal, false));

    let error = discover(
        &tree.path("domains"),
        DiscoveryMode::Subdirectories,
        ArtifactCategory::Domain,
        &manifest,
    )
    .await
    .expect_err("middleware under domains");
    assert!(error.causes()[0].to_string().contains("Discovery error"));
}

#[test]
fn module_ids_are_relative_and_extensionless_for_flat_files() {
    let tree = ArtifactTree::new();
    let manifest = ModuleManifest::new(tree.root());

    let dir_id = manifest
        .module_id(&tree.path("domains/tenant"), DiscoveryMode::Subdirectories)
        .expect("dir id");
    let file_id = manifest
        .module_id(
            &tree.path("bounded_contexts/users/middlewares/audit.toml"),
            DiscoveryMode::FlatFiles,
        )
        .expect("file id");

    assert_eq!(dir_id, "domains/tenant");
    assert_eq!(file_id, "bounded_contexts/users/middlewares/audit");
}

#[test]
fn location_outside_root_is_rejected() {
    let tree = ArtifactTree::new();
    let manifest = ModuleManifest::new(tree.path("server"));

    assert!(
        manifest
            .module_id(&tree.path("elsewhere/tenant"), DiscoveryMode::Subdirectories)
            .is_err()
    );
}

#[test]
fn later_registration_replaces_earlier() {
    let mut manifest = ModuleManifest::new("/srv/evas");
    manifest.register("domains/tenant", domain("first"));
    manifest.register("domains/tenant", domain("second"));

    assert_eq!(manifest.len(), 1);
    assert_eq!(manifest.module_ids(), vec!["domains/tenant"]);
}
