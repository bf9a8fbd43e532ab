//! Tests for the Configuration repository

use std::collections::BTreeMap;
use std::sync::Arc;

use evas_infrastructure::interface::{DomainInterface, RuntimeContext, RuntimeSettings};
use evas_infrastructure::loader::{ModuleExport, ModuleManifest};
use evas_providers::constants::CONFIGURATION_REPOSITORY;
use evas_providers::{ConfigurationRepository, configuration_factory, configuration_for};
use serde_json::{Value, json};

fn interface_with(artifacts: BTreeMap<String, Value>) -> DomainInterface {
    let runtime = RuntimeContext::new(
        ModuleManifest::new("/srv/evas"),
        RuntimeSettings { diagnostics: false },
    )
    .with_artifacts(artifacts);
    DomainInterface::root("Test Server", Arc::new(runtime), 16)
}

#[test]
fn table_entry_wins() {
    let repository = ConfigurationRepository::new(&json!({
        "artifacts": { "Mailer": { "host": "smtp.local" } }
    }))
    .expect("repository");

    assert_eq!(
        repository.get_config("Mailer").expect("mailer"),
        json!({ "host": "smtp.local" })
    );
    assert_eq!(repository.artifact_names(), vec!["Mailer"]);
}

#[test]
fn missing_everywhere_is_an_empty_object() {
    let repository = ConfigurationRepository::new(&json!({}))
        .expect("repository")
        .with_env_prefix("EVAS_PROVIDER_TEST_UNSET_");
    assert_eq!(repository.get_config("Nothing").expect("empty"), json!({}));
}

#[test]
fn environment_fallback_must_be_json() {
    // PATH is set in every test environment and is never a JSON document
    let repository = ConfigurationRepository::new(&Value::Null)
        .expect("repository")
        .with_env_prefix("");
    assert_eq!(repository.env_variable("path"), "PATH");
    assert!(repository.get_config("path").is_err());
}

#[tokio::test]
async fn configuration_for_reads_the_server_table() {
    let mut artifacts = BTreeMap::new();
    artifacts.insert("Cache".to_string(), json!({ "max_capacity": 10 }));
    let interface = interface_with(artifacts);
    interface
        .ioc_container
        .register(CONFIGURATION_REPOSITORY, configuration_factory());

    let config = configuration_for(&interface, "Cache").await.expect("config");
    assert_eq!(config, json!({ "max_capacity": 10 }));

    // Child scopes borrow the same repository instance
    let child = interface.for_domain("tenant", std::path::Path::new("/srv/evas/domains/tenant"));
    let from_child = configuration_for(&child, "Cache").await.expect("child config");
    assert_eq!(from_child, config);
}

#[tokio::test]
async fn configuration_for_without_repository_is_not_found() {
    let interface = interface_with(BTreeMap::new());
    let error = configuration_for(&interface, "Cache")
        .await
        .expect_err("nothing registered");
    assert!(error.is_not_found());
}

#[test]
fn factory_exports_as_repository() {
    let export = ModuleExport::Repository(configuration_factory());
    assert_eq!(export.name(), CONFIGURATION_REPOSITORY);
}
