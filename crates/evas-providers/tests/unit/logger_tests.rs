//! Tests for the Logger repository

use std::sync::Arc;

use evas_domain::Lifecycle;
use evas_infrastructure::di::IocContainer;
use evas_providers::constants::LOGGER_REPOSITORY;
use evas_providers::{LoggerRepository, LoggerSettings, logger_factory};
use serde_json::json;
use tracing::Level;

#[test]
fn records_below_threshold_are_dropped() {
    let logger = LoggerRepository::new(&LoggerSettings {
        level: "warn".to_string(),
        source: Some("billing".to_string()),
    })
    .expect("logger");

    assert_eq!(logger.level(), Level::WARN);
    assert!(logger.error("disk full"));
    assert!(logger.warn("disk almost full"));
    assert!(!logger.info("disk fine"));
    assert!(!logger.debug("disk details"));
}

#[test]
fn invalid_level_is_rejected() {
    let settings = LoggerSettings {
        level: "chatty".to_string(),
        source: None,
    };
    assert!(LoggerRepository::new(&settings).is_err());
}

#[tokio::test]
async fn container_builds_one_logger_per_configuration() {
    let root = IocContainer::root("Test Server", false);
    root.register(LOGGER_REPOSITORY, logger_factory());

    let debug: Arc<LoggerRepository> = root
        .resolve_as(LOGGER_REPOSITORY, &json!({ "level": "debug" }))
        .await
        .expect("debug logger");
    let again: Arc<LoggerRepository> = root
        .resolve_as(LOGGER_REPOSITORY, &json!({ "level": "debug" }))
        .await
        .expect("same logger");
    let default: Arc<LoggerRepository> = root
        .resolve_as(LOGGER_REPOSITORY, &json!(null))
        .await
        .expect("default logger");

    assert!(Arc::ptr_eq(&debug, &again));
    assert_eq!(debug.level(), Level::DEBUG);
    assert_eq!(default.level(), Level::INFO);
}

#[tokio::test]
async fn bad_configuration_fails_instantiation() {
    let root = IocContainer::root("Test Server", false);
    root.register(LOGGER_REPOSITORY, logger_factory());

    let error = root
        .resolve(LOGGER_REPOSITORY, &json!({ "level": 42 }))
        .await
        .err().expect("level must be a string");
    assert!(matches!(error, evas_domain::Error::Instantiation { .. }));
}

#[tokio::test]
async fn unloading_twice_is_an_error() {
    let logger = LoggerRepository::new(&LoggerSettings::default()).expect("logger");
    logger.load().await.expect("load");
    logger.unload().await.expect("unload");
    assert!(logger.unload().await.is_err());
}
