//! Tests for error context conversion and error tree rendering

use std::io;

use evas_domain::{ArtifactCategory, Error};
use evas_infrastructure::error_ext::{ErrorContext, ErrorTree};

#[test]
fn io_context_keeps_the_source() {
    let result: Result<(), io::Error> = Err(io::Error::new(io::ErrorKind::NotFound, "gone"));
    let error = result.io_context("Failed to read template").expect_err("io error");

    assert!(matches!(error, Error::Io { ref source, .. } if source.is_some()));
    assert_eq!(error.to_string(), "I/O error: Failed to read template");
}

#[test]
fn context_folds_the_source_into_the_message() {
    let result: Result<u8, std::num::ParseIntError> = "x".parse::<u8>();
    let error = result.context("Invalid port").expect_err("parse error");
    assert!(error.to_string().starts_with("Internal error: Invalid port: "));
}

#[test]
fn error_tree_nests_artifact_failures() {
    let middleware = Error::ArtifactLoad {
        scope: "SERVER::TENANT::USERS".to_string(),
        category: ArtifactCategory::Middleware,
        artifact: "audit".to_string(),
        source: Box::new(Error::internal("boom")),
    };
    let context = Error::ArtifactLoad {
        scope: "SERVER::TENANT".to_string(),
        category: ArtifactCategory::BoundedContext,
        artifact: "users".to_string(),
        source: Box::new(Error::aggregate(
            "Errors loading bounded context children of SERVER::TENANT::USERS",
            vec![middleware],
        )),
    };
    let root = Error::aggregate("Errors loading server children of SERVER", vec![context]);

    let rendered = ErrorTree(&root).to_string();
    let lines: Vec<&str> = rendered.lines().collect();

    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0], "Errors loading server children of SERVER (1 cause(s))");
    assert_eq!(
        lines[1],
        "  - Error loading bounded context 'users' in SERVER::TENANT"
    );
    assert!(lines[2].starts_with("    - Errors loading bounded context children"));
    assert_eq!(
        lines[3],
        "      - Error loading middleware 'audit' in SERVER::TENANT::USERS"
    );
    assert_eq!(lines[4], "        - Internal error: boom");
}

#[test]
fn error_tree_prints_foreign_source_chain() {
    let error = Error::io_with_source(
        "Failed to write config file",
        io::Error::new(io::ErrorKind::PermissionDenied, "read-only"),
    );
    let rendered = ErrorTree(&error).to_string();
    assert_eq!(
        rendered,
        "I/O error: Failed to write config file\n  caused by: read-only"
    );
}
