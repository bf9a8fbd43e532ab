// Allow collapsible_if for complex conditional logic
#![allow(clippy::collapsible_if)]

//! # EVAS - Built-in Repositories
//!
//! Repositories every server gets without writing a module for them. Each
//! one submits a [`ModuleEntry`](evas_infrastructure::loader::ModuleEntry) to
//! [`ARTIFACT_MODULES`](evas_infrastructure::loader::ARTIFACT_MODULES), so a
//! manifest built with `ModuleManifest::from_registered` finds it as soon as
//! the matching directory exists under the server root.
//!
//! | Repository | Module id | Implementation |
//! |------------|-----------|----------------|
//! | `Configuration` | `repositories/init/configuration` | artifacts table, then `EVAS_<NAME>` |
//! | `Logger` | `repositories/runtime/logger` | tracing facade |
//! | `Cache` | `repositories/runtime/cache` | Moka |
//!
//! ## Usage
//!
//! ```ignore
//! use evas_providers::configuration_for;
//!
//! let settings = configuration_for(&interface, "Mailer").await?;
//! ```

pub use evas_domain::error::{Error, Result};

/// Repository names, module ids and defaults
pub mod constants;

/// Artifact configuration repository
pub mod configuration;

/// Tracing-backed logger repository
pub mod logger;

/// In-memory cache repository
#[cfg(feature = "cache-moka")]
pub mod cache;

mod settings;

#[cfg(feature = "cache-moka")]
pub use cache::{CacheRepository, CacheSettings, cache_factory};
pub use configuration::{ConfigurationRepository, configuration_factory, configuration_for};
pub use logger::{LoggerRepository, LoggerSettings, logger_factory};
