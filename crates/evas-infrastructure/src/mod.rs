// Clippy allows for complex patterns in infrastructure code
#![allow(clippy::collapsible_if)]

//! # Infrastructure Layer
//!
//! The artifact runtime: discovery, memoizing factories, the hierarchical
//! IoC container and the per-scope lifecycle managers, plus the
//! configuration and logging every binary needs.
//!
//! ## Module Categories
//!
//! ### Artifact Runtime
//! | Module | Description |
//! |--------|-------------|
//! | [`artifacts`] | Artifact core, factories, domains, bounded contexts and leaves |
//! | [`lifecycle`] | Per-scope lifecycle managers and category plans |
//! | [`loader`] | Module manifest and directory discovery |
//! | [`interface`] | Capabilities handed from each scope to its children |
//!
//! ### Configuration & DI
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Figment configuration (defaults, TOML, environment) |
//! | [`di`] | Singleton registry, repositories and the IoC container |
//! | [`constants`] | Directory conventions and configuration defaults |
//!
//! ### Observability
//! | Module | Description |
//! |--------|-------------|
//! | [`logging`] | Structured logging with tracing |
//! | [`error_ext`] | Error context conversion and error tree rendering |

pub mod artifacts;
pub mod config;
pub mod constants;
pub mod di;
pub mod error_ext;
pub mod interface;
pub mod lifecycle;
pub mod loader;
pub mod logging;

// Re-export commonly used types
pub use artifacts::{ArtifactFactory, ArtifactKind, Factory};
pub use di::{IocContainer, Repository, RepositoryFactory, SingletonRegistry};
pub use error_ext::{ErrorContext, ErrorTree};
pub use interface::{DomainInterface, RuntimeContext, RuntimeSettings};
pub use lifecycle::{LifecycleManager, ScopeKind};
pub use loader::{ModuleExport, ModuleManifest};
