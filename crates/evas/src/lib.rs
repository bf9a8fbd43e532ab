//! # EVAS
//!
//! Entity Value Aggregate Server: discovers pluggable artifacts on disk,
//! loads them scope by scope and serves repositories through a hierarchical
//! IoC container.
//!
//! ```text
//! server ─┬─ repositories/init, repositories/runtime   (IoC container)
//!         ├─ domains/<name> ─┬─ repositories
//!         │                  ├─ domains/<name> ...
//!         │                  └─ bounded_contexts/<name>
//!         └─ bounded_contexts/<name> ─┬─ middlewares/*
//!                                     ├─ surfaces/command/*, surfaces/query/*
//!                                     └─ event_handlers/*
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use evas::infrastructure::artifacts::{DefaultDomain, DomainFactory};
//! use evas::infrastructure::loader::{ARTIFACT_MODULES, ModuleEntry};
//!
//! #[linkme::distributed_slice(ARTIFACT_MODULES)]
//! static TENANT: ModuleEntry = ModuleEntry {
//!     path: "domains/tenant",
//!     export: || DomainFactory::new("tenant", || Box::new(DefaultDomain)).export(),
//! };
//! ```

/// Domain layer - error taxonomy and lifecycle contract
pub mod domain {
    pub use evas_domain::*;
}

/// Infrastructure layer - DI, discovery, lifecycle managers, config
pub mod infrastructure {
    pub use evas_infrastructure::*;
}

/// Built-in repositories
pub mod providers {
    pub use evas_providers::*;
}

/// Server layer - application server and bootstrap
pub mod server {
    pub use evas_server::*;
}

pub use domain::{Artifact, ArtifactCategory, Error, Lifecycle, LifecycleState, Result};
pub use server::{ApplicationServer, ApplicationServerFactory, RunOptions, run};
