//! Lifecycle managers
//!
//! | Scope | Categories (load order) | Mode |
//! |-------|-------------------------|------|
//! | Server | `repositories/init`, `repositories/runtime`, `domains`, `bounded_contexts` | subdirectories |
//! | Domain | `repositories`, `domains`, `bounded_contexts` | subdirectories |
//! | Bounded context | `middlewares`, `surfaces/command`, `surfaces/query`, `event_handlers` | flat files |
//!
//! Unload walks the same categories in reverse.

pub mod manager;
pub mod plan;

pub use manager::LifecycleManager;
pub use plan::{CategoryPlan, ScopeKind};
