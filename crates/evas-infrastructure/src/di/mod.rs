//! Dependency injection
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`registry`] | Per-key memoizing singleton registry used by every factory |
//! | [`repository`] | Repository contract and the singleton repository factory |
//! | [`container`] | Hierarchical IoC container with owned and borrowed names |

pub mod container;
pub mod registry;
pub mod repository;

pub use container::IocContainer;
pub use registry::SingletonRegistry;
pub use repository::{
    Repository, RepositoryConstructor, RepositoryFactory, SingletonRepositoryFactory,
};
