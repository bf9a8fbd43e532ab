//! # EVAS Domain Layer
//!
//! Artifact contracts shared by every layer of the Entity Value Aggregate
//! Server runtime.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`artifact`] | Categories, lifecycle states, discovery modes, instance keys |
//! | [`error`] | Error taxonomy and aggregate errors |
//! | [`events`] | Events published through a scope's event emitter |
//! | [`ports`] | `Lifecycle` and `Artifact` traits |

pub mod artifact;
pub mod error;
pub mod events;
pub mod ports;

pub use artifact::{ArtifactCategory, DiscoveryMode, InstanceKey, LifecycleState};
pub use error::{AggregateError, Error, Result};
pub use events::DomainEvent;
pub use ports::{Artifact, Lifecycle};
