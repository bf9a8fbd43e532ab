//! Domain ports
//!
//! Contracts implemented by every loadable artifact.

pub mod lifecycle;

pub use lifecycle::{Artifact, Lifecycle};
