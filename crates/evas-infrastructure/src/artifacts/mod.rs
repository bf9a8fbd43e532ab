//! Artifacts
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`base`] | Base state and transitions shared by every artifact |
//! | [`factory`] | `ArtifactFactory` contract and the generic memoizing factory |
//! | [`scope`] | Interface and lifecycle manager of a loaded scope |
//! | [`domain`] | Domain artifact and behaviour hooks |
//! | [`bounded_context`] | Bounded context artifact and behaviour hooks |
//! | [`leaf`] | Middleware, surface and event handler artifacts |

pub mod base;
pub mod bounded_context;
pub mod domain;
pub mod factory;
pub mod leaf;
pub mod scope;

pub use base::{ArtifactCore, StateCell};
pub use bounded_context::{
    BoundedContext, BoundedContextBehavior, BoundedContextFactory, BoundedContextKind,
    DefaultBoundedContext,
};
pub use domain::{DefaultDomain, Domain, DomainBehavior, DomainFactory, DomainKind};
pub use factory::{ArtifactFactory, ArtifactKind, BehaviorConstructor, Factory};
pub use leaf::{
    EventHandlerBehavior, EventHandlerFactory, EventHandlerKind, LeafArtifact, MiddlewareBehavior,
    MiddlewareFactory, MiddlewareKind, SurfaceBehavior, SurfaceFactory, SurfaceKind,
};
pub use scope::{ScopeCell, ScopeSlot};
