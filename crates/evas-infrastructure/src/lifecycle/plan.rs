//! Child category plans per scope

use std::fmt;

use evas_domain::{ArtifactCategory, DiscoveryMode};

use crate::constants::{
    BOUNDED_CONTEXTS_DIR, COMMAND_SURFACES_DIR, DOMAIN_REPOSITORIES_DIR, DOMAINS_DIR,
    EVENT_HANDLERS_DIR, INIT_REPOSITORIES_DIR, MIDDLEWARES_DIR, QUERY_SURFACES_DIR,
    RUNTIME_REPOSITORIES_DIR,
};

/// One child category of a scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryPlan {
    /// Directory relative to the scope's location
    pub directory: &'static str,
    /// Category the discovered modules must export
    pub category: ArtifactCategory,
    /// How candidates are enumerated
    pub mode: DiscoveryMode,
}

impl CategoryPlan {
    const fn new(directory: &'static str, category: ArtifactCategory, mode: DiscoveryMode) -> Self {
        Self {
            directory,
            category,
            mode,
        }
    }
}

const SERVER_PLAN: [CategoryPlan; 4] = [
    CategoryPlan::new(
        INIT_REPOSITORIES_DIR,
        ArtifactCategory::Repository,
        DiscoveryMode::Subdirectories,
    ),
    CategoryPlan::new(
        RUNTIME_REPOSITORIES_DIR,
        ArtifactCategory::Repository,
        DiscoveryMode::Subdirectories,
    ),
    CategoryPlan::new(DOMAINS_DIR, ArtifactCategory::Domain, DiscoveryMode::Subdirectories),
    CategoryPlan::new(
        BOUNDED_CONTEXTS_DIR,
        ArtifactCategory::BoundedContext,
        DiscoveryMode::Subdirectories,
    ),
];

const DOMAIN_PLAN: [CategoryPlan; 3] = [
    CategoryPlan::new(
        DOMAIN_REPOSITORIES_DIR,
        ArtifactCategory::Repository,
        DiscoveryMode::Subdirectories,
    ),
    CategoryPlan::new(DOMAINS_DIR, ArtifactCategory::Domain, DiscoveryMode::Subdirectories),
    CategoryPlan::new(
        BOUNDED_CONTEXTS_DIR,
        ArtifactCategory::BoundedContext,
        DiscoveryMode::Subdirectories,
    ),
];

const BOUNDED_CONTEXT_PLAN: [CategoryPlan; 4] = [
    CategoryPlan::new(MIDDLEWARES_DIR, ArtifactCategory::Middleware, DiscoveryMode::FlatFiles),
    CategoryPlan::new(COMMAND_SURFACES_DIR, ArtifactCategory::Surface, DiscoveryMode::FlatFiles),
    CategoryPlan::new(QUERY_SURFACES_DIR, ArtifactCategory::Surface, DiscoveryMode::FlatFiles),
    CategoryPlan::new(
        EVENT_HANDLERS_DIR,
        ArtifactCategory::EventHandler,
        DiscoveryMode::FlatFiles,
    ),
];

/// Kind of scope a lifecycle manager serves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    Server,
    Domain,
    BoundedContext,
}

impl ScopeKind {
    /// Child categories in load order
    pub fn plan(self) -> &'static [CategoryPlan] {
        match self {
            Self::Server => &SERVER_PLAN,
            Self::Domain => &DOMAIN_PLAN,
            Self::BoundedContext => &BOUNDED_CONTEXT_PLAN,
        }
    }
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Server => "server",
            Self::Domain => "domain",
            Self::BoundedContext => "bounded context",
        };
        f.write_str(name)
    }
}
