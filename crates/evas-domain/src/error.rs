//! Error handling types
//!
//! Every failure raised by the artifact runtime is one of the variants below.
//! Failures of independent concurrent operations are combined into a single
//! [`AggregateError`] that keeps every individual cause.

use std::path::PathBuf;

use thiserror::Error;

use crate::artifact::{ArtifactCategory, LifecycleState};

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed foreign error carried as a source
pub type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Main error type for the artifact runtime
#[derive(Error, Debug)]
pub enum Error {
    /// Filesystem scan or module import failure during discovery
    #[error("Discovery error at {}: {message}", location.display())]
    Discovery {
        /// Candidate location that failed
        location: PathBuf,
        /// Description of the failure
        message: String,
        /// Optional source error
        #[source]
        source: Option<BoxedSource>,
    },

    /// Failure raised inside an artifact's own `load`
    #[error("Error loading {category} '{artifact}' in {scope}")]
    ArtifactLoad {
        /// Scope path of the owning lifecycle manager
        scope: String,
        /// Category of the artifact
        category: ArtifactCategory,
        /// Artifact name
        artifact: String,
        /// What went wrong
        #[source]
        source: Box<Error>,
    },

    /// Failure raised inside an artifact's own `unload`
    #[error("Error unloading {category} '{artifact}' in {scope}")]
    ArtifactUnload {
        /// Scope path of the owning lifecycle manager
        scope: String,
        /// Category of the artifact
        category: ArtifactCategory,
        /// Artifact name
        artifact: String,
        /// What went wrong
        #[source]
        source: Box<Error>,
    },

    /// `load`/`unload` invoked in a state that does not allow it
    #[error("Cannot {operation} '{artifact}' while it is {state}")]
    Lifecycle {
        /// Artifact name
        artifact: String,
        /// Attempted operation (`load` or `unload`)
        operation: &'static str,
        /// State the artifact was in
        state: LifecycleState,
    },

    /// Two modules of one category export the same artifact name
    #[error("Duplicate {category} '{artifact}' exported from {}", location.display())]
    DuplicateArtifact {
        /// Category of the artifact
        category: ArtifactCategory,
        /// Artifact name
        artifact: String,
        /// Location of the rejected module
        location: PathBuf,
    },

    /// No factory registered for the name anywhere in the container chain
    #[error("Unable to resolve {path}::{name}: factory not found")]
    ResolutionNotFound {
        /// Domain path of the resolving container
        path: String,
        /// Requested repository name
        name: String,
    },

    /// Factory found but failed to create an instance
    #[error("Unable to instantiate {path}::{name}: factory failed to create instance")]
    Instantiation {
        /// Domain path of the resolving container
        path: String,
        /// Requested repository name
        name: String,
        /// What went wrong
        #[source]
        source: Box<Error>,
    },

    /// Several independent failures
    #[error(transparent)]
    Aggregate(#[from] AggregateError),

    /// API registry failure
    #[error("API error in {name}: {message}")]
    Api {
        /// API name
        name: String,
        /// Description of the failure
        message: String,
    },

    /// Configuration-related error
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error
        message: String,
        /// Optional source error
        #[source]
        source: Option<BoxedSource>,
    },

    /// I/O operation error
    #[error("I/O error: {message}")]
    Io {
        /// Description of the I/O error
        message: String,
        /// Optional source error
        #[source]
        source: Option<BoxedSource>,
    },

    /// JSON parsing or serialization error
    #[error("JSON parsing error: {source}")]
    Json {
        /// The underlying JSON error
        #[from]
        source: serde_json::Error,
    },

    /// Internal system error
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error
        message: String,
    },
}

/// A single error value carrying every cause of a set of concurrent failures
#[derive(Error, Debug)]
#[error("{message} ({} cause(s))", .causes.len())]
pub struct AggregateError {
    message: String,
    causes: Vec<Error>,
}

impl AggregateError {
    /// Create an aggregate from a message and its causes
    pub fn new<S: Into<String>>(message: S, causes: Vec<Error>) -> Self {
        Self {
            message: message.into(),
            causes,
        }
    }

    /// Summary message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Every individual cause, in the order they were collected
    pub fn causes(&self) -> &[Error] {
        &self.causes
    }

    /// Consume the aggregate and return its causes
    pub fn into_causes(self) -> Vec<Error> {
        self.causes
    }

    /// `Ok(())` when `causes` is empty, otherwise one aggregate error
    pub fn check<S: Into<String>>(message: S, causes: Vec<Error>) -> Result<()> {
        if causes.is_empty() {
            return Ok(());
        }
        Err(Error::Aggregate(Self::new(message, causes)))
    }
}

// Basic error creation methods
impl Error {
    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Create an aggregate error
    pub fn aggregate<S: Into<String>>(message: S, causes: Vec<Error>) -> Self {
        Self::Aggregate(AggregateError::new(message, causes))
    }

    /// Create an API error
    pub fn api<N: Into<String>, S: Into<String>>(name: N, message: S) -> Self {
        Self::Api {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a discovery error without a source
    pub fn discovery<S: Into<String>>(location: impl Into<PathBuf>, message: S) -> Self {
        Self::Discovery {
            location: location.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create a discovery error with a source
    pub fn discovery_with_source<S, E>(location: impl Into<PathBuf>, message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Discovery {
            location: location.into(),
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

// Configuration and I/O error creation methods
impl Error {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error with source
    pub fn configuration_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Configuration {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io {
            message: message.into(),
            source: None,
        }
    }

    /// Create an I/O error with source
    pub fn io_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Io {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

// Inspection helpers
impl Error {
    /// Causes of an aggregate error; empty for every other variant
    pub fn causes(&self) -> &[Error] {
        match self {
            Self::Aggregate(aggregate) => aggregate.causes(),
            _ => &[],
        }
    }

    /// True for [`Error::Aggregate`]
    pub fn is_aggregate(&self) -> bool {
        matches!(self, Self::Aggregate(_))
    }

    /// True for [`Error::ResolutionNotFound`]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ResolutionNotFound { .. })
    }
}
