//! Domain events carried by the event emitter

use serde::{Deserialize, Serialize};

/// Event published on a scope's event emitter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Topic used by handlers to filter events
    pub topic: String,
    /// Arbitrary JSON payload
    pub payload: serde_json::Value,
}

impl DomainEvent {
    /// Create an event for a topic
    pub fn new<S: Into<String>>(topic: S, payload: serde_json::Value) -> Self {
        Self {
            topic: topic.into(),
            payload,
        }
    }
}
