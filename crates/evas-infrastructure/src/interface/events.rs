//! In-process event emitter
//!
//! Tokio broadcast channel shared by every scope of a server. Event handlers
//! subscribe per topic; each subscription runs as its own task and is aborted
//! when the owning artifact unloads.

use std::future::Future;
use std::sync::Arc;

use evas_domain::DomainEvent;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::constants::DEFAULT_EVENT_CAPACITY;

/// Broadcast bus of [`DomainEvent`]s
#[derive(Clone)]
pub struct EventEmitter {
    sender: Arc<broadcast::Sender<DomainEvent>>,
    capacity: usize,
}

impl EventEmitter {
    /// Emitter with the default capacity
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_EVENT_CAPACITY)
    }

    /// Emitter buffering at most `capacity` events per lagging subscriber
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
            capacity,
        }
    }

    /// Publish `event`; returns the number of subscribers reached
    pub fn emit(&self, event: DomainEvent) -> usize {
        if let Ok(count) = self.sender.send(event) {
            debug!("Published event to {} subscribers", count);
            count
        } else {
            debug!("Published event but no subscribers");
            0
        }
    }

    /// Raw receiver of every event
    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.sender.subscribe()
    }

    /// Spawn a task running `handler` for every event on `topic`
    pub fn on<S, F, Fut>(&self, topic: S, handler: F) -> JoinHandle<()>
    where
        S: Into<String>,
        F: Fn(DomainEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let topic = topic.into();
        let mut receiver = self.sender.subscribe();
        tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(event) if event.topic == topic => handler(event).await,
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(topic = %topic, "Event subscription lagged by {} events", n);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    /// Current number of subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventEmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("capacity", &self.capacity)
            .field("subscribers", &self.sender.receiver_count())
            .finish()
    }
}
