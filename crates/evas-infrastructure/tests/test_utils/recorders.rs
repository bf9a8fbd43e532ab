//! Recorder artifacts
//!
//! Every recorder shares a [`Journal`] so tests can assert how many times
//! `load`/`unload` ran and in which order.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use evas_domain::error::{Error, Result};
use evas_domain::{DomainEvent, Lifecycle};
use evas_infrastructure::artifacts::{
    EventHandlerBehavior, EventHandlerFactory, MiddlewareBehavior, MiddlewareFactory,
    SurfaceBehavior, SurfaceFactory,
};
use evas_infrastructure::di::{IocContainer, Repository, SingletonRepositoryFactory};
use evas_infrastructure::interface::DomainInterface;
use evas_infrastructure::loader::ModuleExport;
use serde_json::{Value, json};
use tokio::task::JoinHandle;

/// Shared record of lifecycle calls
#[derive(Debug, Default)]
pub struct Journal {
    loads: AtomicUsize,
    unloads: AtomicUsize,
    entries: Mutex<Vec<String>>,
}

impl Journal {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn record_load(&self, who: &str) {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.push(format!("load:{who}"));
    }

    pub fn record_unload(&self, who: &str) {
        self.unloads.fetch_add(1, Ordering::SeqCst);
        self.push(format!("unload:{who}"));
    }

    pub fn push(&self, entry: String) {
        self.entries.lock().expect("journal lock").push(entry);
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn unloads(&self) -> usize {
        self.unloads.load(Ordering::SeqCst)
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().expect("journal lock").clone()
    }

    /// Position of `entry` in the journal
    pub fn position(&self, entry: &str) -> Option<usize> {
        self.entries().iter().position(|e| e == entry)
    }
}

/// Plain lifecycle object for registry tests
pub struct Counted {
    pub name: String,
    journal: Arc<Journal>,
    fail_load: bool,
    fail_unload: bool,
}

impl Counted {
    pub fn new(name: &str, journal: &Arc<Journal>) -> Self {
        Self {
            name: name.to_string(),
            journal: Arc::clone(journal),
            fail_load: false,
            fail_unload: false,
        }
    }

    pub fn failing_load(mut self) -> Self {
        self.fail_load = true;
        self
    }

    pub fn failing_unload(mut self) -> Self {
        self.fail_unload = true;
        self
    }
}

#[async_trait]
impl Lifecycle for Counted {
    async fn load(&self) -> Result<()> {
        tokio::task::yield_now().await;
        self.journal.record_load(&self.name);
        if self.fail_load {
            return Err(Error::internal(format!("{} refused to load", self.name)));
        }
        Ok(())
    }

    async fn unload(&self) -> Result<()> {
        self.journal.record_unload(&self.name);
        if self.fail_unload {
            return Err(Error::internal(format!("{} refused to unload", self.name)));
        }
        Ok(())
    }
}

/// Repository remembering the configuration it was built with
pub struct RecorderRepository {
    name: String,
    pub configuration: Value,
    journal: Arc<Journal>,
    fail_unload: bool,
}

impl RecorderRepository {
    pub fn configuration(&self) -> &Value {
        &self.configuration
    }
}

#[async_trait]
impl Lifecycle for RecorderRepository {
    async fn load(&self) -> Result<()> {
        self.journal.record_load(&self.name);
        Ok(())
    }

    async fn unload(&self) -> Result<()> {
        self.journal.record_unload(&self.name);
        if self.fail_unload {
            return Err(Error::internal(format!("{} refused to unload", self.name)));
        }
        Ok(())
    }
}

impl Repository for RecorderRepository {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Repository of a different type, for downcast failures
pub struct OtherRepository;

#[async_trait]
impl Lifecycle for OtherRepository {
    async fn load(&self) -> Result<()> {
        Ok(())
    }

    async fn unload(&self) -> Result<()> {
        Ok(())
    }
}

impl Repository for OtherRepository {
    fn name(&self) -> &str {
        "Other"
    }
}

/// Repository factory producing [`RecorderRepository`] instances
pub fn recorder_repository(name: &str, journal: &Arc<Journal>) -> Arc<SingletonRepositoryFactory> {
    build_recorder_repository(name, journal, false)
}

/// Like [`recorder_repository`] but every instance fails to unload
pub fn failing_unload_repository(
    name: &str,
    journal: &Arc<Journal>,
) -> Arc<SingletonRepositoryFactory> {
    build_recorder_repository(name, journal, true)
}

fn build_recorder_repository(
    name: &str,
    journal: &Arc<Journal>,
    fail_unload: bool,
) -> Arc<SingletonRepositoryFactory> {
    let journal = Arc::clone(journal);
    let repository_name = name.to_string();
    Arc::new(SingletonRepositoryFactory::new(
        name,
        move |configuration: &Value, _container: &Arc<IocContainer>| {
            let repository: Arc<dyn Repository> = Arc::new(RecorderRepository {
                name: repository_name.clone(),
                configuration: configuration.clone(),
                journal: Arc::clone(&journal),
                fail_unload,
            });
            Ok(repository)
        },
    ))
}

/// Repository factory whose constructor always fails
pub fn broken_repository(name: &str) -> Arc<SingletonRepositoryFactory> {
    Arc::new(SingletonRepositoryFactory::new(
        name,
        |_configuration: &Value, _container: &Arc<IocContainer>| {
            Err(Error::internal("connection refused"))
        },
    ))
}

/// Middleware registering one API that echoes its arguments
pub struct EchoMiddleware {
    pub api: String,
    pub journal: Arc<Journal>,
    pub fail_load: bool,
}

#[async_trait]
impl MiddlewareBehavior for EchoMiddleware {
    async fn register_api(&self, interface: &DomainInterface) -> Result<()> {
        if self.fail_load {
            return Err(Error::internal(format!("{} cannot start", self.api)));
        }
        interface
            .api_registry
            .register_fn(self.api.clone(), |args| async move { Ok(json!({ "echo": args })) })?;
        self.journal.record_load(&self.api);
        Ok(())
    }

    async fn unregister_api(&self, interface: &DomainInterface) -> Result<()> {
        interface.api_registry.unregister(&self.api);
        self.journal.record_unload(&self.api);
        Ok(())
    }
}

/// Manifest export of an [`EchoMiddleware`]
pub fn echo_middleware(
    name: &str,
    api: &str,
    journal: &Arc<Journal>,
    fail_load: bool,
) -> ModuleExport {
    let api = api.to_string();
    let journal = Arc::clone(journal);
    MiddlewareFactory::new(name, move || {
        Box::new(EchoMiddleware {
            api: api.clone(),
            journal: Arc::clone(&journal),
            fail_load,
        })
    })
    .export()
}

/// Surface exposing an API that calls a middleware API
pub struct ForwardingSurface {
    pub api: String,
    pub target: String,
    pub journal: Arc<Journal>,
}

#[async_trait]
impl SurfaceBehavior for ForwardingSurface {
    async fn register_api(&self, interface: &DomainInterface) -> Result<()> {
        let registry = Arc::clone(&interface.api_registry);
        let target = self.target.clone();
        interface.api_registry.register_fn(self.api.clone(), move |args| {
            let registry = Arc::clone(&registry);
            let target = target.clone();
            async move { registry.execute(&target, args).await }
        })?;
        self.journal.record_load(&self.api);
        Ok(())
    }

    async fn unregister_api(&self, interface: &DomainInterface) -> Result<()> {
        interface.api_registry.unregister(&self.api);
        self.journal.record_unload(&self.api);
        Ok(())
    }
}

pub fn forwarding_surface(
    name: &str,
    api: &str,
    target: &str,
    journal: &Arc<Journal>,
) -> ModuleExport {
    let api = api.to_string();
    let target = target.to_string();
    let journal = Arc::clone(journal);
    SurfaceFactory::new(name, move || {
        Box::new(ForwardingSurface {
            api: api.clone(),
            target: target.clone(),
            journal: Arc::clone(&journal),
        })
    })
    .export()
}

/// Event handler recording every payload received on one topic
pub struct TopicRecorder {
    pub name: String,
    pub topic: String,
    pub journal: Arc<Journal>,
}

#[async_trait]
impl EventHandlerBehavior for TopicRecorder {
    async fn register_handlers(&self, interface: &DomainInterface) -> Result<Vec<JoinHandle<()>>> {
        let journal = Arc::clone(&self.journal);
        let handle = interface.event_emitter.on(self.topic.clone(), move |event: DomainEvent| {
            let journal = Arc::clone(&journal);
            async move { journal.push(format!("event:{}", event.payload)) }
        });
        self.journal.record_load(&self.name);
        Ok(vec![handle])
    }

    async fn unregister_handlers(&self, _interface: &DomainInterface) -> Result<()> {
        self.journal.record_unload(&self.name);
        Ok(())
    }
}

pub fn topic_recorder(name: &str, topic: &str, journal: &Arc<Journal>) -> ModuleExport {
    let handler_name = name.to_string();
    let topic = topic.to_string();
    let journal = Arc::clone(journal);
    EventHandlerFactory::new(name, move || {
        Box::new(TopicRecorder {
            name: handler_name.clone(),
            topic: topic.clone(),
            journal: Arc::clone(&journal),
        })
    })
    .export()
}

/// Wait until `check` holds or a second has passed
pub async fn eventually<F: Fn() -> bool>(check: F) -> bool {
    for _ in 0..100 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}
