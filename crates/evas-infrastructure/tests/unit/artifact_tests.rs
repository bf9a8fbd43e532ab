//! Tests for artifact state transitions and scope artifacts

use std::sync::Arc;

use async_trait::async_trait;
use evas_domain::error::Result;
use evas_domain::{Artifact, DomainEvent, Error, Lifecycle, LifecycleState};
use evas_infrastructure::artifacts::{
    ArtifactFactory, BoundedContextFactory, DefaultBoundedContext, DomainBehavior, DomainFactory,
    EventHandlerFactory, MiddlewareFactory,
};
use evas_infrastructure::interface::{DomainInterface, ResourceType, TypeRegistry};
use evas_infrastructure::loader::ModuleManifest;
use serde_json::json;

use crate::test_utils::{
    ArtifactTree, EchoMiddleware, Journal, TopicRecorder, eventually, root_interface,
};

struct HookedDomain {
    journal: Arc<Journal>,
}

#[async_trait]
impl DomainBehavior for HookedDomain {
    fn register_serializer_types(&self, serializer: &TypeRegistry) -> Result<()> {
        serializer.register_type("tenant", ResourceType::new().with_relationship("owner", "user"))?;
        serializer.register_type("user", ResourceType::new())
    }

    async fn on_load(&self, _interface: &DomainInterface) -> Result<()> {
        self.journal.record_load("tenant-hook");
        Ok(())
    }

    async fn on_unload(&self, _interface: &DomainInterface) -> Result<()> {
        self.journal.record_unload("tenant-hook");
        Ok(())
    }
}

fn hooked_domain(journal: &Arc<Journal>) -> DomainFactory {
    let journal = Arc::clone(journal);
    DomainFactory::new("tenant", move || {
        Box::new(HookedDomain {
            journal: Arc::clone(&journal),
        })
    })
}

#[tokio::test]
async fn domain_scopes_its_own_interface() {
    let tree = ArtifactTree::new();
    let journal = Journal::new();
    let location = tree.artifact_dir("domains/tenant");
    let parent = root_interface(ModuleManifest::new(tree.root()));
    let factory = hooked_domain(&journal);

    factory
        .create_instances(&location, &parent)
        .await
        .expect("load domain");
    let domain = factory.instance(&location).expect("cached instance");

    assert_eq!(domain.state(), LifecycleState::Loaded);
    let interface = domain.interface().expect("loaded interface");
    assert_eq!(interface.ioc_container.domain_path(), "TEST SERVER::TENANT");
    assert!(interface.serializer.contains("tenant"));
    assert!(interface.serializer.dangling_relationships().is_empty());
    assert!(!parent.serializer.contains("tenant"));
    assert_eq!(journal.loads(), 1);

    let manager = domain.manager().expect("manager");
    assert_eq!(manager.state(), LifecycleState::Loaded);
    assert!(manager.is_empty());
}

#[tokio::test]
async fn unload_runs_hooks_once_and_releases_location() {
    let tree = ArtifactTree::new();
    let journal = Journal::new();
    let location = tree.artifact_dir("domains/tenant");
    let parent = root_interface(ModuleManifest::new(tree.root()));
    let factory = hooked_domain(&journal);

    factory.create_instances(&location, &parent).await.expect("load");
    let domain = factory.instance(&location).expect("instance");

    factory
        .destroy_instances(Some(location.as_path()))
        .await
        .expect("unload");
    assert_eq!(domain.state(), LifecycleState::Unloaded);
    assert!(domain.location().is_none());
    assert!(domain.interface().is_none());
    assert_eq!(factory.instance_count(), 0);

    let again = domain.unload().await.expect_err("already unloaded");
    assert!(matches!(
        again,
        Error::Lifecycle { operation: "unload", state: LifecycleState::Unloaded, .. }
    ));
    assert_eq!(journal.unloads(), 1);
}

#[tokio::test]
async fn loading_twice_is_a_lifecycle_error() {
    let tree = ArtifactTree::new();
    let journal = Journal::new();
    let location = tree.artifact_dir("domains/tenant");
    let parent = root_interface(ModuleManifest::new(tree.root()));
    let factory = hooked_domain(&journal);

    factory.create_instances(&location, &parent).await.expect("load");
    let domain = factory.instance(&location).expect("instance");

    let error = domain.load().await.expect_err("second load");
    assert!(matches!(
        error,
        Error::Lifecycle { operation: "load", state: LifecycleState::Loaded, .. }
    ));
    assert_eq!(journal.loads(), 1);
}

#[tokio::test]
async fn bounded_context_scope_path_and_api_registry() {
    let tree = ArtifactTree::new();
    let location = tree.artifact_dir("bounded_contexts/users");
    let parent = root_interface(ModuleManifest::new(tree.root()));
    let factory = BoundedContextFactory::new("users", || Box::new(DefaultBoundedContext));

    factory.create_instances(&location, &parent).await.expect("load");
    let context = factory.instance(&location).expect("instance");

    let manager = context.manager().expect("manager");
    assert_eq!(manager.scope(), "TEST SERVER::USERS");
    let interface = context.interface().expect("interface");
    assert!(Arc::ptr_eq(&interface.ioc_container, &parent.ioc_container));
    assert!(!Arc::ptr_eq(&interface.api_registry, &parent.api_registry));

    factory.destroy_instances(None).await.expect("unload");
    assert_eq!(context.state(), LifecycleState::Unloaded);
}

#[tokio::test]
async fn middleware_registers_and_removes_its_api() {
    let tree = ArtifactTree::new();
    let journal = Journal::new();
    let location = tree.file("middlewares/echo.toml", "");
    let interface = root_interface(ModuleManifest::new(tree.root()));
    let handler_journal = Arc::clone(&journal);
    let factory = MiddlewareFactory::new("echo", move || {
        Box::new(EchoMiddleware {
            api: "echo".to_string(),
            journal: Arc::clone(&handler_journal),
            fail_load: false,
        })
    });

    factory.create_instances(&location, &interface).await.expect("load");
    let reply = interface
        .api_registry
        .execute("echo", json!({ "n": 1 }))
        .await
        .expect("execute");
    assert_eq!(reply, json!({ "echo": { "n": 1 } }));

    factory.destroy_instances(Some(location.as_path())).await.expect("unload");
    assert!(!interface.api_registry.contains("echo"));
    assert_eq!(journal.entries(), vec!["load:echo", "unload:echo"]);
}

#[tokio::test]
async fn failed_middleware_load_is_not_cached() {
    let tree = ArtifactTree::new();
    let journal = Journal::new();
    let location = tree.file("middlewares/echo.toml", "");
    let interface = root_interface(ModuleManifest::new(tree.root()));
    let handler_journal = Arc::clone(&journal);
    let factory = MiddlewareFactory::new("echo", move || {
        Box::new(EchoMiddleware {
            api: "echo".to_string(),
            journal: Arc::clone(&handler_journal),
            fail_load: true,
        })
    });

    assert!(factory.create_instances(&location, &interface).await.is_err());
    assert_eq!(factory.instance_count(), 0);
}

#[tokio::test]
async fn event_handler_tasks_stop_on_unload() {
    let tree = ArtifactTree::new();
    let journal = Journal::new();
    let location = tree.file("event_handlers/audit.toml", "");
    let interface = root_interface(ModuleManifest::new(tree.root()));
    let handler_journal = Arc::clone(&journal);
    let factory = EventHandlerFactory::new("audit", move || {
        Box::new(TopicRecorder {
            name: "audit".to_string(),
            topic: "user.created".to_string(),
            journal: Arc::clone(&handler_journal),
        })
    });

    factory.create_instances(&location, &interface).await.expect("load");
    let handler = factory.instance(&location).expect("instance");
    assert_eq!(handler.task_count(), 1);

    interface
        .event_emitter
        .emit(DomainEvent::new("user.deleted", json!("ignored")));
    interface
        .event_emitter
        .emit(DomainEvent::new("user.created", json!("alice")));
    assert!(eventually(|| journal.position("event:\"alice\"").is_some()).await);
    assert!(journal.position("event:\"ignored\"").is_none());

    factory.destroy_instances(None).await.expect("unload");
    assert!(eventually(|| handler.task_count() == 0).await);
}
