//! Tests for the singleton registry

use std::sync::Arc;
use std::time::Duration;

use evas_domain::InstanceKey;
use evas_infrastructure::di::SingletonRegistry;
use futures::future::join_all;
use tokio::sync::oneshot;

use crate::test_utils::{Counted, Journal};

fn key(text: &str) -> InstanceKey {
    InstanceKey::from(text)
}

#[tokio::test]
async fn same_key_returns_same_instance_and_loads_once() {
    let journal = Journal::new();
    let registry: SingletonRegistry<Counted> = SingletonRegistry::new("counted");

    let first = registry
        .get_or_create(key("a"), || async { Ok(Arc::new(Counted::new("a", &journal))) })
        .await
        .expect("first create");
    let second = registry
        .get_or_create(key("a"), || async { Ok(Arc::new(Counted::new("a", &journal))) })
        .await
        .expect("second create");

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(journal.loads(), 1);
    assert_eq!(registry.len(), 1);
}

#[tokio::test]
async fn different_keys_get_different_instances() {
    let journal = Journal::new();
    let registry: SingletonRegistry<Counted> = SingletonRegistry::new("counted");

    let a = registry
        .get_or_create(key("a"), || async { Ok(Arc::new(Counted::new("a", &journal))) })
        .await
        .expect("create a");
    let b = registry
        .get_or_create(key("b"), || async { Ok(Arc::new(Counted::new("b", &journal))) })
        .await
        .expect("create b");

    assert!(!Arc::ptr_eq(&a, &b));
    assert_eq!(registry.len(), 2);
    assert!(registry.contains(&key("a")));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_first_creation_loads_once() {
    let journal = Journal::new();
    let registry = Arc::new(SingletonRegistry::<Counted>::new("counted"));

    let calls = (0..16).map(|_| {
        let registry = Arc::clone(&registry);
        let journal = Arc::clone(&journal);
        tokio::spawn(async move {
            registry
                .get_or_create(key("shared"), || async move {
                    Ok(Arc::new(Counted::new("shared", &journal)))
                })
                .await
        })
    });
    let instances: Vec<Arc<Counted>> = join_all(calls)
        .await
        .into_iter()
        .map(|joined| joined.expect("task").expect("create"))
        .collect();

    assert_eq!(journal.loads(), 1);
    assert!(instances.iter().all(|i| Arc::ptr_eq(i, &instances[0])));
}

#[tokio::test]
async fn failed_load_caches_nothing_and_retry_succeeds() {
    let journal = Journal::new();
    let registry: SingletonRegistry<Counted> = SingletonRegistry::new("counted");

    let failed = registry
        .get_or_create(key("a"), || async {
            Ok(Arc::new(Counted::new("a", &journal).failing_load()))
        })
        .await;
    assert!(failed.is_err());
    assert!(registry.is_empty());

    registry
        .get_or_create(key("a"), || async { Ok(Arc::new(Counted::new("a", &journal))) })
        .await
        .expect("retry");
    assert_eq!(journal.loads(), 2);
    assert_eq!(registry.len(), 1);
}

#[tokio::test]
async fn destroy_unknown_key_is_noop() {
    let registry: SingletonRegistry<Counted> = SingletonRegistry::new("counted");
    registry.destroy(&key("missing")).await.expect("no-op");
}

#[tokio::test]
async fn destroy_evicts_even_when_unload_fails() {
    let journal = Journal::new();
    let registry: SingletonRegistry<Counted> = SingletonRegistry::new("counted");
    registry
        .get_or_create(key("a"), || async {
            Ok(Arc::new(Counted::new("a", &journal).failing_unload()))
        })
        .await
        .expect("create");

    assert!(registry.destroy(&key("a")).await.is_err());
    assert!(registry.is_empty());
    assert_eq!(journal.unloads(), 1);
}

#[tokio::test]
async fn destroy_all_aggregates_failures_and_empties_registry() {
    let journal = Journal::new();
    let registry: SingletonRegistry<Counted> = SingletonRegistry::new("counted");
    for (name, fails) in [("a", true), ("b", false), ("c", true)] {
        registry
            .get_or_create(key(name), || async {
                let counted = Counted::new(name, &journal);
                Ok(Arc::new(if fails { counted.failing_unload() } else { counted }))
            })
            .await
            .expect("create");
    }

    let error = registry.destroy_all().await.expect_err("two unloads fail");
    assert!(error.is_aggregate());
    assert_eq!(error.causes().len(), 2);
    assert_eq!(journal.unloads(), 3);
    assert!(registry.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn destroy_all_waits_for_in_flight_creation() {
    let journal = Journal::new();
    let registry = Arc::new(SingletonRegistry::<Counted>::new("counted"));
    let (started_tx, started_rx) = oneshot::channel();
    let (release_tx, release_rx) = oneshot::channel::<()>();

    let creating = {
        let registry = Arc::clone(&registry);
        let journal = Arc::clone(&journal);
        tokio::spawn(async move {
            registry
                .get_or_create(key("slow"), || async move {
                    let _ = started_tx.send(());
                    let _ = release_rx.await;
                    Ok(Arc::new(Counted::new("slow", &journal)))
                })
                .await
        })
    };
    started_rx.await.expect("creation started");

    let destroying = {
        let registry = Arc::clone(&registry);
        tokio::spawn(async move { registry.destroy_all().await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!destroying.is_finished());

    release_tx.send(()).expect("release creation");
    creating.await.expect("task").expect("create");
    destroying.await.expect("task").expect("destroy all");

    assert!(registry.is_empty());
    assert_eq!(journal.loads(), 1);
    assert_eq!(journal.unloads(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn destroy_after_destroy_all_still_serializes_with_creation() {
    let journal = Journal::new();
    let registry = Arc::new(SingletonRegistry::<Counted>::new("counted"));
    registry
        .get_or_create(key("a"), || async { Ok(Arc::new(Counted::new("a", &journal))) })
        .await
        .expect("create");
    registry.destroy_all().await.expect("destroy all");

    let calls = (0..8).map(|_| {
        let registry = Arc::clone(&registry);
        let journal = Arc::clone(&journal);
        tokio::spawn(async move {
            registry
                .get_or_create(key("a"), || async move {
                    Ok(Arc::new(Counted::new("a", &journal)))
                })
                .await
        })
    });
    for joined in join_all(calls).await {
        joined.expect("task").expect("recreate");
    }
    registry.destroy(&key("a")).await.expect("destroy");

    assert!(registry.is_empty());
    assert_eq!(journal.loads(), 2);
    assert_eq!(journal.unloads(), 2);
}
