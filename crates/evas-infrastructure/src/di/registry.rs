//! Memoizing singleton registry
//!
//! Every factory in the runtime keeps its instances in one of these. The first
//! caller for a key constructs and loads the instance; later callers get the
//! cached `Arc`. Concurrent first-time callers for the same key are serialized
//! by a per-key async lock so exactly one instance is built and loaded.
//! Destruction takes the same lock, so it waits for an in-flight creation of
//! its key and evicts what that creation cached.

use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;
use evas_domain::error::{AggregateError, Error, Result};
use evas_domain::{InstanceKey, Lifecycle};
use futures::future::join_all;
use tokio::sync::Mutex;
use tracing::debug;

/// Per-key cache of loaded instances
pub struct SingletonRegistry<A: ?Sized + Lifecycle> {
    label: String,
    instances: DashMap<InstanceKey, Arc<A>>,
    creation_locks: DashMap<InstanceKey, Arc<Mutex<()>>>,
}

impl<A: ?Sized + Lifecycle> SingletonRegistry<A> {
    /// Create an empty registry; `label` names the owner in error messages
    pub fn new<S: Into<String>>(label: S) -> Self {
        Self {
            label: label.into(),
            instances: DashMap::new(),
            creation_locks: DashMap::new(),
        }
    }

    /// Cached instance for `key`, if loaded
    pub fn get(&self, key: &InstanceKey) -> Option<Arc<A>> {
        self.instances.get(key).map(|entry| Arc::clone(entry.value()))
    }

    /// Return the cached instance or construct, load and cache a new one
    ///
    /// Nothing is cached when construction or `load` fails.
    pub async fn get_or_create<F, Fut>(&self, key: InstanceKey, construct: F) -> Result<Arc<A>>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<Arc<A>>> + Send,
    {
        if let Some(existing) = self.get(&key) {
            return Ok(existing);
        }

        let lock = self.creation_lock(&key);
        let _guard = lock.lock().await;

        // Another caller may have finished while we waited
        if let Some(existing) = self.get(&key) {
            return Ok(existing);
        }

        let instance = construct().await?;
        instance.load().await?;
        self.instances.insert(key.clone(), Arc::clone(&instance));
        debug!(registry = %self.label, key = %key, "instance created");
        Ok(instance)
    }

    /// Evict and unload the instance for `key`; unknown keys are a no-op
    ///
    /// The entry is evicted even when `unload` fails.
    pub async fn destroy(&self, key: &InstanceKey) -> Result<()> {
        let lock = self.creation_lock(key);
        let _guard = lock.lock().await;
        let Some((_, instance)) = self.instances.remove(key) else {
            return Ok(());
        };
        debug!(registry = %self.label, key = %key, "instance destroyed");
        instance.unload().await
    }

    /// Evict every instance and unload them concurrently
    ///
    /// The registry is always empty afterwards; unload failures are combined
    /// into one aggregate error.
    pub async fn destroy_all(&self) -> Result<()> {
        // Every cached key has a lock; in-flight creations hold theirs
        let locks: Vec<Arc<Mutex<()>>> = self
            .creation_locks
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        let mut guards = Vec::with_capacity(locks.len());
        for lock in locks {
            guards.push(lock.lock_owned().await);
        }

        let keys: Vec<InstanceKey> = self.instances.iter().map(|e| e.key().clone()).collect();
        let taken: Vec<Arc<A>> = keys
            .iter()
            .filter_map(|key| self.instances.remove(key).map(|(_, instance)| instance))
            .collect();

        let results = join_all(taken.iter().map(|instance| instance.unload())).await;
        drop(guards);
        let causes: Vec<Error> = results.into_iter().filter_map(Result::err).collect();
        AggregateError::check(format!("Errors destroying {} instances", self.label), causes)
    }

    /// True when an instance is cached for `key`
    pub fn contains(&self, key: &InstanceKey) -> bool {
        self.instances.contains_key(key)
    }

    /// Number of cached instances
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// True when nothing is cached
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    fn creation_lock(&self, key: &InstanceKey) -> Arc<Mutex<()>> {
        Arc::clone(
            self.creation_locks
                .entry(key.clone())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .value(),
        )
    }

    /// Keys of every cached instance
    pub fn keys(&self) -> Vec<InstanceKey> {
        self.instances.iter().map(|e| e.key().clone()).collect()
    }
}

impl<A: ?Sized + Lifecycle> std::fmt::Debug for SingletonRegistry<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SingletonRegistry")
            .field("label", &self.label)
            .field("instances", &self.instances.len())
            .finish()
    }
}
