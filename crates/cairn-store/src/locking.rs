//! Per-identifier locking.
//!
//! [`LockingStore`] serializes operations on the same identifier: reads share
//! a read lock, mutations take the write lock of their target (`add_resource`
//! locks the container). Wrapped around a [`PatchingStore`](crate::PatchingStore)
//! it makes the read-patch-write sequence linearizable per identifier.
//!
//! Locks live in a [`DashMap`] and are dropped once no operation holds them.

use crate::{ForwardingStore, ResourceStore};
use async_trait::async_trait;
use cairn_core::{
    CairnResult, Conditions, Patch, Representation, RepresentationPreferences, ResourceIdentifier,
};
use dashmap::DashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Serializes access per identifier.
pub struct LockingStore {
    source: Arc<dyn ResourceStore>,
    locks: DashMap<ResourceIdentifier, Arc<RwLock<()>>>,
}

impl LockingStore {
    /// Wraps `source`.
    #[must_use]
    pub fn new(source: Arc<dyn ResourceStore>) -> Self {
        Self {
            source,
            locks: DashMap::new(),
        }
    }

    /// Number of identifiers with a live lock.
    #[must_use]
    pub fn active_locks(&self) -> usize {
        self.locks.len()
    }

    fn lock_for(&self, identifier: &ResourceIdentifier) -> Arc<RwLock<()>> {
        // The map reference must not outlive this call.
        Arc::clone(
            self.locks
                .entry(identifier.clone())
                .or_insert_with(|| Arc::new(RwLock::new(())))
                .value(),
        )
    }

    fn release(&self, identifier: &ResourceIdentifier) {
        self.locks
            .remove_if(identifier, |_, lock| Arc::strong_count(lock) == 1);
    }

    async fn shared<T>(
        &self,
        identifier: &ResourceIdentifier,
        operation: impl Future<Output = T> + Send,
    ) -> T {
        let lock = self.lock_for(identifier);
        let result = {
            let _guard = lock.read().await;
            tracing::trace!(identifier = %identifier, "acquired read lock");
            operation.await
        };
        drop(lock);
        self.release(identifier);
        result
    }

    async fn exclusive<T>(
        &self,
        identifier: &ResourceIdentifier,
        operation: impl Future<Output = T> + Send,
    ) -> T {
        let lock = self.lock_for(identifier);
        let result = {
            let _guard = lock.write().await;
            tracing::trace!(identifier = %identifier, "acquired write lock");
            operation.await
        };
        drop(lock);
        self.release(identifier);
        result
    }
}

#[async_trait]
impl ForwardingStore for LockingStore {
    fn source(&self) -> &dyn ResourceStore {
        self.source.as_ref()
    }

    async fn has_resource(&self, identifier: &ResourceIdentifier) -> CairnResult<bool> {
        self.shared(identifier, self.source.has_resource(identifier))
            .await
    }

    async fn get_representation(
        &self,
        identifier: &ResourceIdentifier,
        preferences: &RepresentationPreferences,
        conditions: Option<&dyn Conditions>,
    ) -> CairnResult<Representation> {
        self.shared(
            identifier,
            self.source
                .get_representation(identifier, preferences, conditions),
        )
        .await
    }

    async fn add_resource(
        &self,
        container: &ResourceIdentifier,
        representation: Representation,
        conditions: Option<&dyn Conditions>,
    ) -> CairnResult<ResourceIdentifier> {
        self.exclusive(
            container,
            self.source.add_resource(container, representation, conditions),
        )
        .await
    }

    async fn delete_resource(
        &self,
        identifier: &ResourceIdentifier,
        conditions: Option<&dyn Conditions>,
    ) -> CairnResult<Vec<ResourceIdentifier>> {
        self.exclusive(identifier, self.source.delete_resource(identifier, conditions))
            .await
    }

    async fn modify_resource(
        &self,
        identifier: &ResourceIdentifier,
        patch: &Patch,
        conditions: Option<&dyn Conditions>,
        preferences: &RepresentationPreferences,
    ) -> CairnResult<Vec<ResourceIdentifier>> {
        self.exclusive(
            identifier,
            self.source
                .modify_resource(identifier, patch, conditions, preferences),
        )
        .await
    }

    async fn set_representation(
        &self,
        identifier: &ResourceIdentifier,
        representation: Representation,
        conditions: Option<&dyn Conditions>,
        preferences: &RepresentationPreferences,
    ) -> CairnResult<Vec<ResourceIdentifier>> {
        self.exclusive(
            identifier,
            self.source
                .set_representation(identifier, representation, conditions, preferences),
        )
        .await
    }
}

impl std::fmt::Debug for LockingStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockingStore")
            .field("active_locks", &self.locks.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryStore;
    use cairn_core::fixtures;

    #[tokio::test]
    async fn test_locks_are_released() {
        let locking = Arc::new(LockingStore::new(Arc::new(InMemoryStore::new(
            fixtures::strategy(),
        ))));
        let store: Arc<dyn ResourceStore> = locking.clone();

        store
            .set_representation(
                &fixtures::document(),
                fixtures::text("x"),
                None,
                &RepresentationPreferences::default(),
            )
            .await
            .unwrap();
        store.has_resource(&fixtures::document()).await.unwrap();

        assert_eq!(locking.active_locks(), 0);
    }

    #[tokio::test]
    async fn test_errors_pass_through_unchanged() {
        let store: Arc<dyn ResourceStore> = Arc::new(LockingStore::new(Arc::new(
            InMemoryStore::new(fixtures::strategy()),
        )));
        let err = store
            .get_representation(&fixtures::document(), &RepresentationPreferences::default(), None)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
