//! Decorator base.
//!
//! A decorator implements [`ForwardingStore`] by naming its wrapped store in
//! [`ForwardingStore::source`]. Every operation it does not override is
//! forwarded with the same arguments and returns the source's result
//! unmodified. A blanket impl makes every `ForwardingStore` a
//! [`ResourceStore`].
//!
//! ```text
//! MonitoringStore ─▶ LockingStore ─▶ PatchingStore ─▶ ValidatingStore ─▶ InMemoryStore
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use cairn_store::{ForwardingStore, ResourceStore};
//!
//! struct ReadOnlyStore {
//!     source: Arc<dyn ResourceStore>,
//! }
//!
//! #[async_trait]
//! impl ForwardingStore for ReadOnlyStore {
//!     fn source(&self) -> &dyn ResourceStore {
//!         self.source.as_ref()
//!     }
//!
//!     async fn delete_resource(
//!         &self,
//!         identifier: &ResourceIdentifier,
//!         _conditions: Option<&dyn Conditions>,
//!     ) -> CairnResult<Vec<ResourceIdentifier>> {
//!         Err(CairnError::forbidden(format!("{identifier} is read-only")))
//!     }
//! }
//! ```

use crate::ResourceStore;
use async_trait::async_trait;
use cairn_core::{
    CairnResult, Conditions, Patch, Representation, RepresentationPreferences, ResourceIdentifier,
};
use std::sync::Arc;

/// A store that wraps one other store and forwards by default.
#[async_trait]
pub trait ForwardingStore: Send + Sync {
    /// The wrapped store.
    fn source(&self) -> &dyn ResourceStore;

    /// Forwards to the source.
    async fn has_resource(&self, identifier: &ResourceIdentifier) -> CairnResult<bool> {
        self.source().has_resource(identifier).await
    }

    /// Forwards to the source.
    async fn get_representation(
        &self,
        identifier: &ResourceIdentifier,
        preferences: &RepresentationPreferences,
        conditions: Option<&dyn Conditions>,
    ) -> CairnResult<Representation> {
        self.source()
            .get_representation(identifier, preferences, conditions)
            .await
    }

    /// Forwards to the source.
    async fn add_resource(
        &self,
        container: &ResourceIdentifier,
        representation: Representation,
        conditions: Option<&dyn Conditions>,
    ) -> CairnResult<ResourceIdentifier> {
        self.source()
            .add_resource(container, representation, conditions)
            .await
    }

    /// Forwards to the source.
    async fn delete_resource(
        &self,
        identifier: &ResourceIdentifier,
        conditions: Option<&dyn Conditions>,
    ) -> CairnResult<Vec<ResourceIdentifier>> {
        self.source().delete_resource(identifier, conditions).await
    }

    /// Forwards to the source.
    async fn modify_resource(
        &self,
        identifier: &ResourceIdentifier,
        patch: &Patch,
        conditions: Option<&dyn Conditions>,
        preferences: &RepresentationPreferences,
    ) -> CairnResult<Vec<ResourceIdentifier>> {
        self.source()
            .modify_resource(identifier, patch, conditions, preferences)
            .await
    }

    /// Forwards to the source.
    async fn set_representation(
        &self,
        identifier: &ResourceIdentifier,
        representation: Representation,
        conditions: Option<&dyn Conditions>,
        preferences: &RepresentationPreferences,
    ) -> CairnResult<Vec<ResourceIdentifier>> {
        self.source()
            .set_representation(identifier, representation, conditions, preferences)
            .await
    }
}

#[async_trait]
impl<T: ForwardingStore> ResourceStore for T {
    async fn has_resource(&self, identifier: &ResourceIdentifier) -> CairnResult<bool> {
        ForwardingStore::has_resource(self, identifier).await
    }

    async fn get_representation(
        &self,
        identifier: &ResourceIdentifier,
        preferences: &RepresentationPreferences,
        conditions: Option<&dyn Conditions>,
    ) -> CairnResult<Representation> {
        ForwardingStore::get_representation(self, identifier, preferences, conditions).await
    }

    async fn add_resource(
        &self,
        container: &ResourceIdentifier,
        representation: Representation,
        conditions: Option<&dyn Conditions>,
    ) -> CairnResult<ResourceIdentifier> {
        ForwardingStore::add_resource(self, container, representation, conditions).await
    }

    async fn delete_resource(
        &self,
        identifier: &ResourceIdentifier,
        conditions: Option<&dyn Conditions>,
    ) -> CairnResult<Vec<ResourceIdentifier>> {
        ForwardingStore::delete_resource(self, identifier, conditions).await
    }

    async fn modify_resource(
        &self,
        identifier: &ResourceIdentifier,
        patch: &Patch,
        conditions: Option<&dyn Conditions>,
        preferences: &RepresentationPreferences,
    ) -> CairnResult<Vec<ResourceIdentifier>> {
        ForwardingStore::modify_resource(self, identifier, patch, conditions, preferences).await
    }

    async fn set_representation(
        &self,
        identifier: &ResourceIdentifier,
        representation: Representation,
        conditions: Option<&dyn Conditions>,
        preferences: &RepresentationPreferences,
    ) -> CairnResult<Vec<ResourceIdentifier>> {
        ForwardingStore::set_representation(self, identifier, representation, conditions, preferences)
            .await
    }
}

/// A decorator that overrides nothing.
pub struct PassthroughStore {
    source: Arc<dyn ResourceStore>,
}

impl PassthroughStore {
    /// Wraps `source`.
    #[must_use]
    pub fn new(source: Arc<dyn ResourceStore>) -> Self {
        Self { source }
    }
}

impl ForwardingStore for PassthroughStore {
    fn source(&self) -> &dyn ResourceStore {
        self.source.as_ref()
    }
}

impl std::fmt::Debug for PassthroughStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PassthroughStore").finish_non_exhaustive()
    }
}
