//! The storage interface.
//!
//! [`ResourceStore`] is the boundary between request handling and storage.
//! Concrete backends and decorators implement it; decorators wrap exactly one
//! other store (see [`ForwardingStore`](crate::ForwardingStore)).
//!
//! # Conditions
//!
//! Every mutating operation accepts optional [`Conditions`]. An
//! implementation evaluates them against the target's current metadata
//! (`None` when absent) and applies the mutation in one atomic step with
//! respect to other mutations on the same identifier. A violated condition
//! fails with `PreconditionFailed` and leaves the store unchanged.
//!
//! # Affected identifiers
//!
//! Mutations return every identifier whose stored state changed: the target
//! plus any container whose containment listing changed.

use async_trait::async_trait;
use cairn_core::{
    CairnResult, Conditions, Patch, Representation, RepresentationPreferences, ResourceIdentifier,
};

/// The storage interface.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Returns `true` if `identifier` exists.
    async fn has_resource(&self, identifier: &ResourceIdentifier) -> CairnResult<bool>;

    /// Returns the current representation of `identifier`.
    ///
    /// # Errors
    ///
    /// `NotFound` if absent; `PreconditionFailed` if `conditions` are violated,
    /// before any data is returned.
    async fn get_representation(
        &self,
        identifier: &ResourceIdentifier,
        preferences: &RepresentationPreferences,
        conditions: Option<&dyn Conditions>,
    ) -> CairnResult<Representation>;

    /// Creates a new child of `container` and returns its server-assigned identifier.
    async fn add_resource(
        &self,
        container: &ResourceIdentifier,
        representation: Representation,
        conditions: Option<&dyn Conditions>,
    ) -> CairnResult<ResourceIdentifier>;

    /// Deletes `identifier`.
    async fn delete_resource(
        &self,
        identifier: &ResourceIdentifier,
        conditions: Option<&dyn Conditions>,
    ) -> CairnResult<Vec<ResourceIdentifier>>;

    /// Applies `patch` to `identifier`.
    async fn modify_resource(
        &self,
        identifier: &ResourceIdentifier,
        patch: &Patch,
        conditions: Option<&dyn Conditions>,
        preferences: &RepresentationPreferences,
    ) -> CairnResult<Vec<ResourceIdentifier>>;

    /// Replaces or creates `identifier`.
    async fn set_representation(
        &self,
        identifier: &ResourceIdentifier,
        representation: Representation,
        conditions: Option<&dyn Conditions>,
        preferences: &RepresentationPreferences,
    ) -> CairnResult<Vec<ResourceIdentifier>>;
}
