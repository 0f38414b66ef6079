//! A store decorator that remembers every call.

use async_trait::async_trait;
use cairn_core::{
    CairnResult, Conditions, Patch, Representation, RepresentationPreferences, ResourceIdentifier,
};
use cairn_store::{ForwardingStore, ResourceStore};
use parking_lot::Mutex;
use std::sync::Arc;

/// One recorded store call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    /// `has_resource(identifier)`
    HasResource(ResourceIdentifier),
    /// `get_representation(identifier, ..)`
    GetRepresentation(ResourceIdentifier),
    /// `add_resource(container, ..)`
    AddResource(ResourceIdentifier),
    /// `delete_resource(identifier, ..)`
    DeleteResource(ResourceIdentifier),
    /// `modify_resource(identifier, ..)`
    ModifyResource(ResourceIdentifier),
    /// `set_representation(identifier, ..)`
    SetRepresentation(ResourceIdentifier),
}

impl StoreCall {
    /// The operation name, matching the [`ResourceStore`] method.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::HasResource(_) => "has_resource",
            Self::GetRepresentation(_) => "get_representation",
            Self::AddResource(_) => "add_resource",
            Self::DeleteResource(_) => "delete_resource",
            Self::ModifyResource(_) => "modify_resource",
            Self::SetRepresentation(_) => "set_representation",
        }
    }
}

/// Records calls, then forwards them unchanged.
///
/// ```rust,ignore
/// let recording = Arc::new(RecordingStore::new(memory));
/// let store = PatchingStore::new(recording.clone(), patcher);
/// // ...
/// assert_eq!(recording.count("set_representation"), 0);
/// ```
pub struct RecordingStore {
    source: Arc<dyn ResourceStore>,
    calls: Mutex<Vec<StoreCall>>,
}

impl RecordingStore {
    /// Wraps `source`.
    #[must_use]
    pub fn new(source: Arc<dyn ResourceStore>) -> Self {
        Self {
            source,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// All calls so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().clone()
    }

    /// Number of calls to the method called `name`.
    #[must_use]
    pub fn count(&self, name: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| call.name() == name)
            .count()
    }

    /// Forgets recorded calls.
    pub fn clear(&self) {
        self.calls.lock().clear();
    }

    fn record(&self, call: StoreCall) {
        self.calls.lock().push(call);
    }
}

#[async_trait]
impl ForwardingStore for RecordingStore {
    fn source(&self) -> &dyn ResourceStore {
        self.source.as_ref()
    }

    async fn has_resource(&self, identifier: &ResourceIdentifier) -> CairnResult<bool> {
        self.record(StoreCall::HasResource(identifier.clone()));
        self.source.has_resource(identifier).await
    }

    async fn get_representation(
        &self,
        identifier: &ResourceIdentifier,
        preferences: &RepresentationPreferences,
        conditions: Option<&dyn Conditions>,
    ) -> CairnResult<Representation> {
        self.record(StoreCall::GetRepresentation(identifier.clone()));
        self.source
            .get_representation(identifier, preferences, conditions)
            .await
    }

    async fn add_resource(
        &self,
        container: &ResourceIdentifier,
        representation: Representation,
        conditions: Option<&dyn Conditions>,
    ) -> CairnResult<ResourceIdentifier> {
        self.record(StoreCall::AddResource(container.clone()));
        self.source
            .add_resource(container, representation, conditions)
            .await
    }

    async fn delete_resource(
        &self,
        identifier: &ResourceIdentifier,
        conditions: Option<&dyn Conditions>,
    ) -> CairnResult<Vec<ResourceIdentifier>> {
        self.record(StoreCall::DeleteResource(identifier.clone()));
        self.source.delete_resource(identifier, conditions).await
    }

    async fn modify_resource(
        &self,
        identifier: &ResourceIdentifier,
        patch: &Patch,
        conditions: Option<&dyn Conditions>,
        preferences: &RepresentationPreferences,
    ) -> CairnResult<Vec<ResourceIdentifier>> {
        self.record(StoreCall::ModifyResource(identifier.clone()));
        self.source
            .modify_resource(identifier, patch, conditions, preferences)
            .await
    }

    async fn set_representation(
        &self,
        identifier: &ResourceIdentifier,
        representation: Representation,
        conditions: Option<&dyn Conditions>,
        preferences: &RepresentationPreferences,
    ) -> CairnResult<Vec<ResourceIdentifier>> {
        self.record(StoreCall::SetRepresentation(identifier.clone()));
        self.source
            .set_representation(identifier, representation, conditions, preferences)
            .await
    }
}

impl std::fmt::Debug for RecordingStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingStore")
            .field("calls", &self.calls.lock().len())
            .finish_non_exhaustive()
    }
}
