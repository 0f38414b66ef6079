//! Routes `modify_resource` through the patch protocol.

use crate::patch::{PatchHandler, RepresentationPatcher};
use crate::{ForwardingStore, ResourceStore};
use async_trait::async_trait;
use cairn_core::{CairnResult, Conditions, Patch, RepresentationPreferences, ResourceIdentifier};
use std::sync::Arc;

/// Overrides `modify_resource` with a [`PatchHandler`] over the same source.
/// Every other operation is forwarded.
pub struct PatchingStore {
    source: Arc<dyn ResourceStore>,
    handler: PatchHandler,
}

impl PatchingStore {
    /// Wraps `source`, patching with `patcher`.
    #[must_use]
    pub fn new(source: Arc<dyn ResourceStore>, patcher: Arc<dyn RepresentationPatcher>) -> Self {
        let handler = PatchHandler::new(Arc::clone(&source), patcher);
        Self { source, handler }
    }
}

#[async_trait]
impl ForwardingStore for PatchingStore {
    fn source(&self) -> &dyn ResourceStore {
        self.source.as_ref()
    }

    async fn modify_resource(
        &self,
        identifier: &ResourceIdentifier,
        patch: &Patch,
        conditions: Option<&dyn Conditions>,
        preferences: &RepresentationPreferences,
    ) -> CairnResult<Vec<ResourceIdentifier>> {
        self.handler
            .handle(identifier, patch, conditions, preferences)
            .await
    }
}

impl std::fmt::Debug for PatchingStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatchingStore")
            .field("handler", &self.handler)
            .finish_non_exhaustive()
    }
}
