//! Logging and metrics around every store operation.

use crate::{ForwardingStore, ResourceStore};
use async_trait::async_trait;
use cairn_core::{
    CairnResult, Conditions, Patch, Representation, RepresentationPreferences, ResourceIdentifier,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

/// Records each operation's outcome and latency with
/// [`cairn_telemetry::record_store_operation`] and logs failures.
pub struct MonitoringStore {
    source: Arc<dyn ResourceStore>,
}

impl MonitoringStore {
    /// Wraps `source`.
    #[must_use]
    pub fn new(source: Arc<dyn ResourceStore>) -> Self {
        Self { source }
    }
}

async fn observe<T>(
    operation: &'static str,
    identifier: &ResourceIdentifier,
    call: impl Future<Output = CairnResult<T>> + Send,
) -> CairnResult<T> {
    let start = Instant::now();
    let result = call.await;
    let elapsed = start.elapsed();

    match &result {
        Ok(_) => {
            tracing::debug!(
                operation,
                identifier = %identifier,
                duration_ms = elapsed.as_millis(),
                "store operation completed"
            );
            cairn_telemetry::record_store_operation(operation, "ok", elapsed);
        }
        Err(err) => {
            tracing::debug!(
                operation,
                identifier = %identifier,
                duration_ms = elapsed.as_millis(),
                error = %err,
                "store operation failed"
            );
            cairn_telemetry::record_store_operation(operation, err.category().code(), elapsed);
        }
    }
    result
}

#[async_trait]
impl ForwardingStore for MonitoringStore {
    fn source(&self) -> &dyn ResourceStore {
        self.source.as_ref()
    }

    async fn has_resource(&self, identifier: &ResourceIdentifier) -> CairnResult<bool> {
        observe("has_resource", identifier, self.source.has_resource(identifier)).await
    }

    async fn get_representation(
        &self,
        identifier: &ResourceIdentifier,
        preferences: &RepresentationPreferences,
        conditions: Option<&dyn Conditions>,
    ) -> CairnResult<Representation> {
        observe(
            "get_representation",
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
        observe(
            "add_resource",
            container,
            self.source
                .add_resource(container, representation, conditions),
        )
        .await
    }

    async fn delete_resource(
        &self,
        identifier: &ResourceIdentifier,
        conditions: Option<&dyn Conditions>,
    ) -> CairnResult<Vec<ResourceIdentifier>> {
        observe(
            "delete_resource",
            identifier,
            self.source.delete_resource(identifier, conditions),
        )
        .await
    }

    async fn modify_resource(
        &self,
        identifier: &ResourceIdentifier,
        patch: &Patch,
        conditions: Option<&dyn Conditions>,
        preferences: &RepresentationPreferences,
    ) -> CairnResult<Vec<ResourceIdentifier>> {
        observe(
            "modify_resource",
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
        observe(
            "set_representation",
            identifier,
            self.source
                .set_representation(identifier, representation, conditions, preferences),
        )
        .await
    }
}

impl std::fmt::Debug for MonitoringStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonitoringStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryStore;
    use cairn_core::{fixtures, ErrorCategory};

    fn store() -> Arc<dyn ResourceStore> {
        let memory: Arc<dyn ResourceStore> = Arc::new(InMemoryStore::new(fixtures::strategy()));
        Arc::new(MonitoringStore::new(memory))
    }

    #[tokio::test]
    async fn test_results_pass_through_unchanged() {
        let store = store();
        let prefs = RepresentationPreferences::default();
        let id = fixtures::document();

        store
            .set_representation(&id, fixtures::text("hello"), None, &prefs)
            .await
            .unwrap();
        let read = store.get_representation(&id, &prefs, None).await.unwrap();
        assert_eq!(read.text(), Some("hello"));

        let err = store
            .get_representation(&fixtures::id("missing"), &prefs, None)
            .await
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::NotFound);
    }
}
