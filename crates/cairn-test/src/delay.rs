//! A store decorator that stalls after reads.

use async_trait::async_trait;
use cairn_core::{
    CairnResult, Conditions, Representation, RepresentationPreferences, ResourceIdentifier,
};
use cairn_store::{ForwardingStore, ResourceStore};
use std::sync::Arc;
use std::time::Duration;

/// Sleeps for a fixed delay after every `get_representation`, whatever its
/// outcome. Other calls pass straight through.
///
/// Widens the gap between a read-modify-write's read and its write so other
/// tasks can interleave.
pub struct DelayedStore {
    source: Arc<dyn ResourceStore>,
    delay: Duration,
}

impl DelayedStore {
    /// Wraps `source`.
    #[must_use]
    pub fn new(source: Arc<dyn ResourceStore>, delay: Duration) -> Self {
        Self { source, delay }
    }
}

#[async_trait]
impl ForwardingStore for DelayedStore {
    fn source(&self) -> &dyn ResourceStore {
        self.source.as_ref()
    }

    async fn get_representation(
        &self,
        identifier: &ResourceIdentifier,
        preferences: &RepresentationPreferences,
        conditions: Option<&dyn Conditions>,
    ) -> CairnResult<Representation> {
        let result = self
            .source
            .get_representation(identifier, preferences, conditions)
            .await;
        tokio::time::sleep(self.delay).await;
        result
    }
}

impl std::fmt::Debug for DelayedStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DelayedStore")
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cairn_core::fixtures;
    use cairn_store::InMemoryStore;

    #[tokio::test]
    async fn test_reads_are_delayed() {
        let memory: Arc<dyn ResourceStore> = Arc::new(InMemoryStore::new(fixtures::strategy()));
        let store = DelayedStore::new(memory, Duration::from_millis(20));

        let start = tokio::time::Instant::now();
        let missing = ResourceStore::get_representation(
            &store,
            &fixtures::document(),
            &RepresentationPreferences::default(),
            None,
        )
        .await;

        assert!(missing.unwrap_err().is_not_found());
        assert!(start.elapsed() >= Duration::from_millis(20));
    }
}
