//! Patchers with scripted behavior.

use async_trait::async_trait;
use cairn_core::{CairnError, CairnResult, Representation};
use cairn_store::{PatcherInput, RepresentationPatcher};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Accepts every patch and then fails to apply it.
#[derive(Debug, Default)]
pub struct FailingPatcher {
    attempts: AtomicUsize,
}

impl FailingPatcher {
    /// Creates the patcher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times `handle` ran.
    #[must_use]
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RepresentationPatcher for FailingPatcher {
    async fn can_handle(&self, _input: &PatcherInput) -> CairnResult<()> {
        Ok(())
    }

    async fn handle(&self, input: PatcherInput) -> CairnResult<Representation> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(CairnError::internal(format!(
            "patch of '{}' failed",
            input.identifier
        )))
    }
}
