//! First-match patcher selection.

use super::{PatcherInput, RepresentationPatcher};
use async_trait::async_trait;
use cairn_core::{CairnError, CairnResult, Representation};
use std::sync::Arc;

/// Delegates to the first patcher whose `can_handle` succeeds.
#[derive(Clone, Default)]
pub struct WaterfallPatcher {
    patchers: Vec<Arc<dyn RepresentationPatcher>>,
}

impl WaterfallPatcher {
    /// Creates a waterfall over `patchers`, tried in order.
    #[must_use]
    pub fn new(patchers: Vec<Arc<dyn RepresentationPatcher>>) -> Self {
        Self { patchers }
    }

    /// Appends a patcher.
    #[must_use]
    pub fn with(mut self, patcher: impl RepresentationPatcher + 'static) -> Self {
        self.patchers.push(Arc::new(patcher));
        self
    }

    async fn select(&self, input: &PatcherInput) -> CairnResult<&Arc<dyn RepresentationPatcher>> {
        let mut reasons = Vec::new();
        for patcher in &self.patchers {
            match patcher.can_handle(input).await {
                Ok(()) => return Ok(patcher),
                Err(error) => reasons.push(error.to_string()),
            }
        }
        Err(CairnError::validation(format!(
            "no patcher supports a {} patch on '{}'{}",
            input.patch.dialect(),
            input.identifier,
            if reasons.is_empty() {
                String::new()
            } else {
                format!(": {}", reasons.join("; "))
            }
        )))
    }
}

#[async_trait]
impl RepresentationPatcher for WaterfallPatcher {
    async fn can_handle(&self, input: &PatcherInput) -> CairnResult<()> {
        self.select(input).await.map(|_| ())
    }

    async fn handle(&self, input: PatcherInput) -> CairnResult<Representation> {
        let patcher = self.select(&input).await?;
        patcher.handle(input).await
    }
}

impl std::fmt::Debug for WaterfallPatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WaterfallPatcher")
            .field("patchers", &self.patchers.len())
            .finish()
    }
}
