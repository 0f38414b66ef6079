//! The patcher contract.

use async_trait::async_trait;
use cairn_core::{CairnResult, Patch, Representation, ResourceIdentifier};
use std::sync::Arc;

/// Everything a patcher needs to compute a new representation.
#[derive(Debug, Clone)]
pub struct PatcherInput {
    /// The resource being patched.
    pub identifier: ResourceIdentifier,
    /// The patch, exactly as received.
    pub patch: Patch,
    /// The current representation, or `None` when the patch must create it.
    pub representation: Option<Representation>,
}

/// Computes a new representation from an old one (or none) and a patch.
///
/// Patchers are pure: they never touch a store. The [`PatchHandler`](crate::PatchHandler)
/// commits whatever [`handle`](Self::handle) returns.
#[async_trait]
pub trait RepresentationPatcher: Send + Sync {
    /// Succeeds if this patcher understands `input`.
    ///
    /// # Errors
    ///
    /// `Validation` naming why the patch or representation is unsupported.
    async fn can_handle(&self, input: &PatcherInput) -> CairnResult<()>;

    /// Applies the patch.
    async fn handle(&self, input: PatcherInput) -> CairnResult<Representation>;

    /// Checks [`can_handle`](Self::can_handle), then applies.
    async fn handle_safe(&self, input: PatcherInput) -> CairnResult<Representation> {
        self.can_handle(&input).await?;
        self.handle(input).await
    }
}

#[async_trait]
impl<T: RepresentationPatcher + ?Sized> RepresentationPatcher for Arc<T> {
    async fn can_handle(&self, input: &PatcherInput) -> CairnResult<()> {
        (**self).can_handle(input).await
    }

    async fn handle(&self, input: PatcherInput) -> CairnResult<Representation> {
        (**self).handle(input).await
    }
}
