//! Read-patch-write against a store.

use super::{PatcherInput, RepresentationPatcher};
use crate::ResourceStore;
use cairn_core::{
    BasicConditions, CairnError, CairnResult, Conditions, ErrorCategory, Patch, Representation,
    RepresentationPreferences, ResourceIdentifier,
};
use std::sync::Arc;

/// Turns a patch into a committed representation change.
///
/// 1. Reads the current representation from the source. `NotFound` means the
///    patch must create the resource; any other error stops here.
/// 2. Checks `conditions` against what was read (`None` if absent).
/// 3. Asks the patcher for the new representation.
/// 4. Commits it with `set_representation`, conditioned on the state read in
///    step 1: the same revision if the target existed, absence otherwise.
///
/// If step 1, 2 or 3 fails, step 4 never runs. If another writer changed the
/// target after step 1, step 4 fails with `PreconditionFailed` and nothing is
/// written. Wrapping the owning [`PatchingStore`](crate::PatchingStore) in a
/// [`LockingStore`](crate::LockingStore) serializes patches on one identifier
/// so that they do not fail this way.
#[derive(Clone)]
pub struct PatchHandler {
    source: Arc<dyn ResourceStore>,
    patcher: Arc<dyn RepresentationPatcher>,
}

impl PatchHandler {
    /// Creates a handler committing to `source` with `patcher`.
    #[must_use]
    pub fn new(source: Arc<dyn ResourceStore>, patcher: Arc<dyn RepresentationPatcher>) -> Self {
        Self { source, patcher }
    }

    /// Runs the protocol for one patch.
    pub async fn handle(
        &self,
        identifier: &ResourceIdentifier,
        patch: &Patch,
        conditions: Option<&dyn Conditions>,
        preferences: &RepresentationPreferences,
    ) -> CairnResult<Vec<ResourceIdentifier>> {
        let representation = match self
            .source
            .get_representation(identifier, &RepresentationPreferences::default(), None)
            .await
        {
            Ok(representation) => Some(representation),
            Err(error) if error.is_not_found() => {
                tracing::debug!(identifier = %identifier, "patch target absent, creating");
                None
            }
            Err(error) => return Err(error),
        };

        if let Some(conditions) = conditions {
            if !conditions.matches_metadata(representation.as_ref().map(|r| &r.metadata)) {
                return Err(CairnError::precondition_failed(format!(
                    "conditions not met for '{identifier}'"
                )));
            }
        }

        let unchanged = read_state(representation.as_ref());
        let patched = self
            .patcher
            .handle_safe(PatcherInput {
                identifier: identifier.clone(),
                patch: patch.clone(),
                representation,
            })
            .await?;

        self.source
            .set_representation(identifier, patched, Some(&unchanged), preferences)
            .await
            .map_err(|error| {
                if error.category() == ErrorCategory::PreconditionFailed {
                    tracing::debug!(identifier = %identifier, "target changed during patch");
                }
                error
            })
    }
}

/// Conditions that hold only while the target is as it was when read.
fn read_state(representation: Option<&Representation>) -> BasicConditions {
    match representation {
        None => BasicConditions::must_not_exist(),
        Some(representation) => match representation.metadata.revision() {
            Some(revision) => BasicConditions::if_match(revision),
            None => BasicConditions::must_exist(),
        },
    }
}

impl std::fmt::Debug for PatchHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatchHandler").finish_non_exhaustive()
    }
}
