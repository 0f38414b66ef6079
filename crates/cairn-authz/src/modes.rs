//! Required access modes per operation.

use async_trait::async_trait;
use cairn_core::{
    AccessMode, CairnError, CairnResult, ModeSet, Operation, OperationKind, Patch,
};
use cairn_store::ResourceStore;
use std::sync::Arc;

/// Second stage: which modes the operation needs.
#[async_trait]
pub trait ModesExtractor: Send + Sync {
    /// Determines the modes required on the operation's target.
    ///
    /// # Errors
    ///
    /// `Validation` for malformed operations; store errors propagate.
    async fn extract(&self, operation: &Operation) -> CairnResult<ModeSet>;
}

/// Derives modes from the operation kind and whether the target exists.
///
/// | Operation | Target exists | Modes |
/// |-----------|---------------|-------|
/// | read | - | `{Read}` |
/// | create (in container) | - | `{Append, Create}` |
/// | replace | yes | `{Write}` |
/// | replace | no | `{Append, Create}` |
/// | delete | - | `{Write, Delete}` |
/// | semantic patch | - | `{Append}` for insertions, `{Read, Write}` for deletions, `{Read}` if empty |
/// | semantic patch | no | the above plus `{Create}` |
/// | opaque patch | - | `{Read, Write}` |
pub struct MethodModesExtractor {
    store: Arc<dyn ResourceStore>,
}

impl MethodModesExtractor {
    /// Uses `store` to check whether targets exist.
    #[must_use]
    pub fn new(store: Arc<dyn ResourceStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ModesExtractor for MethodModesExtractor {
    async fn extract(&self, operation: &Operation) -> CairnResult<ModeSet> {
        let modes = match &operation.kind {
            OperationKind::Read => ModeSet::from([AccessMode::Read]),
            OperationKind::Create { .. } => {
                if !operation.target.is_container() {
                    return Err(CairnError::validation(format!(
                        "cannot create resources in '{}': not a container",
                        operation.target
                    )));
                }
                ModeSet::from([AccessMode::Append, AccessMode::Create])
            }
            OperationKind::Replace { .. } => {
                if self.store.has_resource(&operation.target).await? {
                    ModeSet::from([AccessMode::Write])
                } else {
                    ModeSet::from([AccessMode::Append, AccessMode::Create])
                }
            }
            OperationKind::Delete => ModeSet::from([AccessMode::Write, AccessMode::Delete]),
            OperationKind::Patch { patch } => {
                let mut modes = match patch {
                    Patch::SemanticUpdate(update) => {
                        let mut modes = ModeSet::new();
                        if !update.insertions().is_empty() {
                            modes.insert(AccessMode::Append);
                        }
                        if !update.deletions().is_empty() {
                            modes.insert(AccessMode::Read);
                            modes.insert(AccessMode::Write);
                        }
                        if update.is_empty() {
                            modes.insert(AccessMode::Read);
                        }
                        modes
                    }
                    Patch::Opaque { .. } => ModeSet::from([AccessMode::Read, AccessMode::Write]),
                };
                if matches!(patch, Patch::SemanticUpdate(_))
                    && !self.store.has_resource(&operation.target).await?
                {
                    modes.insert(AccessMode::Create);
                }
                modes
            }
        };

        tracing::trace!(
            operation = operation.kind.name(),
            identifier = %operation.target,
            modes = %modes,
            "required modes"
        );
        Ok(modes)
    }
}

impl std::fmt::Debug for MethodModesExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodModesExtractor").finish_non_exhaustive()
    }
}
