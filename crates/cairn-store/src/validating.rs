//! Rejects malformed incoming representations.

use crate::{ForwardingStore, ResourceStore};
use async_trait::async_trait;
use cairn_core::{
    CairnError, CairnResult, Conditions, IdentifierStrategy, Representation,
    RepresentationPreferences, ResourceIdentifier,
};
use std::sync::Arc;

/// Validates representations before they reach the source.
///
/// Overrides `add_resource` and `set_representation`; fails with
/// `Validation` for identifiers outside the root, documents without a
/// content type and containers with a body.
pub struct ValidatingStore {
    source: Arc<dyn ResourceStore>,
    strategy: IdentifierStrategy,
}

impl ValidatingStore {
    /// Wraps `source`.
    #[must_use]
    pub fn new(source: Arc<dyn ResourceStore>, strategy: IdentifierStrategy) -> Self {
        Self { source, strategy }
    }

    fn validate(
        &self,
        identifier: &ResourceIdentifier,
        representation: &Representation,
        is_container: bool,
    ) -> CairnResult<()> {
        if !self.strategy.supports(identifier) {
            return Err(CairnError::validation(format!(
                "'{identifier}' is outside {}",
                self.strategy.root()
            )));
        }
        if is_container {
            if !representation.data.is_empty() {
                return Err(CairnError::validation(
                    "container representations must not have a body",
                ));
            }
        } else if representation.metadata.content_type().is_none() {
            return Err(CairnError::validation("documents require a content type"));
        }
        Ok(())
    }
}

#[async_trait]
impl ForwardingStore for ValidatingStore {
    fn source(&self) -> &dyn ResourceStore {
        self.source.as_ref()
    }

    async fn add_resource(
        &self,
        container: &ResourceIdentifier,
        representation: Representation,
        conditions: Option<&dyn Conditions>,
    ) -> CairnResult<ResourceIdentifier> {
        self.validate(
            container,
            &representation,
            representation.metadata.is_container(),
        )?;
        self.source
            .add_resource(container, representation, conditions)
            .await
    }

    async fn set_representation(
        &self,
        identifier: &ResourceIdentifier,
        representation: Representation,
        conditions: Option<&dyn Conditions>,
        preferences: &RepresentationPreferences,
    ) -> CairnResult<Vec<ResourceIdentifier>> {
        let is_container = identifier.is_container() || representation.metadata.is_container();
        self.validate(identifier, &representation, is_container)?;
        self.source
            .set_representation(identifier, representation, conditions, preferences)
            .await
    }
}

impl std::fmt::Debug for ValidatingStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatingStore")
            .field("strategy", &self.strategy)
            .finish_non_exhaustive()
    }
}
