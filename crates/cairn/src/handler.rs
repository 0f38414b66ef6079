//! The handler that executes authorized operations against a store.
//!
//! [`StoreOperationHandler`] sits behind the authorization pipeline. Each
//! [`OperationKind`] maps to exactly one [`ResourceStore`] call:
//!
//! | Kind | Store call | Outcome |
//! |------|------------|---------|
//! | `Read` | `get_representation` | `Representation` |
//! | `Create` | `add_resource` | `Created` |
//! | `Replace` | `set_representation` | `Modified` |
//! | `Delete` | `delete_resource` | `Modified` |
//! | `Patch` | `modify_resource` | `Modified` |
//!
//! Attribute restrictions on the operation's [`PermissionSet`] are applied
//! here: hidden attributes are stripped from reads, and writes that would set
//! or change a read-only attribute fail with `Forbidden`. A replace keeps the
//! stored values of restricted attributes it omits; it reads the target first
//! and commits only if the target is still in the state it read.

use async_trait::async_trait;
use cairn_core::{
    BasicConditions, CairnError, CairnResult, Conditions, Operation, OperationHandler,
    OperationKind, OperationOutcome, PermissionSet, Representation, RepresentationMetadata,
    RepresentationPreferences, ResourceIdentifier,
};
use cairn_store::ResourceStore;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Executes operations on a [`ResourceStore`].
#[derive(Clone)]
pub struct StoreOperationHandler {
    store: Arc<dyn ResourceStore>,
}

impl StoreOperationHandler {
    /// Creates a handler over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn ResourceStore>) -> Self {
        Self { store }
    }

    /// The store operations are executed on.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn ResourceStore> {
        &self.store
    }

    async fn replace(
        &self,
        target: &ResourceIdentifier,
        mut representation: Representation,
        conditions: Option<&dyn Conditions>,
        operation: &Operation,
    ) -> CairnResult<Vec<ResourceIdentifier>> {
        let permissions = &operation.permissions;
        if permissions.hidden_attributes.is_empty() && permissions.read_only_attributes.is_empty() {
            return self
                .store
                .set_representation(target, representation, conditions, &operation.preferences)
                .await;
        }

        let stored = match self
            .store
            .get_representation(target, &RepresentationPreferences::default(), None)
            .await
        {
            Ok(stored) => Some(stored.metadata),
            Err(error) if error.is_not_found() => None,
            Err(error) => return Err(error),
        };
        carry_restricted(&mut representation.metadata, stored.as_ref(), permissions)?;

        let unchanged = AllOf {
            requested: conditions,
            read: read_state(stored.as_ref()),
        };
        self.store
            .set_representation(target, representation, Some(&unchanged), &operation.preferences)
            .await
    }
}

/// The request's own conditions plus those pinning the state a replace read.
#[derive(Debug)]
struct AllOf<'a> {
    requested: Option<&'a dyn Conditions>,
    read: BasicConditions,
}

impl Conditions for AllOf<'_> {
    fn matches_metadata(&self, metadata: Option<&RepresentationMetadata>) -> bool {
        self.requested
            .map_or(true, |requested| requested.matches_metadata(metadata))
            && self.read.matches_metadata(metadata)
    }
}

fn read_state(stored: Option<&RepresentationMetadata>) -> BasicConditions {
    match stored.map(RepresentationMetadata::revision) {
        None => BasicConditions::must_not_exist(),
        Some(Some(revision)) => BasicConditions::if_match(revision),
        Some(None) => BasicConditions::must_exist(),
    }
}

fn check_writable(representation: &Representation, permissions: &PermissionSet) -> CairnResult<()> {
    match permissions
        .read_only_attributes
        .iter()
        .find(|attribute| representation.metadata.has(attribute))
    {
        Some(attribute) => Err(CairnError::forbidden(format!(
            "attribute '{attribute}' is read-only"
        ))),
        None => Ok(()),
    }
}

/// Rejects changes to read-only attributes, then copies the stored values of
/// every restricted attribute the incoming metadata omits.
fn carry_restricted(
    incoming: &mut RepresentationMetadata,
    stored: Option<&RepresentationMetadata>,
    permissions: &PermissionSet,
) -> CairnResult<()> {
    for attribute in &permissions.read_only_attributes {
        if incoming.has(attribute)
            && attribute_values(Some(&*incoming), attribute) != attribute_values(stored, attribute)
        {
            return Err(CairnError::forbidden(format!(
                "attribute '{attribute}' is read-only"
            )));
        }
    }

    let Some(stored) = stored else {
        return Ok(());
    };
    let restricted = permissions
        .hidden_attributes
        .iter()
        .chain(&permissions.read_only_attributes);
    for attribute in restricted {
        if incoming.has(attribute) {
            continue;
        }
        for value in stored.get_all(attribute) {
            incoming.add(attribute.clone(), value.clone());
        }
    }
    Ok(())
}

fn attribute_values(metadata: Option<&RepresentationMetadata>, attribute: &str) -> BTreeSet<String> {
    metadata
        .map(|metadata| metadata.get_all(attribute).iter().cloned().collect())
        .unwrap_or_default()
}

fn strip_hidden(mut representation: Representation, permissions: &PermissionSet) -> Representation {
    for attribute in &permissions.hidden_attributes {
        representation.metadata.remove_all(attribute);
    }
    representation
}

#[async_trait]
impl OperationHandler for StoreOperationHandler {
    async fn handle(&self, operation: Operation) -> CairnResult<OperationOutcome> {
        let conditions = operation.conditions();
        let target = &operation.target;

        match &operation.kind {
            OperationKind::Read => {
                let representation = self
                    .store
                    .get_representation(target, &operation.preferences, conditions)
                    .await?;
                Ok(OperationOutcome::Representation(strip_hidden(
                    representation,
                    &operation.permissions,
                )))
            }
            OperationKind::Create { representation } => {
                check_writable(representation, &operation.permissions)?;
                let created = self
                    .store
                    .add_resource(target, representation.clone(), conditions)
                    .await?;
                Ok(OperationOutcome::Created(created))
            }
            OperationKind::Replace { representation } => {
                let changed = self
                    .replace(target, representation.clone(), conditions, &operation)
                    .await?;
                Ok(OperationOutcome::Modified(changed))
            }
            OperationKind::Delete => {
                let changed = self.store.delete_resource(target, conditions).await?;
                Ok(OperationOutcome::Modified(changed))
            }
            OperationKind::Patch { patch } => {
                let changed = self
                    .store
                    .modify_resource(target, patch, conditions, &operation.preferences)
                    .await?;
                Ok(OperationOutcome::Modified(changed))
            }
        }
    }
}

impl std::fmt::Debug for StoreOperationHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreOperationHandler").finish_non_exhaustive()
    }
}
