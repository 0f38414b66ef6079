//! In-memory reference backend.
//!
//! [`InMemoryStore`] keeps every resource in a map behind a single
//! `parking_lot::RwLock`. Each operation validates everything it needs to
//! before touching the map, and does the condition check and the write under
//! the same write guard, so a failed operation never leaves partial state.
//!
//! Revision tokens come from a store-wide counter; every write yields a fresh
//! token. Containers carry their children as `contains` values and an empty
//! body.

use crate::ResourceStore;
use async_trait::async_trait;
use bytes::Bytes;
use cairn_core::{
    attributes, CairnError, CairnResult, Conditions, IdentifierStrategy, Patch, Representation,
    RepresentationMetadata, RepresentationPreferences, ResourceIdentifier,
};
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::{BTreeSet, HashMap};
use uuid::Uuid;

#[derive(Debug, Clone)]
struct StoredResource {
    metadata: RepresentationMetadata,
    data: Bytes,
    children: BTreeSet<ResourceIdentifier>,
}

#[derive(Debug, Default)]
struct State {
    resources: HashMap<ResourceIdentifier, StoredResource>,
    last_revision: u64,
}

impl State {
    fn next_revision(&mut self) -> String {
        self.last_revision += 1;
        self.last_revision.to_string()
    }

    fn stamp(&mut self, metadata: &mut RepresentationMetadata, length: usize) {
        let revision = self.next_revision();
        metadata
            .set(attributes::REVISION, revision)
            .set(attributes::MODIFIED, Utc::now().to_rfc3339())
            .set(attributes::CONTENT_LENGTH, length.to_string());
    }

    fn touch(&mut self, container: &ResourceIdentifier) {
        let revision = self.next_revision();
        if let Some(stored) = self.resources.get_mut(container) {
            stored
                .metadata
                .set(attributes::REVISION, revision)
                .set(attributes::MODIFIED, Utc::now().to_rfc3339());
        }
    }

    fn check(
        &self,
        identifier: &ResourceIdentifier,
        conditions: Option<&dyn Conditions>,
    ) -> CairnResult<()> {
        let Some(conditions) = conditions else {
            return Ok(());
        };
        let current = self.resources.get(identifier).map(|stored| &stored.metadata);
        if conditions.matches_metadata(current) {
            Ok(())
        } else {
            Err(CairnError::precondition_failed(format!(
                "conditions not met for '{identifier}'"
            )))
        }
    }

    /// The other-shaped twin of `identifier`: `a/` for `a` and vice versa.
    fn twin(identifier: &ResourceIdentifier) -> ResourceIdentifier {
        let path = identifier.as_str();
        match path.strip_suffix('/') {
            Some(document) => ResourceIdentifier::new(document),
            None => ResourceIdentifier::new(format!("{path}/")),
        }
    }

    fn ensure_no_twin(&self, identifier: &ResourceIdentifier) -> CairnResult<()> {
        let twin = Self::twin(identifier);
        if self.resources.contains_key(&twin) {
            return Err(CairnError::conflict(format!(
                "'{identifier}' clashes with existing resource '{twin}'"
            )));
        }
        Ok(())
    }
}

/// A non-durable [`ResourceStore`] holding everything in memory.
///
/// # Example
///
/// ```rust,ignore
/// use cairn_store::{InMemoryStore, ResourceStore};
///
/// let store = InMemoryStore::new(IdentifierStrategy::new("http://localhost:3000/"));
/// let id = store
///     .add_resource(&root, Representation::document("text/plain", "hi"), None)
///     .await?;
/// ```
#[derive(Debug)]
pub struct InMemoryStore {
    strategy: IdentifierStrategy,
    state: RwLock<State>,
}

impl InMemoryStore {
    /// Creates a store holding only the root container.
    #[must_use]
    pub fn new(strategy: IdentifierStrategy) -> Self {
        let mut state = State::default();
        let mut metadata = Representation::container().metadata;
        state.stamp(&mut metadata, 0);
        state.resources.insert(
            strategy.root().clone(),
            StoredResource {
                metadata,
                data: Bytes::new(),
                children: BTreeSet::new(),
            },
        );
        Self {
            strategy,
            state: RwLock::new(state),
        }
    }

    /// The identifier strategy this store was built with.
    #[must_use]
    pub fn strategy(&self) -> &IdentifierStrategy {
        &self.strategy
    }

    /// Number of stored resources, including the root.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.read().resources.len()
    }

    /// Returns `true` if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.read().resources.is_empty()
    }

    fn incoming_metadata(
        identifier: &ResourceIdentifier,
        mut metadata: RepresentationMetadata,
    ) -> RepresentationMetadata {
        metadata.strip_server_managed();
        metadata.remove_all(attributes::SLUG);
        if identifier.is_container() {
            metadata.set(attributes::RESOURCE_TYPE, attributes::CONTAINER);
        }
        metadata
    }

    fn pick_name(
        &self,
        state: &State,
        container: &ResourceIdentifier,
        slug: Option<&str>,
        is_container: bool,
    ) -> CairnResult<ResourceIdentifier> {
        if let Some(slug) = slug {
            let candidate = self.strategy.child(container, slug, is_container)?;
            if !state.resources.contains_key(&candidate)
                && !state.resources.contains_key(&State::twin(&candidate))
            {
                return Ok(candidate);
            }
        }
        self.strategy
            .child(container, &Uuid::now_v7().to_string(), is_container)
    }
}

#[async_trait]
impl ResourceStore for InMemoryStore {
    async fn has_resource(&self, identifier: &ResourceIdentifier) -> CairnResult<bool> {
        Ok(self.state.read().resources.contains_key(identifier))
    }

    async fn get_representation(
        &self,
        identifier: &ResourceIdentifier,
        _preferences: &RepresentationPreferences,
        conditions: Option<&dyn Conditions>,
    ) -> CairnResult<Representation> {
        self.strategy.ensure_supported(identifier)?;
        let state = self.state.read();
        let stored = state
            .resources
            .get(identifier)
            .ok_or_else(|| CairnError::not_found_resource(identifier.as_str()))?;
        state.check(identifier, conditions)?;

        let mut metadata = stored.metadata.clone();
        for child in &stored.children {
            metadata.add(attributes::CONTAINS, child.as_str());
        }
        Ok(Representation::new(metadata, stored.data.clone()))
    }

    async fn add_resource(
        &self,
        container: &ResourceIdentifier,
        representation: Representation,
        conditions: Option<&dyn Conditions>,
    ) -> CairnResult<ResourceIdentifier> {
        self.strategy.ensure_supported(container)?;
        let mut state = self.state.write();
        if !state.resources.contains_key(container) {
            return Err(CairnError::not_found_resource(container.as_str()));
        }
        if !container.is_container() {
            return Err(CairnError::validation(format!(
                "'{container}' is not a container"
            )));
        }
        state.check(container, conditions)?;

        let is_container = representation.metadata.is_container();
        let slug = representation.metadata.get(attributes::SLUG);
        let identifier = self.pick_name(&state, container, slug, is_container)?;

        let mut metadata = Self::incoming_metadata(&identifier, representation.metadata);
        let data = if is_container {
            Bytes::new()
        } else {
            representation.data
        };
        state.stamp(&mut metadata, data.len());
        state.resources.insert(
            identifier.clone(),
            StoredResource {
                metadata,
                data,
                children: BTreeSet::new(),
            },
        );
        if let Some(parent) = state.resources.get_mut(container) {
            parent.children.insert(identifier.clone());
        }
        state.touch(container);

        Ok(identifier)
    }

    async fn delete_resource(
        &self,
        identifier: &ResourceIdentifier,
        conditions: Option<&dyn Conditions>,
    ) -> CairnResult<Vec<ResourceIdentifier>> {
        self.strategy.ensure_supported(identifier)?;
        if self.strategy.is_root(identifier) {
            return Err(CairnError::conflict("the root container cannot be deleted"));
        }

        let mut state = self.state.write();
        state.check(identifier, conditions)?;
        let stored = state
            .resources
            .get(identifier)
            .ok_or_else(|| CairnError::not_found_resource(identifier.as_str()))?;
        if !stored.children.is_empty() {
            return Err(CairnError::conflict(format!(
                "container '{identifier}' is not empty"
            )));
        }

        let parent = self.strategy.parent(identifier)?;
        state.resources.remove(identifier);
        if let Some(stored) = state.resources.get_mut(&parent) {
            stored.children.remove(identifier);
        }
        state.touch(&parent);

        Ok(vec![identifier.clone(), parent])
    }

    async fn modify_resource(
        &self,
        identifier: &ResourceIdentifier,
        patch: &Patch,
        _conditions: Option<&dyn Conditions>,
        _preferences: &RepresentationPreferences,
    ) -> CairnResult<Vec<ResourceIdentifier>> {
        Err(CairnError::validation(format!(
            "cannot apply a {} patch to '{identifier}' without a patcher",
            patch.dialect()
        )))
    }

    async fn set_representation(
        &self,
        identifier: &ResourceIdentifier,
        representation: Representation,
        conditions: Option<&dyn Conditions>,
        _preferences: &RepresentationPreferences,
    ) -> CairnResult<Vec<ResourceIdentifier>> {
        self.strategy.ensure_supported(identifier)?;
        if representation.metadata.is_container() && !identifier.is_container() {
            return Err(CairnError::conflict(format!(
                "'{identifier}' is a document identifier but the representation is a container"
            )));
        }

        let mut state = self.state.write();
        state.check(identifier, conditions)?;
        state.ensure_no_twin(identifier)?;

        let ancestors = if self.strategy.is_root(identifier) {
            Vec::new()
        } else {
            self.strategy.ancestors(identifier)?
        };
        for ancestor in &ancestors {
            state.ensure_no_twin(ancestor)?;
        }

        let mut affected = vec![identifier.clone()];

        // Create missing intermediate containers, root first.
        let mut parent: Option<ResourceIdentifier> = None;
        for ancestor in &ancestors {
            if !state.resources.contains_key(ancestor) {
                let mut metadata = Representation::container().metadata;
                state.stamp(&mut metadata, 0);
                state.resources.insert(
                    ancestor.clone(),
                    StoredResource {
                        metadata,
                        data: Bytes::new(),
                        children: BTreeSet::new(),
                    },
                );
                affected.push(ancestor.clone());
            }
            if let Some(parent) = &parent {
                let inserted = state
                    .resources
                    .get_mut(parent)
                    .is_some_and(|stored| stored.children.insert(ancestor.clone()));
                if inserted {
                    state.touch(parent);
                    if !affected.contains(parent) {
                        affected.push(parent.clone());
                    }
                }
            }
            parent = Some(ancestor.clone());
        }

        let mut metadata = Self::incoming_metadata(identifier, representation.metadata);
        let data = if identifier.is_container() {
            Bytes::new()
        } else {
            representation.data
        };
        state.stamp(&mut metadata, data.len());
        let children = state
            .resources
            .remove(identifier)
            .map(|previous| previous.children)
            .unwrap_or_default();
        state.resources.insert(
            identifier.clone(),
            StoredResource {
                metadata,
                data,
                children,
            },
        );

        if let Some(parent) = &parent {
            let inserted = state
                .resources
                .get_mut(parent)
                .is_some_and(|stored| stored.children.insert(identifier.clone()));
            if inserted {
                state.touch(parent);
                if !affected.contains(parent) {
                    affected.push(parent.clone());
                }
            }
        }

        Ok(affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cairn_core::{fixtures, BasicConditions};

    fn store() -> InMemoryStore {
        InMemoryStore::new(fixtures::strategy())
    }

    async fn read(store: &InMemoryStore, id: &ResourceIdentifier) -> CairnResult<Representation> {
        store
            .get_representation(id, &RepresentationPreferences::default(), None)
            .await
    }

    async fn write(
        store: &InMemoryStore,
        id: &ResourceIdentifier,
        representation: Representation,
        conditions: Option<&dyn Conditions>,
    ) -> CairnResult<Vec<ResourceIdentifier>> {
        store
            .set_representation(
                id,
                representation,
                conditions,
                &RepresentationPreferences::default(),
            )
            .await
    }

    #[tokio::test]
    async fn test_root_exists_initially() {
        let store = store();
        assert!(store.has_resource(&fixtures::root()).await.unwrap());
        assert_eq!(store.len(), 1);
        let root = read(&store, &fixtures::root()).await.unwrap();
        assert!(root.metadata.is_container());
        assert!(root.data.is_empty());
    }

    #[tokio::test]
    async fn test_missing_resource_is_not_found() {
        let store = store();
        let err = read(&store, &fixtures::document()).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_add_uses_slug_and_lists_child() {
        let store = store();
        let id = store
            .add_resource(&fixtures::root(), fixtures::text("hi").with_slug("note"), None)
            .await
            .unwrap();
        assert_eq!(id, fixtures::id("note"));

        let stored = read(&store, &id).await.unwrap();
        assert_eq!(stored.text(), Some("hi"));
        assert!(!stored.metadata.has(attributes::SLUG));
        assert_eq!(stored.metadata.get(attributes::CONTENT_LENGTH), Some("2"));

        let root = read(&store, &fixtures::root()).await.unwrap();
        assert_eq!(root.metadata.get_all(attributes::CONTAINS), [id.to_string()]);
    }

    #[tokio::test]
    async fn test_add_with_taken_slug_gets_fresh_name() {
        let store = store();
        let first = store
            .add_resource(&fixtures::root(), fixtures::text("a").with_slug("x"), None)
            .await
            .unwrap();
        let second = store
            .add_resource(&fixtures::root(), fixtures::text("b").with_slug("x"), None)
            .await
            .unwrap();
        assert_ne!(first, second);
        assert!(fixtures::strategy().supports(&second));
    }

    #[tokio::test]
    async fn test_add_container_child() {
        let store = store();
        let id = store
            .add_resource(&fixtures::root(), Representation::container().with_slug("box"), None)
            .await
            .unwrap();
        assert!(id.is_container());
        assert_eq!(id, fixtures::id("box/"));
    }

    #[tokio::test]
    async fn test_add_to_document_is_rejected() {
        let store = store();
        write(&store, &fixtures::document(), fixtures::text("x"), None)
            .await
            .unwrap();
        let err = store
            .add_resource(&fixtures::document(), fixtures::text("y"), None)
            .await
            .unwrap_err();
        assert_eq!(err.category(), cairn_core::ErrorCategory::Validation);
    }

    #[tokio::test]
    async fn test_set_creates_intermediate_containers() {
        let store = store();
        let id = fixtures::id("a/b/c");
        let affected = write(&store, &id, fixtures::text("deep"), None).await.unwrap();

        assert!(affected.contains(&id));
        assert!(affected.contains(&fixtures::id("a/")));
        assert!(affected.contains(&fixtures::id("a/b/")));
        assert!(affected.contains(&fixtures::root()));
        assert!(store.has_resource(&fixtures::id("a/b/")).await.unwrap());
    }

    #[tokio::test]
    async fn test_overwrite_reports_only_target() {
        let store = store();
        let id = fixtures::document();
        write(&store, &id, fixtures::text("v1"), None).await.unwrap();
        let affected = write(&store, &id, fixtures::text("v2"), None).await.unwrap();
        assert_eq!(affected, vec![id]);
    }

    #[tokio::test]
    async fn test_shape_clash_is_conflict() {
        let store = store();
        write(&store, &fixtures::id("a"), fixtures::text("doc"), None)
            .await
            .unwrap();
        let err = write(&store, &fixtures::id("a/b"), fixtures::text("x"), None)
            .await
            .unwrap_err();
        assert_eq!(err.category(), cairn_core::ErrorCategory::Conflict);
        assert!(!store.has_resource(&fixtures::id("a/")).await.unwrap());
    }

    #[tokio::test]
    async fn test_revision_changes_on_every_write() {
        let store = store();
        let id = fixtures::document();
        write(&store, &id, fixtures::text("v1"), None).await.unwrap();
        let first = read(&store, &id).await.unwrap();
        write(&store, &id, fixtures::text("v2"), None).await.unwrap();
        let second = read(&store, &id).await.unwrap();
        assert_ne!(first.metadata.revision(), second.metadata.revision());
    }

    #[tokio::test]
    async fn test_failed_precondition_leaves_state() {
        let store = store();
        let id = fixtures::document();
        write(&store, &id, fixtures::text("v1"), None).await.unwrap();

        let stale = BasicConditions::if_match("stale");
        let err = write(&store, &id, fixtures::text("v2"), Some(&stale))
            .await
            .unwrap_err();
        assert_eq!(err.category(), cairn_core::ErrorCategory::PreconditionFailed);
        assert_eq!(read(&store, &id).await.unwrap().text(), Some("v1"));
    }

    #[tokio::test]
    async fn test_must_not_exist_on_create() {
        let store = store();
        let id = fixtures::document();
        let conditions = BasicConditions::must_not_exist();
        write(&store, &id, fixtures::text("v1"), Some(&conditions))
            .await
            .unwrap();
        assert!(write(&store, &id, fixtures::text("v2"), Some(&conditions))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_delete_returns_target_and_parent() {
        let store = store();
        let id = fixtures::document();
        write(&store, &id, fixtures::text("x"), None).await.unwrap();
        let affected = store.delete_resource(&id, None).await.unwrap();
        assert_eq!(affected, vec![id.clone(), fixtures::root()]);
        assert!(!store.has_resource(&id).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_rules() {
        let store = store();
        assert_eq!(
            store
                .delete_resource(&fixtures::root(), None)
                .await
                .unwrap_err()
                .category(),
            cairn_core::ErrorCategory::Conflict
        );

        write(&store, &fixtures::id("a/b"), fixtures::text("x"), None)
            .await
            .unwrap();
        assert_eq!(
            store
                .delete_resource(&fixtures::id("a/"), None)
                .await
                .unwrap_err()
                .category(),
            cairn_core::ErrorCategory::Conflict
        );
        assert!(store
            .delete_resource(&fixtures::id("missing"), None)
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn test_modify_without_patcher_is_validation() {
        let store = store();
        let err = store
            .modify_resource(
                &fixtures::document(),
                &fixtures::insert([fixtures::triple("s", "p", "o")]),
                None,
                &RepresentationPreferences::default(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.category(), cairn_core::ErrorCategory::Validation);
    }

    #[tokio::test]
    async fn test_identifiers_outside_root_are_not_found() {
        let store = store();
        let foreign = ResourceIdentifier::new("http://example.org/x");
        assert!(write(&store, &foreign, fixtures::text("x"), None)
            .await
            .unwrap_err()
            .is_not_found());
    }
}
