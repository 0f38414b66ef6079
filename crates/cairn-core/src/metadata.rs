//! Representation metadata.
//!
//! [`RepresentationMetadata`] is a multimap from attribute name to values.
//! Values for one attribute keep insertion order; attribute order is the
//! order in which attributes were first added.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Reserved attribute names.
pub mod attributes {
    /// Media type of the data.
    pub const CONTENT_TYPE: &str = "content-type";
    /// Byte length of the data.
    pub const CONTENT_LENGTH: &str = "content-length";
    /// Opaque revision token.
    pub const REVISION: &str = "revision";
    /// Last modification time (RFC 3339).
    pub const MODIFIED: &str = "modified";
    /// Children of a container.
    pub const CONTAINS: &str = "contains";
    /// Preferred child name on creation.
    pub const SLUG: &str = "slug";
    /// `container` or `document`.
    pub const RESOURCE_TYPE: &str = "resource-type";

    /// Value of [`RESOURCE_TYPE`] for containers.
    pub const CONTAINER: &str = "container";
    /// Value of [`RESOURCE_TYPE`] for documents.
    pub const DOCUMENT: &str = "document";

    /// Attributes only the store may set.
    pub const SERVER_MANAGED: [&str; 4] = [CONTENT_LENGTH, REVISION, MODIFIED, CONTAINS];

    /// Returns `true` if `name` is only ever set by the store.
    #[must_use]
    pub fn is_server_managed(name: &str) -> bool {
        SERVER_MANAGED.contains(&name)
    }
}

/// Multi-valued attribute set describing a representation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepresentationMetadata {
    entries: IndexMap<String, Vec<String>>,
}

impl RepresentationMetadata {
    /// Creates empty metadata.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates metadata with a content type.
    #[must_use]
    pub fn with_content_type(content_type: impl Into<String>) -> Self {
        let mut metadata = Self::new();
        metadata.set(attributes::CONTENT_TYPE, content_type);
        metadata
    }

    /// Appends a value to `name`.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.entries.entry(name.into()).or_default().push(value.into());
        self
    }

    /// Replaces every value of `name` with `value`.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.entries.insert(name.into(), vec![value.into()]);
        self
    }

    /// Removes one value from `name`. The attribute disappears with its last value.
    pub fn remove(&mut self, name: &str, value: &str) -> bool {
        let Some(values) = self.entries.get_mut(name) else {
            return false;
        };
        let before = values.len();
        values.retain(|v| v != value);
        let removed = values.len() != before;
        if values.is_empty() {
            self.entries.shift_remove(name);
        }
        removed
    }

    /// Removes every value of `name`.
    pub fn remove_all(&mut self, name: &str) -> Vec<String> {
        self.entries.shift_remove(name).unwrap_or_default()
    }

    /// Returns the first value of `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Returns every value of `name` in insertion order.
    #[must_use]
    pub fn get_all(&self, name: &str) -> &[String] {
        self.entries.get(name).map_or(&[], Vec::as_slice)
    }

    /// Returns `true` if `name` has at least one value.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Iterates over `(name, values)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// Number of distinct attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the content type, if any.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.get(attributes::CONTENT_TYPE)
    }

    /// Returns the revision token, if any.
    #[must_use]
    pub fn revision(&self) -> Option<&str> {
        self.get(attributes::REVISION)
    }

    /// Returns `true` if `resource-type` says this describes a container.
    #[must_use]
    pub fn is_container(&self) -> bool {
        self.get(attributes::RESOURCE_TYPE) == Some(attributes::CONTAINER)
    }

    /// Drops every server-managed attribute.
    pub fn strip_server_managed(&mut self) {
        self.entries
            .retain(|name, _| !attributes::is_server_managed(name));
    }
}

impl<K, V> FromIterator<(K, V)> for RepresentationMetadata
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut metadata = Self::new();
        for (name, value) in iter {
            metadata.add(name, value);
        }
        metadata
    }
}
