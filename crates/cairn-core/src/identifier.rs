//! Resource identifiers and the identifier hierarchy.
//!
//! A [`ResourceIdentifier`] is an absolute URL path under the configured root.
//! Containers end with `/`; documents never do. The [`IdentifierStrategy`]
//! knows the root and derives parents and children.

use crate::{CairnError, CairnResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a document or container.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceIdentifier {
    path: String,
}

impl ResourceIdentifier {
    /// Creates an identifier from its full path.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.path
    }

    /// Returns `true` if this identifier names a container.
    #[must_use]
    pub fn is_container(&self) -> bool {
        self.path.ends_with('/')
    }
}

impl fmt::Display for ResourceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

impl From<&str> for ResourceIdentifier {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for ResourceIdentifier {
    fn from(path: String) -> Self {
        Self::new(path)
    }
}

impl AsRef<str> for ResourceIdentifier {
    fn as_ref(&self) -> &str {
        &self.path
    }
}

/// Hierarchy rules for identifiers below a single root container.
///
/// # Example
///
/// ```
/// use cairn_core::{IdentifierStrategy, ResourceIdentifier};
///
/// let strategy = IdentifierStrategy::new("http://localhost:3000/");
/// let doc = ResourceIdentifier::new("http://localhost:3000/notes/today");
///
/// assert!(strategy.supports(&doc));
/// assert_eq!(
///     strategy.parent(&doc).unwrap().as_str(),
///     "http://localhost:3000/notes/"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierStrategy {
    base: ResourceIdentifier,
}

impl IdentifierStrategy {
    /// Creates a strategy rooted at `base_url`. A missing trailing `/` is added.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base = base_url.into();
        if !base.ends_with('/') {
            base.push('/');
        }
        Self {
            base: ResourceIdentifier::new(base),
        }
    }

    /// Returns the root container.
    #[must_use]
    pub fn root(&self) -> &ResourceIdentifier {
        &self.base
    }

    /// Returns `true` if `identifier` lies at or below the root.
    #[must_use]
    pub fn supports(&self, identifier: &ResourceIdentifier) -> bool {
        identifier.as_str().starts_with(self.base.as_str())
    }

    /// Returns `true` if `identifier` is the root container.
    #[must_use]
    pub fn is_root(&self, identifier: &ResourceIdentifier) -> bool {
        identifier == &self.base
    }

    /// Fails with `NotFound` if `identifier` is outside the root.
    pub fn ensure_supported(&self, identifier: &ResourceIdentifier) -> CairnResult<()> {
        if self.supports(identifier) {
            Ok(())
        } else {
            Err(CairnError::not_found_resource(identifier.as_str()))
        }
    }

    /// Returns the container holding `identifier`.
    pub fn parent(&self, identifier: &ResourceIdentifier) -> CairnResult<ResourceIdentifier> {
        self.ensure_supported(identifier)?;
        if self.is_root(identifier) {
            return Err(CairnError::validation("the root container has no parent"));
        }

        let trimmed = identifier.as_str().trim_end_matches('/');
        match trimmed.rfind('/') {
            Some(index) => Ok(ResourceIdentifier::new(&trimmed[..=index])),
            None => Err(CairnError::validation(format!(
                "'{identifier}' has no parent container"
            ))),
        }
    }

    /// Builds the identifier of a child named `name` inside `container`.
    pub fn child(
        &self,
        container: &ResourceIdentifier,
        name: &str,
        is_container: bool,
    ) -> CairnResult<ResourceIdentifier> {
        if !container.is_container() {
            return Err(CairnError::validation(format!(
                "'{container}' is not a container"
            )));
        }
        if name.is_empty() || name.contains('/') {
            return Err(CairnError::validation(format!(
                "invalid resource name '{name}'"
            )));
        }

        let suffix = if is_container { "/" } else { "" };
        Ok(ResourceIdentifier::new(format!("{container}{name}{suffix}")))
    }

    /// Returns every container from the root down to the parent of `identifier`.
    pub fn ancestors(&self, identifier: &ResourceIdentifier) -> CairnResult<Vec<ResourceIdentifier>> {
        let mut chain = Vec::new();
        let mut current = identifier.clone();
        while !self.is_root(&current) {
            current = self.parent(&current)?;
            chain.push(current.clone());
        }
        chain.reverse();
        Ok(chain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strategy() -> IdentifierStrategy {
        IdentifierStrategy::new("http://localhost:3000/")
    }

    #[test]
    fn test_container_syntax() {
        assert!(ResourceIdentifier::new("http://localhost:3000/a/").is_container());
        assert!(!ResourceIdentifier::new("http://localhost:3000/a").is_container());
    }

    #[test]
    fn test_base_gets_trailing_slash() {
        let strategy = IdentifierStrategy::new("http://localhost:3000");
        assert_eq!(strategy.root().as_str(), "http://localhost:3000/");
    }

    #[test]
    fn test_parent_of_document_and_container() {
        let s = strategy();
        let doc = ResourceIdentifier::new("http://localhost:3000/a/b");
        let container = ResourceIdentifier::new("http://localhost:3000/a/b/");
        assert_eq!(s.parent(&doc).unwrap().as_str(), "http://localhost:3000/a/");
        assert_eq!(
            s.parent(&container).unwrap().as_str(),
            "http://localhost:3000/a/"
        );
    }

    #[test]
    fn test_root_has_no_parent() {
        let s = strategy();
        let root = s.root().clone();
        assert!(s.parent(&root).is_err());
    }

    #[test]
    fn test_outside_root_is_not_found() {
        let s = strategy();
        let foreign = ResourceIdentifier::new("http://example.org/x");
        let err = s.ensure_supported(&foreign).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_child_rejects_slash() {
        let s = strategy();
        let root = s.root().clone();
        assert!(s.child(&root, "a/b", false).is_err());
        assert_eq!(
            s.child(&root, "a", true).unwrap().as_str(),
            "http://localhost:3000/a/"
        );
    }

    #[test]
    fn test_ancestors() {
        let s = strategy();
        let id = ResourceIdentifier::new("http://localhost:3000/a/b/c");
        let ancestors = s.ancestors(&id).unwrap();
        let paths: Vec<&str> = ancestors.iter().map(ResourceIdentifier::as_str).collect();
        assert_eq!(
            paths,
            vec![
                "http://localhost:3000/",
                "http://localhost:3000/a/",
                "http://localhost:3000/a/b/"
            ]
        );
    }
}
