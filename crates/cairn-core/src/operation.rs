//! The unit of work flowing through the authorization pipeline.
//!
//! A [`ResourceRequest`] is what arrives: an [`Operation`] plus raw headers.
//! The pipeline stages fill in the operation's credentials, required modes
//! and permissions before a downstream handler executes it.

use crate::conditions::Conditions;
use crate::credentials::CredentialSet;
use crate::identifier::ResourceIdentifier;
use crate::patch::Patch;
use crate::permissions::{ModeSet, PermissionSet};
use crate::representation::{Representation, RepresentationPreferences};
use http::HeaderMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// A unique identifier for each request, using UUID v7.
///
/// # Example
///
/// ```
/// use cairn_core::RequestId;
///
/// let id = RequestId::new();
/// println!("Request ID: {}", id);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new time-ordered request ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What the caller wants done to the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationKind {
    /// Fetch the current representation.
    Read,
    /// Add a new child to the target container.
    Create {
        /// The new child's representation.
        representation: Representation,
    },
    /// Replace or create the target.
    Replace {
        /// The new representation.
        representation: Representation,
    },
    /// Remove the target.
    Delete,
    /// Apply a patch to the target.
    Patch {
        /// The patch instruction.
        patch: Patch,
    },
}

impl OperationKind {
    /// Short name for logs and metrics.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Create { .. } => "create",
            Self::Replace { .. } => "replace",
            Self::Delete => "delete",
            Self::Patch { .. } => "patch",
        }
    }

    /// Returns `true` for every kind except `Read`.
    #[must_use]
    pub const fn is_mutation(&self) -> bool {
        !matches!(self, Self::Read)
    }
}

/// An operation on one target, enriched stage by stage.
#[derive(Debug, Clone)]
pub struct Operation {
    /// What to do.
    pub kind: OperationKind,
    /// The resource to do it to.
    pub target: ResourceIdentifier,
    /// Preconditions on the current state of `target`.
    pub conditions: Option<Arc<dyn Conditions>>,
    /// Preferences for any returned representation.
    pub preferences: RepresentationPreferences,
    /// Set by the credentials stage.
    pub credentials: CredentialSet,
    /// Set by the modes stage.
    pub modes: ModeSet,
    /// Set by the permissions stage.
    pub permissions: PermissionSet,
}

impl Operation {
    /// Creates an operation with no conditions and nothing resolved yet.
    #[must_use]
    pub fn new(kind: OperationKind, target: impl Into<ResourceIdentifier>) -> Self {
        Self {
            kind,
            target: target.into(),
            conditions: None,
            preferences: RepresentationPreferences::default(),
            credentials: CredentialSet::anonymous(),
            modes: ModeSet::new(),
            permissions: PermissionSet::deny_all(),
        }
    }

    /// Read `target`.
    #[must_use]
    pub fn read(target: impl Into<ResourceIdentifier>) -> Self {
        Self::new(OperationKind::Read, target)
    }

    /// Create a child of the `container`.
    #[must_use]
    pub fn create(container: impl Into<ResourceIdentifier>, representation: Representation) -> Self {
        Self::new(OperationKind::Create { representation }, container)
    }

    /// Replace `target`.
    #[must_use]
    pub fn replace(target: impl Into<ResourceIdentifier>, representation: Representation) -> Self {
        Self::new(OperationKind::Replace { representation }, target)
    }

    /// Delete `target`.
    #[must_use]
    pub fn delete(target: impl Into<ResourceIdentifier>) -> Self {
        Self::new(OperationKind::Delete, target)
    }

    /// Patch `target`.
    #[must_use]
    pub fn patch(target: impl Into<ResourceIdentifier>, patch: Patch) -> Self {
        Self::new(OperationKind::Patch { patch }, target)
    }

    /// Attaches preconditions.
    #[must_use]
    pub fn with_conditions(mut self, conditions: impl Conditions + 'static) -> Self {
        self.conditions = Some(Arc::new(conditions));
        self
    }

    /// Attaches read preferences.
    #[must_use]
    pub fn with_preferences(mut self, preferences: RepresentationPreferences) -> Self {
        self.preferences = preferences;
        self
    }

    /// Borrows the conditions as a trait object.
    #[must_use]
    pub fn conditions(&self) -> Option<&dyn Conditions> {
        self.conditions.as_deref()
    }
}

/// A raw inbound request: the operation plus transport headers.
#[derive(Debug, Clone)]
pub struct ResourceRequest {
    /// Correlation ID.
    pub request_id: RequestId,
    /// The requested operation.
    pub operation: Operation,
    /// Headers set by the transport or an authenticating proxy.
    pub headers: HeaderMap,
}

impl ResourceRequest {
    /// Wraps an operation with empty headers.
    #[must_use]
    pub fn new(operation: Operation) -> Self {
        Self {
            request_id: RequestId::new(),
            operation,
            headers: HeaderMap::new(),
        }
    }

    /// Replaces the headers.
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }
}

/// The result of executing an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationOutcome {
    /// A representation was read.
    Representation(Representation),
    /// A new resource was created.
    Created(ResourceIdentifier),
    /// These identifiers changed.
    Modified(Vec<ResourceIdentifier>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BasicConditions;

    #[test]
    fn test_new_operation_is_unresolved() {
        let operation = Operation::read("http://localhost:3000/a");
        assert!(operation.credentials.is_anonymous());
        assert!(operation.modes.is_empty());
        assert!(operation.conditions().is_none());
        assert!(!operation.kind.is_mutation());
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(Operation::delete("x").kind.name(), "delete");
        assert_eq!(
            Operation::replace("x", Representation::container()).kind.name(),
            "replace"
        );
    }

    #[test]
    fn test_conditions_attach() {
        let operation = Operation::delete("x").with_conditions(BasicConditions::if_match("1"));
        assert!(operation.conditions().is_some());
    }

    #[test]
    fn test_request_ids_are_unique() {
        assert_ne!(RequestId::new(), RequestId::new());
    }
}
