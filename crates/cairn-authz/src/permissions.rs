//! Permission readers.
//!
//! A [`PermissionReader`] answers "what may these credentials do to this
//! resource". [`AclPermissionReader`] evaluates access rules:
//!
//! ```rust,ignore
//! use cairn_authz::{AccessRule, AclPermissionReader, AgentMatcher};
//!
//! let reader = AclPermissionReader::new()
//!     .rule(
//!         AccessRule::new(root.clone(), AgentMatcher::Public)
//!             .granting([AccessMode::Read])
//!             .inherited(),
//!     )
//!     .rule(
//!         AccessRule::new(root, AgentMatcher::Agent(owner))
//!             .granting(AccessMode::all().iter().copied())
//!             .inherited(),
//!     );
//! ```

use async_trait::async_trait;
use cairn_core::{
    AccessMode, CairnResult, CredentialSet, ModeSet, PermissionSet, ResourceIdentifier,
};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Third stage: what the caller is granted.
#[async_trait]
pub trait PermissionReader: Send + Sync {
    /// Reads the permissions `credentials` hold on `target`.
    ///
    /// `modes` are the modes the operation requires; readers may use them to
    /// limit work but must not grant based on them.
    async fn read(
        &self,
        credentials: &CredentialSet,
        target: &ResourceIdentifier,
        modes: &ModeSet,
    ) -> CairnResult<PermissionSet>;
}

#[async_trait]
impl<T: PermissionReader + ?Sized> PermissionReader for Arc<T> {
    async fn read(
        &self,
        credentials: &CredentialSet,
        target: &ResourceIdentifier,
        modes: &ModeSet,
    ) -> CairnResult<PermissionSet> {
        (**self).read(credentials, target, modes).await
    }
}

/// Returns the same permissions for everyone and everything.
#[derive(Debug, Clone)]
pub struct StaticPermissionReader {
    permissions: PermissionSet,
}

impl StaticPermissionReader {
    /// Returns `permissions` for every request.
    #[must_use]
    pub fn new(permissions: PermissionSet) -> Self {
        Self { permissions }
    }

    /// Grants every mode.
    #[must_use]
    pub fn grant_all() -> Self {
        Self::new(PermissionSet::grant_all())
    }

    /// Grants nothing.
    #[must_use]
    pub fn deny_all() -> Self {
        Self::new(PermissionSet::deny_all())
    }
}

#[async_trait]
impl PermissionReader for StaticPermissionReader {
    async fn read(
        &self,
        _credentials: &CredentialSet,
        _target: &ResourceIdentifier,
        _modes: &ModeSet,
    ) -> CairnResult<PermissionSet> {
        Ok(self.permissions.clone())
    }
}

/// Who an [`AccessRule`] applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentMatcher {
    /// Everyone, including anonymous callers.
    Public,
    /// Any caller with an agent.
    Authenticated,
    /// One agent.
    Agent(String),
    /// Any agent acting through one client application.
    Client(String),
}

impl AgentMatcher {
    /// Returns `true` if the rule applies to `credentials`.
    #[must_use]
    pub fn matches(&self, credentials: &CredentialSet) -> bool {
        match self {
            Self::Public => true,
            Self::Authenticated => !credentials.is_anonymous(),
            Self::Agent(id) => credentials.agent.as_ref().is_some_and(|a| &a.id == id),
            Self::Client(id) => credentials.client.as_ref().is_some_and(|c| &c.id == id),
        }
    }
}

/// One access-control entry.
#[derive(Debug, Clone)]
pub struct AccessRule {
    /// The resource the rule is attached to.
    pub target: ResourceIdentifier,
    /// Who it applies to.
    pub agent: AgentMatcher,
    /// What it grants.
    pub modes: ModeSet,
    /// Whether it also covers everything below a container target.
    pub inherit: bool,
    /// Attributes hidden from matching callers.
    pub hidden_attributes: BTreeSet<String>,
    /// Attributes matching callers may not set.
    pub read_only_attributes: BTreeSet<String>,
}

impl AccessRule {
    /// A rule granting nothing yet.
    #[must_use]
    pub fn new(target: impl Into<ResourceIdentifier>, agent: AgentMatcher) -> Self {
        Self {
            target: target.into(),
            agent,
            modes: ModeSet::new(),
            inherit: false,
            hidden_attributes: BTreeSet::new(),
            read_only_attributes: BTreeSet::new(),
        }
    }

    /// Adds granted modes.
    #[must_use]
    pub fn granting(mut self, modes: impl IntoIterator<Item = AccessMode>) -> Self {
        for mode in modes {
            self.modes.insert(mode);
        }
        self
    }

    /// Applies the rule to descendants of a container target.
    #[must_use]
    pub const fn inherited(mut self) -> Self {
        self.inherit = true;
        self
    }

    /// Hides `attribute` from matching callers.
    #[must_use]
    pub fn hiding(mut self, attribute: impl Into<String>) -> Self {
        self.hidden_attributes.insert(attribute.into());
        self
    }

    /// Makes `attribute` read-only for matching callers.
    #[must_use]
    pub fn read_only(mut self, attribute: impl Into<String>) -> Self {
        self.read_only_attributes.insert(attribute.into());
        self
    }

    fn covers(&self, target: &ResourceIdentifier) -> bool {
        if self.target == *target {
            return true;
        }
        self.inherit
            && self.target.is_container()
            && target.as_str().starts_with(self.target.as_str())
    }

    fn permissions(&self) -> PermissionSet {
        let mut permissions = PermissionSet::granting(self.modes.iter());
        if self.modes.contains(AccessMode::Write) {
            permissions.set(AccessMode::Append, true);
        }
        permissions.hidden_attributes = self.hidden_attributes.clone();
        permissions.read_only_attributes = self.read_only_attributes.clone();
        permissions
    }
}

/// Evaluates [`AccessRule`]s.
///
/// Every rule that covers the target and matches the credentials
/// contributes: grants are OR-ed, attribute restrictions accumulate.
/// `Write` implies `Append`. No matching rule means nothing is granted.
#[derive(Debug, Clone, Default)]
pub struct AclPermissionReader {
    rules: Vec<AccessRule>,
}

impl AclPermissionReader {
    /// A reader with no rules.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule.
    #[must_use]
    pub fn rule(mut self, rule: AccessRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// The configured rules.
    #[must_use]
    pub fn rules(&self) -> &[AccessRule] {
        &self.rules
    }
}

#[async_trait]
impl PermissionReader for AclPermissionReader {
    async fn read(
        &self,
        credentials: &CredentialSet,
        target: &ResourceIdentifier,
        _modes: &ModeSet,
    ) -> CairnResult<PermissionSet> {
        let mut permissions = PermissionSet::deny_all();
        let mut matched = 0_usize;
        for rule in self
            .rules
            .iter()
            .filter(|rule| rule.covers(target) && rule.agent.matches(credentials))
        {
            permissions.merge(&rule.permissions());
            matched += 1;
        }

        tracing::trace!(
            identifier = %target,
            agent = %credentials.log_id(),
            rules = matched,
            granted = %permissions.granted(),
            "read permissions"
        );
        Ok(permissions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cairn_core::fixtures;

    fn reader() -> AclPermissionReader {
        AclPermissionReader::new()
            .rule(
                AccessRule::new(fixtures::root(), AgentMatcher::Public)
                    .granting([AccessMode::Read])
                    .inherited()
                    .hiding("internal-note"),
            )
            .rule(
                AccessRule::new(fixtures::root(), AgentMatcher::Agent(fixtures::ALICE.into()))
                    .granting([AccessMode::Write, AccessMode::Create, AccessMode::Delete])
                    .inherited(),
            )
            .rule(
                AccessRule::new(fixtures::id("private/"), AgentMatcher::Authenticated)
                    .granting([AccessMode::Append])
                    .read_only("owner"),
            )
    }

    async fn read(credentials: &CredentialSet, target: &ResourceIdentifier) -> PermissionSet {
        reader()
            .read(credentials, target, &ModeSet::new())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_public_inherited_read() {
        let permissions = read(&CredentialSet::anonymous(), &fixtures::id("a/b/c")).await;
        assert_eq!(permissions.granted(), ModeSet::from([AccessMode::Read]));
        assert!(permissions.hidden_attributes.contains("internal-note"));
    }

    #[tokio::test]
    async fn test_write_implies_append() {
        let permissions = read(&fixtures::alice(), &fixtures::document()).await;
        assert!(permissions.is_granted(AccessMode::Append));
        assert!(permissions.is_granted(AccessMode::Write));
        assert!(!permissions.is_granted(AccessMode::Control));
    }

    #[tokio::test]
    async fn test_non_inherited_rule_only_covers_target() {
        let bob = fixtures::bob();
        let on_container = read(&bob, &fixtures::id("private/")).await;
        assert!(on_container.is_granted(AccessMode::Append));
        assert!(on_container.read_only_attributes.contains("owner"));

        let below = read(&bob, &fixtures::id("private/file")).await;
        assert!(!below.is_granted(AccessMode::Append));
        assert!(below.read_only_attributes.is_empty());
    }

    #[tokio::test]
    async fn test_static_readers() {
        let target = fixtures::document();
        let modes = ModeSet::from([AccessMode::Read]);
        let granted = StaticPermissionReader::grant_all()
            .read(&CredentialSet::anonymous(), &target, &modes)
            .await
            .unwrap();
        assert!(granted.first_missing(&modes).is_none());

        let denied = StaticPermissionReader::deny_all()
            .read(&fixtures::alice(), &target, &modes)
            .await
            .unwrap();
        assert_eq!(denied.first_missing(&modes), Some(AccessMode::Read));
    }

    #[test]
    fn test_agent_matchers() {
        let alice = fixtures::alice().with_client("https://app.example/");
        assert!(AgentMatcher::Public.matches(&CredentialSet::anonymous()));
        assert!(!AgentMatcher::Authenticated.matches(&CredentialSet::anonymous()));
        assert!(AgentMatcher::Authenticated.matches(&alice));
        assert!(AgentMatcher::Agent(fixtures::ALICE.into()).matches(&alice));
        assert!(!AgentMatcher::Agent(fixtures::BOB.into()).matches(&alice));
        assert!(AgentMatcher::Client("https://app.example/".into()).matches(&alice));
    }
}
