//! The final decision.

use async_trait::async_trait;
use cairn_core::{
    CairnError, CairnResult, CredentialSet, ModeSet, PermissionSet, ResourceIdentifier,
};

/// Fourth stage: allow or deny.
#[async_trait]
pub trait Authorizer: Send + Sync {
    /// Succeeds if the operation may proceed.
    ///
    /// # Errors
    ///
    /// `Unauthorized` when an identity would be needed, `Forbidden` when the
    /// identity is known but insufficient.
    async fn authorize(
        &self,
        credentials: &CredentialSet,
        target: &ResourceIdentifier,
        modes: &ModeSet,
        permissions: &PermissionSet,
    ) -> CairnResult<()>;
}

/// Allows exactly when every required mode is granted.
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissionBasedAuthorizer;

impl PermissionBasedAuthorizer {
    /// Creates the authorizer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Authorizer for PermissionBasedAuthorizer {
    async fn authorize(
        &self,
        credentials: &CredentialSet,
        target: &ResourceIdentifier,
        modes: &ModeSet,
        permissions: &PermissionSet,
    ) -> CairnResult<()> {
        let Some(missing) = permissions.first_missing(modes) else {
            return Ok(());
        };

        if credentials.is_anonymous() {
            Err(CairnError::unauthorized(format!(
                "authentication required for {missing} access to '{target}'"
            )))
        } else {
            Err(CairnError::forbidden(format!(
                "{} lacks {missing} access to '{target}'",
                credentials.log_id()
            )))
        }
    }
}
