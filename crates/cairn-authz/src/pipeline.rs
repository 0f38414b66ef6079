//! The authorization orchestrator.
//!
//! # Pipeline
//!
//! ```text
//! ResourceRequest → [Credentials] → [Modes] → [Permissions] → [Authorize] → next handler
//! ```
//!
//! Stages run strictly in order. The first failing stage ends the request:
//! later stages, the next handler and therefore the store are never called.

use crate::{
    Authorizer, CredentialsExtractor, HeaderCredentialsExtractor, ModesExtractor,
    PermissionBasedAuthorizer, PermissionReader,
};
use cairn_core::{CairnError, CairnResult, OperationHandler, OperationOutcome, ResourceRequest};
use std::sync::Arc;
use tracing::Instrument;

/// The four authorization stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Credential extraction.
    Credentials,
    /// Required mode extraction.
    Modes,
    /// Permission reading.
    Permissions,
    /// The allow/deny decision.
    Authorize,
}

impl Stage {
    /// All stages in execution order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Credentials,
            Self::Modes,
            Self::Permissions,
            Self::Authorize,
        ]
    }

    /// Stage name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Credentials => "credentials",
            Self::Modes => "modes",
            Self::Permissions => "permissions",
            Self::Authorize => "authorize",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Authorizes requests, then forwards them to the next handler.
///
/// On success the operation reaches the next handler with its
/// `credentials`, `modes` and `permissions` filled in and otherwise
/// unchanged.
///
/// # Example
///
/// ```rust,ignore
/// use cairn_authz::{AuthorizingHandler, MethodModesExtractor, StaticPermissionReader};
///
/// let handler = AuthorizingHandler::builder()
///     .modes(MethodModesExtractor::new(store.clone()))
///     .permissions(StaticPermissionReader::grant_all())
///     .build(next)?;
///
/// let outcome = handler.handle(request).await?;
/// ```
#[derive(Clone)]
pub struct AuthorizingHandler {
    credentials: Arc<dyn CredentialsExtractor>,
    modes: Arc<dyn ModesExtractor>,
    permissions: Arc<dyn PermissionReader>,
    authorizer: Arc<dyn Authorizer>,
    next: Arc<dyn OperationHandler>,
}

impl AuthorizingHandler {
    /// Creates a builder.
    #[must_use]
    pub fn builder() -> AuthorizingHandlerBuilder {
        AuthorizingHandlerBuilder::default()
    }

    /// Runs the pipeline for one request.
    ///
    /// # Errors
    ///
    /// The first failing stage's error, unchanged, or the next handler's.
    pub async fn handle(&self, request: ResourceRequest) -> CairnResult<OperationOutcome> {
        let span = tracing::debug_span!(
            "authorize",
            request_id = %request.request_id,
            operation = request.operation.kind.name(),
            identifier = %request.operation.target,
        );
        self.run(request).instrument(span).await
    }

    async fn run(&self, request: ResourceRequest) -> CairnResult<OperationOutcome> {
        let credentials = self
            .credentials
            .extract(&request)
            .await
            .map_err(|e| denied(Stage::Credentials, e))?;
        tracing::debug!(stage = %Stage::Credentials, agent = %credentials.log_id(), "stage passed");

        let mut operation = request.operation;
        let modes = self
            .modes
            .extract(&operation)
            .await
            .map_err(|e| denied(Stage::Modes, e))?;
        tracing::debug!(stage = %Stage::Modes, modes = %modes, "stage passed");

        let permissions = self
            .permissions
            .read(&credentials, &operation.target, &modes)
            .await
            .map_err(|e| denied(Stage::Permissions, e))?;
        tracing::debug!(
            stage = %Stage::Permissions,
            granted = %permissions.granted(),
            "stage passed"
        );

        self.authorizer
            .authorize(&credentials, &operation.target, &modes, &permissions)
            .await
            .map_err(|e| denied(Stage::Authorize, e))?;
        tracing::debug!(stage = %Stage::Authorize, "access granted");
        cairn_telemetry::record_authorization(true, "granted");

        operation.credentials = credentials;
        operation.modes = modes;
        operation.permissions = permissions;
        self.next.handle(operation).await
    }
}

fn denied(stage: Stage, error: CairnError) -> CairnError {
    tracing::debug!(stage = %stage, error = %error, "authorization stopped");
    cairn_telemetry::record_authorization(false, error.category().code());
    error
}

impl std::fmt::Debug for AuthorizingHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizingHandler").finish_non_exhaustive()
    }
}

/// Builder for [`AuthorizingHandler`].
///
/// Credentials default to [`HeaderCredentialsExtractor`] trusting every
/// issuer and the authorizer to [`PermissionBasedAuthorizer`]. The modes
/// extractor and permission reader have no default.
#[derive(Default)]
pub struct AuthorizingHandlerBuilder {
    credentials: Option<Arc<dyn CredentialsExtractor>>,
    modes: Option<Arc<dyn ModesExtractor>>,
    permissions: Option<Arc<dyn PermissionReader>>,
    authorizer: Option<Arc<dyn Authorizer>>,
}

impl AuthorizingHandlerBuilder {
    /// Sets the credentials stage.
    #[must_use]
    pub fn credentials(mut self, extractor: impl CredentialsExtractor + 'static) -> Self {
        self.credentials = Some(Arc::new(extractor));
        self
    }

    /// Sets the modes stage.
    #[must_use]
    pub fn modes(mut self, extractor: impl ModesExtractor + 'static) -> Self {
        self.modes = Some(Arc::new(extractor));
        self
    }

    /// Sets the permissions stage.
    #[must_use]
    pub fn permissions(mut self, reader: impl PermissionReader + 'static) -> Self {
        self.permissions = Some(Arc::new(reader));
        self
    }

    /// Sets the authorize stage.
    #[must_use]
    pub fn authorizer(mut self, authorizer: impl Authorizer + 'static) -> Self {
        self.authorizer = Some(Arc::new(authorizer));
        self
    }

    /// Builds the handler forwarding to `next`.
    ///
    /// # Errors
    ///
    /// `Internal` if a stage without a default was not set.
    pub fn build(self, next: Arc<dyn OperationHandler>) -> CairnResult<AuthorizingHandler> {
        let missing = |stage: Stage| {
            CairnError::internal(format!("authorization pipeline has no {stage} stage"))
        };
        Ok(AuthorizingHandler {
            credentials: self
                .credentials
                .unwrap_or_else(|| Arc::new(HeaderCredentialsExtractor::new())),
            modes: self.modes.ok_or_else(|| missing(Stage::Modes))?,
            permissions: self.permissions.ok_or_else(|| missing(Stage::Permissions))?,
            authorizer: self
                .authorizer
                .unwrap_or_else(|| Arc::new(PermissionBasedAuthorizer::new())),
            next,
        })
    }
}

impl std::fmt::Debug for AuthorizingHandlerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizingHandlerBuilder")
            .field("modes", &self.modes.is_some())
            .field("permissions", &self.permissions.is_some())
            .finish_non_exhaustive()
    }
}
