//! Wiring a complete resource server from configuration.

use crate::StoreOperationHandler;
use cairn_authz::{
    AccessRule, AclPermissionReader, AgentMatcher, AuthorizingHandler, HeaderCredentialsExtractor,
    MethodModesExtractor, PermissionReader, StaticPermissionReader,
};
use cairn_config::{AccessRuleConfig, AuthorizationMode, CairnConfig};
use cairn_core::{
    AccessMode, CairnResult, IdentifierStrategy, OperationOutcome, ResourceIdentifier,
    ResourceRequest,
};
use cairn_store::{
    InMemoryStore, LockingStore, MonitoringStore, PatchingStore, ResourceStore,
    SemanticUpdatePatcher, ValidatingStore, WaterfallPatcher,
};
use std::sync::Arc;

/// A store stack behind an authorization pipeline.
///
/// ```text
/// ResourceRequest → AuthorizingHandler → StoreOperationHandler → store stack
/// ```
///
/// The store stack, innermost first:
///
/// ```text
/// backend → Validating → Patching(Waterfall[SemanticUpdate]) → Locking → Monitoring
/// ```
///
/// `Validating`, `Locking` and `Monitoring` follow the `storage.*` flags.
///
/// # Example
///
/// ```rust,ignore
/// use cairn::{ConfigLoader, ResourceServer};
///
/// let config = ConfigLoader::new().with_env_prefix("CAIRN").load()?;
/// let _telemetry = cairn_telemetry::init_telemetry(config.telemetry.to_telemetry_config())?;
/// let server = ResourceServer::from_config(&config)?;
///
/// let outcome = server.handle(request).await?;
/// ```
#[derive(Clone)]
pub struct ResourceServer {
    strategy: IdentifierStrategy,
    store: Arc<dyn ResourceStore>,
    handler: AuthorizingHandler,
}

impl ResourceServer {
    /// Builds a server over a fresh [`InMemoryStore`].
    ///
    /// # Errors
    ///
    /// `Validation` if an access rule names an unknown mode.
    pub fn from_config(config: &CairnConfig) -> CairnResult<Self> {
        let strategy = IdentifierStrategy::new(config.server.base_url.as_str());
        let backend: Arc<dyn ResourceStore> = Arc::new(InMemoryStore::new(strategy.clone()));
        Self::with_backend(config, backend)
    }

    /// Builds a server over `backend`, which must accept identifiers under
    /// `server.base_url`.
    ///
    /// # Errors
    ///
    /// `Validation` if an access rule names an unknown mode.
    pub fn with_backend(config: &CairnConfig, backend: Arc<dyn ResourceStore>) -> CairnResult<Self> {
        let strategy = IdentifierStrategy::new(config.server.base_url.as_str());
        let store = build_store(config, &strategy, backend);
        let permissions = build_permissions(config, &strategy)?;

        let handler = AuthorizingHandler::builder()
            .credentials(
                HeaderCredentialsExtractor::new()
                    .with_trusted_issuers(config.authorization.trusted_issuers.iter()),
            )
            .modes(MethodModesExtractor::new(Arc::clone(&store)))
            .permissions(permissions)
            .build(Arc::new(StoreOperationHandler::new(Arc::clone(&store))))?;

        tracing::info!(
            base_url = %strategy.root(),
            mode = ?config.authorization.mode,
            rules = config.authorization.rules.len(),
            "Resource server ready"
        );

        Ok(Self {
            strategy,
            store,
            handler,
        })
    }

    /// Authorizes and executes one request.
    ///
    /// # Errors
    ///
    /// The authorization failure or the store error, unchanged.
    pub async fn handle(&self, request: ResourceRequest) -> CairnResult<OperationOutcome> {
        self.handler.handle(request).await
    }

    /// The store stack, bypassing authorization.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn ResourceStore> {
        &self.store
    }

    /// The identifier space this server answers for.
    #[must_use]
    pub fn strategy(&self) -> &IdentifierStrategy {
        &self.strategy
    }
}

impl std::fmt::Debug for ResourceServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceServer")
            .field("strategy", &self.strategy)
            .finish_non_exhaustive()
    }
}

fn build_store(
    config: &CairnConfig,
    strategy: &IdentifierStrategy,
    backend: Arc<dyn ResourceStore>,
) -> Arc<dyn ResourceStore> {
    let storage = &config.storage;
    let mut store = backend;

    if storage.validation {
        store = Arc::new(ValidatingStore::new(store, strategy.clone()));
    }
    let patcher = WaterfallPatcher::new(Vec::new()).with(SemanticUpdatePatcher::new());
    store = Arc::new(PatchingStore::new(store, Arc::new(patcher)));
    if storage.locking {
        store = Arc::new(LockingStore::new(store));
    }
    if storage.monitoring {
        store = Arc::new(MonitoringStore::new(store));
    }
    store
}

fn build_permissions(
    config: &CairnConfig,
    strategy: &IdentifierStrategy,
) -> CairnResult<Arc<dyn PermissionReader>> {
    Ok(match config.authorization.mode {
        AuthorizationMode::AllowAll => Arc::new(StaticPermissionReader::grant_all()),
        AuthorizationMode::DenyAll => Arc::new(StaticPermissionReader::deny_all()),
        AuthorizationMode::Acl => {
            let mut reader = AclPermissionReader::new();
            for rule in &config.authorization.rules {
                reader = reader.rule(access_rule(strategy, rule)?);
            }
            Arc::new(reader)
        }
    })
}

fn access_rule(strategy: &IdentifierStrategy, config: &AccessRuleConfig) -> CairnResult<AccessRule> {
    let target = ResourceIdentifier::new(format!("{}{}", strategy.root(), config.path));
    let agent = match config.agent.as_str() {
        "public" => AgentMatcher::Public,
        "authenticated" => AgentMatcher::Authenticated,
        id => AgentMatcher::Agent(id.to_string()),
    };
    let modes = config
        .modes
        .iter()
        .map(|mode| mode.parse::<AccessMode>())
        .collect::<CairnResult<Vec<_>>>()?;

    let mut rule = AccessRule::new(target, agent).granting(modes);
    if config.inherit {
        rule = rule.inherited();
    }
    for attribute in &config.hidden_attributes {
        rule = rule.hiding(attribute.as_str());
    }
    for attribute in &config.read_only_attributes {
        rule = rule.read_only(attribute.as_str());
    }
    Ok(rule)
}
