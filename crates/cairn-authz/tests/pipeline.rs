//! Control flow of the authorization pipeline with substituted stages.

use async_trait::async_trait;
use cairn_authz::{
    AccessRule, AclPermissionReader, AgentMatcher, Authorizer, AuthorizingHandler,
    CredentialsExtractor, HeaderCredentialsExtractor, MethodModesExtractor, ModesExtractor,
    StaticPermissionReader,
};
use cairn_core::{
    AccessMode, CairnError, CairnResult, CredentialSet, ErrorCategory, ModeSet, Operation,
    OperationHandler, OperationOutcome, PermissionSet, RepresentationPreferences,
    ResourceIdentifier, ResourceRequest,
};
use cairn_store::{InMemoryStore, ResourceStore};
use cairn_test::{fixtures, RecordingHandler, RecordingStore};
use http::{HeaderMap, HeaderValue};
use std::sync::Arc;

#[derive(Debug)]
struct DenyingAuthorizer;

#[async_trait]
impl Authorizer for DenyingAuthorizer {
    async fn authorize(
        &self,
        _credentials: &CredentialSet,
        target: &ResourceIdentifier,
        _modes: &ModeSet,
        _permissions: &PermissionSet,
    ) -> CairnResult<()> {
        Err(CairnError::forbidden(format!("no access to '{target}'")))
    }
}

#[derive(Debug)]
struct BrokenCredentials;

#[async_trait]
impl CredentialsExtractor for BrokenCredentials {
    async fn extract(&self, _request: &ResourceRequest) -> CairnResult<CredentialSet> {
        Err(CairnError::validation("garbled token"))
    }
}

#[derive(Debug)]
struct PanickingModes;

#[async_trait]
impl ModesExtractor for PanickingModes {
    async fn extract(&self, _operation: &Operation) -> CairnResult<ModeSet> {
        panic!("modes stage must not run after a credentials failure");
    }
}

/// Reads from the store, the way the real downstream handler would.
struct ReadingHandler {
    store: Arc<dyn ResourceStore>,
}

#[async_trait]
impl OperationHandler for ReadingHandler {
    async fn handle(&self, operation: Operation) -> CairnResult<OperationOutcome> {
        let representation = self
            .store
            .get_representation(&operation.target, &RepresentationPreferences::default(), None)
            .await?;
        Ok(OperationOutcome::Representation(representation))
    }
}

fn recording_store() -> Arc<RecordingStore> {
    let memory: Arc<dyn ResourceStore> = Arc::new(InMemoryStore::new(fixtures::strategy()));
    Arc::new(RecordingStore::new(memory))
}

fn request_as(agent: &str, operation: Operation) -> ResourceRequest {
    let mut headers = HeaderMap::new();
    headers.insert("x-agent-id", HeaderValue::from_str(agent).unwrap());
    ResourceRequest::new(operation).with_headers(headers)
}

#[tokio::test]
async fn test_failed_authorize_never_reaches_handler() {
    let store = recording_store();
    let next = Arc::new(RecordingHandler::new());
    let handler = AuthorizingHandler::builder()
        .modes(MethodModesExtractor::new(store.clone()))
        .permissions(StaticPermissionReader::grant_all())
        .authorizer(DenyingAuthorizer)
        .build(next.clone())
        .unwrap();

    let err = handler
        .handle(request_as(fixtures::ALICE, Operation::delete(fixtures::document())))
        .await
        .unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Forbidden);
    assert!(!next.was_called());
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn test_failed_credentials_stop_before_modes() {
    let next = Arc::new(RecordingHandler::new());
    let handler = AuthorizingHandler::builder()
        .credentials(BrokenCredentials)
        .modes(PanickingModes)
        .permissions(StaticPermissionReader::grant_all())
        .build(next.clone())
        .unwrap();

    let err = handler
        .handle(ResourceRequest::new(Operation::read(fixtures::document())))
        .await
        .unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Validation);
    assert!(!next.was_called());
}

#[tokio::test]
async fn test_anonymous_read_denied() {
    let store = recording_store();
    let handler = AuthorizingHandler::builder()
        .credentials(HeaderCredentialsExtractor::new())
        .modes(MethodModesExtractor::new(store.clone()))
        .permissions(StaticPermissionReader::deny_all())
        .build(Arc::new(ReadingHandler {
            store: store.clone(),
        }))
        .unwrap();

    let err = handler
        .handle(ResourceRequest::new(Operation::read(fixtures::document())))
        .await
        .unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Unauthorized);
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn test_acl_grants_owner_and_forbids_others() {
    let store = recording_store();
    let reader = AclPermissionReader::new().rule(
        AccessRule::new(fixtures::root(), AgentMatcher::Agent(fixtures::ALICE.into()))
            .granting(AccessMode::all().iter().copied())
            .inherited(),
    );
    let next = Arc::new(RecordingHandler::new());
    let handler = AuthorizingHandler::builder()
        .modes(MethodModesExtractor::new(store.clone()))
        .permissions(reader)
        .build(next.clone())
        .unwrap();

    let replace = || Operation::replace(fixtures::document(), fixtures::text("hi"));

    handler
        .handle(request_as(fixtures::ALICE, replace()))
        .await
        .unwrap();
    let forwarded = next.operations();
    assert_eq!(
        forwarded[0].modes,
        ModeSet::from([AccessMode::Append, AccessMode::Create])
    );
    assert_eq!(forwarded[0].credentials, fixtures::alice());

    let err = handler
        .handle(request_as(fixtures::BOB, replace()))
        .await
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Forbidden);
    assert_eq!(next.operations().len(), 1);
}
