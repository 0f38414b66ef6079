//! Credential extraction.
//!
//! Cairn does not authenticate. An authenticating proxy in front of it
//! verifies the caller and forwards the result in headers, which
//! [`HeaderCredentialsExtractor`] turns into a [`CredentialSet`]. A request
//! without those headers is anonymous; that is never an error.

use async_trait::async_trait;
use cairn_core::{CairnError, CairnResult, Credential, CredentialSet, ResourceRequest};
use http::{HeaderMap, Uri};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Header names set by the authenticating proxy.
pub mod headers {
    /// The authenticated agent.
    pub const AGENT: &str = "x-agent-id";
    /// The client application.
    pub const CLIENT: &str = "x-client-id";
    /// Who issued the agent's token.
    pub const ISSUER: &str = "x-issuer";
}

/// First stage: who is asking.
#[async_trait]
pub trait CredentialsExtractor: Send + Sync {
    /// Extracts the caller's credentials.
    ///
    /// # Errors
    ///
    /// Only for malformed credential data; absence yields
    /// [`CredentialSet::anonymous`].
    async fn extract(&self, request: &ResourceRequest) -> CairnResult<CredentialSet>;
}

/// Reads `x-agent-id`, `x-client-id` and `x-issuer`.
///
/// Values must be absolute `http(s)` URLs. When trusted issuers are
/// configured, claims from any other issuer (or from none) are dropped and
/// the caller is anonymous.
#[derive(Debug, Clone, Default)]
pub struct HeaderCredentialsExtractor {
    trusted_issuers: BTreeSet<String>,
}

impl HeaderCredentialsExtractor {
    /// Trusts every issuer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Only accepts claims vouched for by one of `issuers`.
    #[must_use]
    pub fn with_trusted_issuers<I, S>(mut self, issuers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.trusted_issuers
            .extend(issuers.into_iter().map(Into::into));
        self
    }

    fn trusts(&self, issuer: Option<&Credential>) -> bool {
        if self.trusted_issuers.is_empty() {
            return true;
        }
        issuer.is_some_and(|issuer| self.trusted_issuers.contains(&issuer.id))
    }
}

fn header_credential(headers: &HeaderMap, name: &str) -> CairnResult<Option<Credential>> {
    let Some(value) = headers.get(name) else {
        return Ok(None);
    };
    let value = value
        .to_str()
        .map_err(|_| CairnError::validation(format!("header '{name}' is not visible ASCII")))?
        .trim();
    if value.is_empty() {
        return Ok(None);
    }

    let uri: Uri = value
        .parse()
        .map_err(|e| CairnError::validation(format!("header '{name}' is not a URL: {e}")))?;
    let absolute_http = matches!(uri.scheme_str(), Some("http" | "https")) && uri.host().is_some();
    if !absolute_http {
        return Err(CairnError::validation(format!(
            "header '{name}' must be an absolute http(s) URL, got '{value}'"
        )));
    }
    Ok(Some(Credential::new(value)))
}

#[async_trait]
impl CredentialsExtractor for HeaderCredentialsExtractor {
    async fn extract(&self, request: &ResourceRequest) -> CairnResult<CredentialSet> {
        let credentials = CredentialSet {
            agent: header_credential(&request.headers, headers::AGENT)?,
            client: header_credential(&request.headers, headers::CLIENT)?,
            issuer: header_credential(&request.headers, headers::ISSUER)?,
        };

        if credentials.is_anonymous() && credentials.client.is_none() {
            return Ok(CredentialSet::anonymous());
        }
        if !self.trusts(credentials.issuer.as_ref()) {
            tracing::debug!(
                issuer = ?credentials.issuer.as_ref().map(|i| i.id.as_str()),
                "dropping credentials from untrusted issuer"
            );
            return Ok(CredentialSet::anonymous());
        }
        Ok(credentials)
    }
}

/// Runs several extractors; the first value found for each field wins.
#[derive(Clone, Default)]
pub struct UnionCredentialsExtractor {
    extractors: Vec<Arc<dyn CredentialsExtractor>>,
}

impl UnionCredentialsExtractor {
    /// Creates an empty union, which always yields anonymous credentials.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an extractor.
    #[must_use]
    pub fn with(mut self, extractor: impl CredentialsExtractor + 'static) -> Self {
        self.extractors.push(Arc::new(extractor));
        self
    }
}

#[async_trait]
impl CredentialsExtractor for UnionCredentialsExtractor {
    async fn extract(&self, request: &ResourceRequest) -> CairnResult<CredentialSet> {
        let mut merged = CredentialSet::anonymous();
        for extractor in &self.extractors {
            let found = extractor.extract(request).await?;
            merged.agent = merged.agent.or(found.agent);
            merged.client = merged.client.or(found.client);
            merged.issuer = merged.issuer.or(found.issuer);
        }
        Ok(merged)
    }
}

impl std::fmt::Debug for UnionCredentialsExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnionCredentialsExtractor")
            .field("extractors", &self.extractors.len())
            .finish()
    }
}
