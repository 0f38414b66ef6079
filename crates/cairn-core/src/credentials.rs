//! Identity claims extracted from a request.

use serde::{Deserialize, Serialize};

/// A single identity claim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Credential {
    /// The claimed identifier (a WebID-style URL for agents and clients).
    pub id: String,
}

impl Credential {
    /// Creates a credential for `id`.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Identity claims for one request. Every field is optional; an empty set is
/// the anonymous caller.
///
/// # Example
///
/// ```
/// use cairn_core::CredentialSet;
///
/// let anonymous = CredentialSet::anonymous();
/// assert!(anonymous.is_anonymous());
/// assert_eq!(anonymous.log_id(), "anonymous");
///
/// let alice = CredentialSet::agent("https://alice.example/profile#me");
/// assert_eq!(alice.log_id(), "agent:https://alice.example/profile#me");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialSet {
    /// The acting agent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent: Option<Credential>,
    /// The application acting for the agent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client: Option<Credential>,
    /// Who vouched for the claims.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<Credential>,
}

impl CredentialSet {
    /// The anonymous caller.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Credentials for a single agent.
    #[must_use]
    pub fn agent(id: impl Into<String>) -> Self {
        Self {
            agent: Some(Credential::new(id)),
            ..Self::default()
        }
    }

    /// Adds a client claim.
    #[must_use]
    pub fn with_client(mut self, id: impl Into<String>) -> Self {
        self.client = Some(Credential::new(id));
        self
    }

    /// Adds an issuer claim.
    #[must_use]
    pub fn with_issuer(mut self, id: impl Into<String>) -> Self {
        self.issuer = Some(Credential::new(id));
        self
    }

    /// Returns `true` if no agent is identified.
    #[must_use]
    pub const fn is_anonymous(&self) -> bool {
        self.agent.is_none()
    }

    /// Returns a string identifier suitable for logging.
    #[must_use]
    pub fn log_id(&self) -> String {
        match (&self.agent, &self.client) {
            (Some(agent), Some(client)) => format!("agent:{} client:{}", agent.id, client.id),
            (Some(agent), None) => format!("agent:{}", agent.id),
            (None, Some(client)) => format!("client:{}", client.id),
            (None, None) => "anonymous".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_only_is_anonymous() {
        let credentials = CredentialSet::default().with_client("https://app.example/");
        assert!(credentials.is_anonymous());
        assert_eq!(credentials.log_id(), "client:https://app.example/");
    }

    #[test]
    fn test_serialization_skips_missing_claims() {
        let credentials = CredentialSet::agent("https://a.example/#me");
        let json = serde_json::to_string(&credentials).expect("serialization should work");
        assert_eq!(json, r#"{"agent":{"id":"https://a.example/#me"}}"#);
    }
}
