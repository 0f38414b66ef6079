//! Main configuration types.
//!
//! This module provides the top-level [`CairnConfig`] struct and its builder.

use cairn_core::AccessMode;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

use crate::{
    AuthorizationConfig, AuthorizationMode, ConfigError, LogFormat, ServerConfig, StorageConfig,
    TelemetrySection,
};

/// Complete Cairn server configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load configuration from files
/// and environment variables.
///
/// # Example
///
/// ```
/// use cairn_config::CairnConfig;
///
/// let config = CairnConfig::default();
/// assert_eq!(config.server.base_url, "http://localhost:3000/");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct CairnConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Store decorator selection.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Authorization configuration.
    #[serde(default)]
    pub authorization: AuthorizationConfig,

    /// Telemetry configuration (logging, metrics).
    #[serde(default)]
    pub telemetry: TelemetrySection,
}

impl CairnConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> CairnConfigBuilder {
        CairnConfigBuilder::new()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - `server.base_url` is not an absolute `http(s)` URL ending in `/`
    /// - the log filter does not parse
    /// - the metrics address is not a socket address
    /// - a rule names an unknown mode, a malformed agent or an absolute path
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_base_url(&self.server.base_url)?;

        if self.telemetry.logging.enabled {
            cairn_telemetry::logging::create_env_filter(&self.telemetry.logging.level)
                .map_err(|e| ConfigError::invalid_value("telemetry.logging.level", e.to_string()))?;
        }

        if let Some(addr) = &self.telemetry.metrics.addr {
            if addr.parse::<SocketAddr>().is_err() {
                return Err(ConfigError::invalid_value(
                    "telemetry.metrics.addr",
                    format!("invalid socket address: {addr}"),
                ));
            }
        }

        for issuer in &self.authorization.trusted_issuers {
            if !is_http_url(issuer) {
                return Err(ConfigError::invalid_value(
                    "authorization.trusted_issuers",
                    format!("'{issuer}' is not an http(s) URL"),
                ));
            }
        }

        for (index, rule) in self.authorization.rules.iter().enumerate() {
            let field = |name: &str| format!("authorization.rules[{index}].{name}");

            if rule.path.starts_with('/') || rule.path.contains("://") {
                return Err(ConfigError::invalid_value(
                    field("path"),
                    "must be relative to server.base_url",
                ));
            }
            if !matches!(rule.agent.as_str(), "public" | "authenticated") && !is_http_url(&rule.agent)
            {
                return Err(ConfigError::invalid_value(
                    field("agent"),
                    format!(
                        "expected 'public', 'authenticated' or an agent URL, got '{}'",
                        rule.agent
                    ),
                ));
            }
            for mode in &rule.modes {
                mode.parse::<AccessMode>()
                    .map_err(|e| ConfigError::invalid_value(field("modes"), e.to_string()))?;
            }
        }

        Ok(())
    }

    /// Development preset: pretty debug logs, everything allowed.
    ///
    /// ```
    /// use cairn_config::{AuthorizationMode, CairnConfig};
    ///
    /// let config = CairnConfig::development();
    /// assert_eq!(config.authorization.mode, AuthorizationMode::AllowAll);
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();

        config.telemetry.logging.level = "debug".to_string();
        config.telemetry.logging.format = LogFormat::Pretty;
        config.telemetry.logging.ansi_enabled = true;
        config.telemetry.logging.include_location = true;

        config.authorization.mode = AuthorizationMode::AllowAll;

        config
    }

    /// Production preset: JSON logs at `info`, ACL authorization.
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();

        config.telemetry.logging.level = "info".to_string();
        config.telemetry.logging.format = LogFormat::Json;
        config.telemetry.logging.ansi_enabled = false;

        config.authorization.mode = AuthorizationMode::Acl;

        config
    }
}

fn is_http_url(value: &str) -> bool {
    let rest = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"));
    rest.is_some_and(|rest| !rest.is_empty() && !rest.starts_with('/'))
}

fn validate_base_url(base_url: &str) -> Result<(), ConfigError> {
    if !is_http_url(base_url) {
        return Err(ConfigError::invalid_value(
            "server.base_url",
            format!("'{base_url}' is not an absolute http(s) URL"),
        ));
    }
    if !base_url.ends_with('/') {
        return Err(ConfigError::invalid_value(
            "server.base_url",
            format!("'{base_url}' must end with '/'"),
        ));
    }
    Ok(())
}

/// Builder for [`CairnConfig`].
#[derive(Debug, Default)]
pub struct CairnConfigBuilder {
    server: Option<ServerConfig>,
    storage: Option<StorageConfig>,
    authorization: Option<AuthorizationConfig>,
    telemetry: Option<TelemetrySection>,
}

impl CairnConfigBuilder {
    /// Create a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the server configuration.
    #[must_use]
    pub fn server(mut self, server: ServerConfig) -> Self {
        self.server = Some(server);
        self
    }

    /// Set the storage configuration.
    #[must_use]
    pub fn storage(mut self, storage: StorageConfig) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Set the authorization configuration.
    #[must_use]
    pub fn authorization(mut self, authorization: AuthorizationConfig) -> Self {
        self.authorization = Some(authorization);
        self
    }

    /// Set the telemetry configuration.
    #[must_use]
    pub fn telemetry(mut self, telemetry: TelemetrySection) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Build the configuration. Unset sections use their defaults.
    #[must_use]
    pub fn build(self) -> CairnConfig {
        CairnConfig {
            server: self.server.unwrap_or_default(),
            storage: self.storage.unwrap_or_default(),
            authorization: self.authorization.unwrap_or_default(),
            telemetry: self.telemetry.unwrap_or_default(),
        }
    }

    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if validation fails.
    pub fn build_validated(self) -> Result<CairnConfig, ConfigError> {
        let config = self.build();
        config.validate()?;
        Ok(config)
    }
}
