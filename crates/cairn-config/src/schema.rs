//! Configuration schema types.
//!
//! Every section rejects unknown fields and fills missing ones with defaults.

use cairn_telemetry::{LogConfig, MetricsConfig as TelemetryMetrics, TelemetryConfig};
use serde::{Deserialize, Serialize};

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Root of the identifier space; an absolute `http(s)` URL ending in `/`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:3000/".to_string()
}

/// Which store decorators to stack over the backend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Per-identifier locking. Conditional writes and patches stay atomic
    /// without it; racing patches then fail with `PreconditionFailed`
    /// instead of queueing.
    #[serde(default = "default_true")]
    pub locking: bool,

    /// Reject malformed representations.
    #[serde(default = "default_true")]
    pub validation: bool,

    /// Log and measure every store operation.
    #[serde(default = "default_true")]
    pub monitoring: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            locking: true,
            validation: true,
            monitoring: true,
        }
    }
}

/// Where permissions come from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationMode {
    /// Every mode is granted to everyone.
    AllowAll,
    /// Nothing is granted.
    DenyAll,
    /// Permissions come from `rules`.
    #[default]
    Acl,
}

/// One access rule.
///
/// ```toml
/// [[authorization.rules]]
/// path = ""
/// agent = "public"
/// modes = ["read"]
/// inherit = true
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AccessRuleConfig {
    /// Resource path relative to `server.base_url` (`""` is the root).
    pub path: String,

    /// `public`, `authenticated`, or an agent URL.
    pub agent: String,

    /// Granted mode names (`read`, `append`, `create`, `write`, `delete`, `control`).
    #[serde(default)]
    pub modes: Vec<String>,

    /// Whether the rule also applies below a container path.
    #[serde(default)]
    pub inherit: bool,

    /// Attributes hidden from matching callers.
    #[serde(default)]
    pub hidden_attributes: Vec<String>,

    /// Attributes matching callers may not set.
    #[serde(default)]
    pub read_only_attributes: Vec<String>,
}

/// Authorization configuration section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct AuthorizationConfig {
    /// Permission source.
    #[serde(default)]
    pub mode: AuthorizationMode,

    /// Issuers whose credentials are accepted. Empty trusts all.
    #[serde(default)]
    pub trusted_issuers: Vec<String>,

    /// Access rules for `acl` mode.
    #[serde(default)]
    pub rules: Vec<AccessRuleConfig>,
}

/// Log format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON formatted logs (production).
    #[default]
    Json,
    /// Human-readable pretty format (development).
    Pretty,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Filter directive (e.g., "info" or "cairn_authz=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include ANSI color codes in output.
    #[serde(default)]
    pub ansi_enabled: bool,

    /// Include source file and line in logs.
    #[serde(default)]
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            ansi_enabled: false,
            include_location: false,
        }
    }
}

impl LoggingConfig {
    /// Converts to the telemetry crate's logging settings.
    #[must_use]
    pub fn to_log_config(&self) -> LogConfig {
        LogConfig {
            enabled: self.enabled,
            level: self.level.clone(),
            json_format: self.format == LogFormat::Json,
            ansi: self.ansi_enabled,
            file_line_info: self.include_location,
            include_target: true,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct MetricsConfig {
    /// Enable metrics collection.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Prometheus scrape endpoint address. Unset keeps metrics in-process.
    #[serde(default)]
    pub addr: Option<String>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            addr: None,
        }
    }
}

/// Telemetry configuration section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TelemetrySection {
    /// Service name reported at startup.
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Metrics settings.
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl Default for TelemetrySection {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            logging: LoggingConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl TelemetrySection {
    /// Converts to the settings [`cairn_telemetry::init_telemetry`] takes.
    #[must_use]
    pub fn to_telemetry_config(&self) -> TelemetryConfig {
        TelemetryConfig::builder()
            .service_name(&self.service_name)
            .logging(self.logging.to_log_config())
            .metrics(TelemetryMetrics {
                enabled: self.metrics.enabled,
                addr: self.metrics.addr.clone(),
                ..TelemetryMetrics::default()
            })
            .build()
    }
}

fn default_service_name() -> String {
    "cairn".to_string()
}

const fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_defaults_enable_everything() {
        let storage = StorageConfig::default();
        assert!(storage.locking && storage.validation && storage.monitoring);
    }

    #[test]
    fn test_authorization_mode_serde() {
        let mode: AuthorizationMode = serde_json::from_str("\"deny_all\"").unwrap();
        assert_eq!(mode, AuthorizationMode::DenyAll);
        assert_eq!(AuthorizationMode::default(), AuthorizationMode::Acl);
    }

    #[test]
    fn test_rule_defaults() {
        let rule: AccessRuleConfig =
            toml::from_str("path = \"docs/\"\nagent = \"public\"\nmodes = [\"read\"]").unwrap();
        assert!(!rule.inherit);
        assert!(rule.hidden_attributes.is_empty());
    }

    #[test]
    fn test_rule_rejects_unknown_fields() {
        let result: Result<AccessRuleConfig, _> =
            toml::from_str("path = \"\"\nagent = \"public\"\nowner = true");
        assert!(result.is_err());
    }

    #[test]
    fn test_logging_conversion() {
        let logging = LoggingConfig {
            format: LogFormat::Pretty,
            include_location: true,
            ..LoggingConfig::default()
        };
        let converted = logging.to_log_config();
        assert!(!converted.json_format);
        assert!(converted.file_line_info);
        assert_eq!(converted.level, "info");
    }

    #[test]
    fn test_telemetry_conversion() {
        let section = TelemetrySection {
            service_name: "pod".to_string(),
            metrics: MetricsConfig {
                enabled: true,
                addr: Some("127.0.0.1:9100".to_string()),
            },
            ..TelemetrySection::default()
        };
        let config = section.to_telemetry_config();
        assert_eq!(config.service_name, "pod");
        assert_eq!(config.metrics.addr.as_deref(), Some("127.0.0.1:9100"));
    }
}
