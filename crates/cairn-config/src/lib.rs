//! Typed configuration for Cairn.
//!
//! - TOML and JSON configuration files
//! - Environment variable overrides (`PREFIX__SECTION__KEY`)
//! - Strict parsing: unknown fields are errors
//! - Layering: defaults → file → env
//!
//! # Example
//!
//! ```no_run
//! use cairn_config::ConfigLoader;
//!
//! # fn main() -> Result<(), cairn_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_dotenv()
//!     .with_optional_file("cairn.toml")?
//!     .with_env_prefix("CAIRN")
//!     .load()?;
//!
//! println!("Serving resources under {}", config.server.base_url);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [server]
//! base_url = "https://pod.example/"
//!
//! [storage]
//! locking = true
//! validation = true
//! monitoring = true
//!
//! [authorization]
//! mode = "acl"
//! trusted_issuers = ["https://idp.example/"]
//!
//! [[authorization.rules]]
//! path = ""
//! agent = "public"
//! modes = ["read"]
//! inherit = true
//!
//! [[authorization.rules]]
//! path = ""
//! agent = "https://alice.example/profile#me"
//! modes = ["read", "write", "create", "delete", "control"]
//! inherit = true
//!
//! [telemetry]
//! service_name = "cairn"
//!
//! [telemetry.logging]
//! level = "info"
//! format = "json"
//!
//! [telemetry.metrics]
//! enabled = true
//! addr = "0.0.0.0:9090"
//! ```

#![doc(html_root_url = "https://docs.rs/cairn-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::{CairnConfig, CairnConfigBuilder};
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{
    AccessRuleConfig, AuthorizationConfig, AuthorizationMode, LogFormat, LoggingConfig,
    MetricsConfig, ServerConfig, StorageConfig, TelemetrySection,
};
