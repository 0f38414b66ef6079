//! Logging and metrics for Cairn.
//!
//! - **Logging**: structured JSON or pretty output through `tracing-subscriber`
//! - **Metrics**: Prometheus-format counters and histograms via the `metrics` crate
//!
//! Store decorators and the authorization pipeline call the `record_*`
//! functions unconditionally; they cost nothing until [`init_telemetry`] (or
//! [`init_metrics`]) installs a recorder.
//!
//! # Example
//!
//! ```rust,ignore
//! use cairn_telemetry::{TelemetryConfig, init_telemetry};
//!
//! let config = TelemetryConfig::builder()
//!     .service_name("cairn")
//!     .metrics_addr("0.0.0.0:9090")
//!     .build();
//!
//! let _guard = init_telemetry(config)?;
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![doc(html_root_url = "https://docs.rs/cairn-telemetry/0.1.0")]

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;

pub use config::{TelemetryConfig, TelemetryConfigBuilder};
pub use error::TelemetryError;
pub use logging::{init_logging, LogConfig};
pub use metrics::{
    init_metrics, record_authorization, record_store_operation, render_metrics, MetricsConfig,
    MetricsRegistry,
};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Keeps the installed telemetry reachable for the lifetime of the server.
#[derive(Debug)]
pub struct TelemetryGuard {
    registry: Option<MetricsRegistry>,
}

impl TelemetryGuard {
    /// Creates a new telemetry guard.
    #[must_use]
    pub fn new(registry: Option<MetricsRegistry>) -> Self {
        Self { registry }
    }

    /// The metrics registry, if metrics are enabled.
    #[must_use]
    pub fn metrics(&self) -> Option<&MetricsRegistry> {
        self.registry.as_ref()
    }
}

/// Initializes logging, then metrics.
///
/// # Errors
///
/// Returns `TelemetryError` if any subsystem fails to initialize.
pub fn init_telemetry(config: TelemetryConfig) -> TelemetryResult<TelemetryGuard> {
    init_logging(&config.logging)?;
    let registry = init_metrics(&config.metrics)?;

    ::tracing::info!(
        service = %config.service_name,
        metrics = registry.is_some(),
        "Telemetry initialized"
    );

    Ok(TelemetryGuard::new(registry))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_without_metrics() {
        let guard = TelemetryGuard::new(None);
        assert!(guard.metrics().is_none());
    }

    #[test]
    fn test_init_with_everything_disabled() {
        let config = TelemetryConfig::builder()
            .logging(LogConfig {
                enabled: false,
                ..LogConfig::default()
            })
            .metrics(MetricsConfig {
                enabled: false,
                ..MetricsConfig::default()
            })
            .build();

        let guard = init_telemetry(config).unwrap();
        assert!(guard.metrics().is_none());
    }
}
