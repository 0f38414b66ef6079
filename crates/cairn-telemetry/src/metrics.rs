//! Prometheus metrics for Cairn.
//!
//! # Standard Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `cairn_store_operations_total` | Counter | `operation`, `outcome` | Store operations |
//! | `cairn_store_operation_duration_seconds` | Histogram | `operation` | Store latency |
//! | `cairn_authorization_decisions_total` | Counter | `allowed`, `reason` | Pipeline decisions |
//!
//! Recording without an installed recorder is a no-op.

use crate::error::TelemetryError;
use crate::TelemetryResult;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use std::sync::OnceLock;
use std::time::Duration;

/// Store operation counter.
pub const STORE_OPERATIONS_TOTAL: &str = "cairn_store_operations_total";
/// Store operation latency histogram.
pub const STORE_OPERATION_DURATION: &str = "cairn_store_operation_duration_seconds";
/// Authorization decision counter.
pub const AUTHORIZATION_DECISIONS_TOTAL: &str = "cairn_authorization_decisions_total";

/// Global metrics handle for rendering.
static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Metrics configuration.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Whether metrics are enabled.
    pub enabled: bool,

    /// Address of a scrape endpoint (e.g., "0.0.0.0:9090"). `None` keeps
    /// metrics in-process, readable through [`render_metrics`].
    pub addr: Option<String>,

    /// Histogram buckets for operation duration.
    pub duration_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            addr: None,
            // 1ms to 10s
            duration_buckets: vec![
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ],
        }
    }
}

/// Handle for rendering collected metrics.
#[derive(Debug, Clone)]
pub struct MetricsRegistry {
    handle: PrometheusHandle,
}

impl MetricsRegistry {
    /// Renders all metrics in Prometheus text format.
    #[must_use]
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Installs the Prometheus recorder.
///
/// With an `addr`, a scrape endpoint is spawned on the current Tokio runtime.
/// Returns `None` when metrics are disabled.
///
/// # Errors
///
/// Returns `TelemetryError::InvalidAddress` for an unparseable address and
/// `TelemetryError::MetricsInit` if a recorder is already installed.
pub fn init_metrics(config: &MetricsConfig) -> TelemetryResult<Option<MetricsRegistry>> {
    if !config.enabled {
        return Ok(None);
    }

    let mut builder = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(STORE_OPERATION_DURATION.to_string()),
            &config.duration_buckets,
        )
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;

    if let Some(addr) = &config.addr {
        let addr: SocketAddr = addr
            .parse()
            .map_err(|e| TelemetryError::InvalidAddress(format!("{addr}: {e}")))?;
        builder = builder.with_http_listener(addr);
    }

    let (recorder, exporter) = builder
        .build()
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    let handle = recorder.handle();
    metrics::set_global_recorder(recorder)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;

    if config.addr.is_some() {
        let runtime = tokio::runtime::Handle::try_current().map_err(|e| {
            TelemetryError::MetricsInit(format!("scrape endpoint needs a Tokio runtime: {e}"))
        })?;
        runtime.spawn(exporter);
    }

    let _ = METRICS_HANDLE.set(handle.clone());
    register_metric_descriptions();

    Ok(Some(MetricsRegistry { handle }))
}

/// Renders metrics in Prometheus format, or `None` if not initialized.
#[must_use]
pub fn render_metrics() -> Option<String> {
    METRICS_HANDLE.get().map(PrometheusHandle::render)
}

fn register_metric_descriptions() {
    describe_counter!(
        STORE_OPERATIONS_TOTAL,
        "Total resource store operations by outcome"
    );
    describe_histogram!(
        STORE_OPERATION_DURATION,
        "Resource store operation duration in seconds"
    );
    describe_counter!(
        AUTHORIZATION_DECISIONS_TOTAL,
        "Total authorization decisions by result"
    );
}

/// Records a completed store operation.
///
/// `outcome` is `"ok"` or an error code such as `"NOT_FOUND"`.
pub fn record_store_operation(operation: &str, outcome: &str, duration: Duration) {
    counter!(
        STORE_OPERATIONS_TOTAL,
        "operation" => operation.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);

    histogram!(
        STORE_OPERATION_DURATION,
        "operation" => operation.to_string()
    )
    .record(duration.as_secs_f64());
}

/// Records an authorization decision.
///
/// `reason` names the deciding stage or error code, e.g. `"granted"` or `"FORBIDDEN"`.
pub fn record_authorization(allowed: bool, reason: &str) {
    counter!(
        AUTHORIZATION_DECISIONS_TOTAL,
        "allowed" => allowed.to_string(),
        "reason" => reason.to_string()
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MetricsConfig::default();
        assert!(config.enabled);
        assert!(config.addr.is_none());
        assert!(!config.duration_buckets.is_empty());
    }

    #[test]
    fn test_record_functions_dont_panic() {
        record_store_operation("read", "ok", Duration::from_millis(3));
        record_store_operation("delete", "NOT_FOUND", Duration::from_millis(1));
        record_authorization(false, "UNAUTHORIZED");
    }

    #[test]
    fn test_disabled_metrics_install_nothing() {
        let config = MetricsConfig {
            enabled: false,
            ..MetricsConfig::default()
        };
        assert!(init_metrics(&config).unwrap().is_none());
    }

    #[test]
    fn test_invalid_address() {
        let config = MetricsConfig {
            addr: Some("not an address".to_string()),
            ..MetricsConfig::default()
        };
        assert!(matches!(
            init_metrics(&config),
            Err(TelemetryError::InvalidAddress(_))
        ));
    }
}
