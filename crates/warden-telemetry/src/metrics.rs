//! Prometheus metrics for the Warden.
//!
//! Decision events are named the way the engine emits them
//! (`Warden.IsAllowed.Success`) and exported as Prometheus counters:
//!
//! | Event | Metric | Labels |
//! |-------|--------|--------|
//! | `Warden.IsAllowed.Success` | `warden_is_allowed_success_total` | `client_id`, `resource` |
//! | `Warden.IsAllowed.Failure` | `warden_is_allowed_failure_total` | `client_id`, `resource`, `reason` |
//! | `Warden.TokenAllowed.Success` | `warden_token_allowed_success_total` | `client_id`, `resource`, `action` |
//! | `Warden.TokenAllowed.Failure` | `warden_token_allowed_failure_total` | `client_id`, `resource`, `action`, `reason` |

use std::net::SocketAddr;
use std::sync::OnceLock;

use metrics::{counter, describe_counter, Label};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use warden_core::{MetricsSink, Tags};

use crate::error::TelemetryError;
use crate::TelemetryResult;

/// Global metrics handle for rendering.
static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Counters the warden emits, as event names.
pub const DECISION_EVENTS: [&str; 4] = [
    "Warden.IsAllowed.Success",
    "Warden.IsAllowed.Failure",
    "Warden.TokenAllowed.Success",
    "Warden.TokenAllowed.Failure",
];

/// Metrics configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsConfig {
    /// Whether metrics are enabled.
    pub enabled: bool,

    /// Address to serve `/metrics` on (e.g., "0.0.0.0:9090"). `None` installs
    /// the recorder without a listener; use [`render_metrics`] to scrape.
    pub addr: Option<String>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            addr: Some("0.0.0.0:9090".to_string()),
        }
    }
}

/// Installs the global Prometheus recorder.
///
/// When `addr` is set the HTTP listener is spawned on the current tokio
/// runtime, so this must then be called from within one.
///
/// # Errors
///
/// Returns `TelemetryError::InvalidAddress` for an unparsable address and
/// `TelemetryError::MetricsInit` if a recorder is already installed.
pub fn init_metrics(config: &MetricsConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let handle = match &config.addr {
        Some(addr) => {
            let addr: SocketAddr = addr
                .parse()
                .map_err(|e| TelemetryError::InvalidAddress(format!("{addr}: {e}")))?;

            let (recorder, exporter) = PrometheusBuilder::new()
                .with_http_listener(addr)
                .build()
                .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
            let handle = recorder.handle();
            metrics::set_global_recorder(recorder)
                .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
            tokio::spawn(exporter);
            handle
        }
        None => PrometheusBuilder::new()
            .install_recorder()
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?,
    };

    let _ = METRICS_HANDLE.set(handle);
    register_metric_descriptions();

    Ok(())
}

/// Renders metrics in Prometheus format.
///
/// Returns `None` if metrics are not initialized.
#[must_use]
pub fn render_metrics() -> Option<String> {
    METRICS_HANDLE.get().map(PrometheusHandle::render)
}

fn register_metric_descriptions() {
    describe_counter!(
        metric_name("Warden.IsAllowed.Success"),
        "Pre-authenticated requests allowed"
    );
    describe_counter!(
        metric_name("Warden.IsAllowed.Failure"),
        "Pre-authenticated requests denied or failed"
    );
    describe_counter!(
        metric_name("Warden.TokenAllowed.Success"),
        "Token requests allowed"
    );
    describe_counter!(
        metric_name("Warden.TokenAllowed.Failure"),
        "Token requests rejected at introspection or denied by policy"
    );
}

/// Converts a dotted event name into a Prometheus counter name.
///
/// ```
/// use warden_telemetry::metrics::metric_name;
///
/// assert_eq!(metric_name("Warden.TokenAllowed.Failure"), "warden_token_allowed_failure_total");
/// ```
pub fn metric_name(event: &str) -> String {
    let mut name = String::with_capacity(event.len() + 8);
    for segment in event.split('.').filter(|s| !s.is_empty()) {
        if !name.is_empty() {
            name.push('_');
        }
        let mut prev_lower = false;
        for c in segment.chars() {
            if c.is_ascii_alphanumeric() {
                if c.is_ascii_uppercase() && prev_lower {
                    name.push('_');
                }
                prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
                name.push(c.to_ascii_lowercase());
            } else {
                name.push('_');
                prev_lower = false;
            }
        }
    }
    name.push_str("_total");
    name
}

/// [`MetricsSink`] backed by the global `metrics` recorder.
///
/// Without an installed recorder increments are dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrometheusMetricsSink;

impl PrometheusMetricsSink {
    /// Creates the sink.
    pub const fn new() -> Self {
        Self
    }
}

impl MetricsSink for PrometheusMetricsSink {
    fn increment(&self, event: &str, tags: &Tags) {
        let labels: Vec<Label> = tags
            .iter()
            .map(|(key, value)| Label::new(*key, value.clone()))
            .collect();
        counter!(metric_name(event), labels).increment(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names() {
        assert_eq!(
            metric_name("Warden.IsAllowed.Success"),
            "warden_is_allowed_success_total"
        );
        assert_eq!(
            metric_name("Warden.TokenAllowed.Failure"),
            "warden_token_allowed_failure_total"
        );
        assert_eq!(metric_name("cache.hit-rate"), "cache_hit_rate_total");
    }

    #[test]
    fn test_every_event_has_distinct_name() {
        let mut names: Vec<_> = DECISION_EVENTS.iter().map(|e| metric_name(e)).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), DECISION_EVENTS.len());
    }

    #[test]
    fn test_default_config() {
        let config = MetricsConfig::default();
        assert!(config.enabled);
        assert_eq!(config.addr.as_deref(), Some("0.0.0.0:9090"));
    }

    #[test]
    fn test_invalid_address() {
        let config = MetricsConfig {
            enabled: true,
            addr: Some("not an address".to_string()),
        };
        assert!(matches!(
            init_metrics(&config),
            Err(TelemetryError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_sink_without_recorder_does_not_panic() {
        let mut tags = Tags::new();
        tags.insert("client_id", "alice".to_string());
        PrometheusMetricsSink::new().increment("Warden.IsAllowed.Success", &tags);
    }

    #[test]
    fn test_disabled_metrics() {
        let config = MetricsConfig {
            enabled: false,
            addr: None,
        };
        assert!(init_metrics(&config).is_ok());
    }
}
