//! Configuration schema types.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Decision engine settings.
///
/// # Example
///
/// ```
/// use warden_config::WardenSection;
///
/// let section = WardenSection::default();
/// assert_eq!(section.access_token_lifespan().as_secs(), 3600);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct WardenSection {
    /// Issuer written into every authorization context.
    #[serde(default = "default_issuer")]
    pub issuer: String,

    /// Lifespan of access tokens without an explicit expiry, in seconds.
    #[serde(default = "default_access_token_lifespan")]
    pub access_token_lifespan_secs: u64,

    /// Upper bound on each collaborator call, in milliseconds.
    #[serde(default = "default_collaborator_timeout")]
    pub collaborator_timeout_ms: u64,
}

impl WardenSection {
    /// Access token lifespan as a duration.
    pub const fn access_token_lifespan(&self) -> Duration {
        Duration::from_secs(self.access_token_lifespan_secs)
    }

    /// Collaborator timeout as a duration.
    pub const fn collaborator_timeout(&self) -> Duration {
        Duration::from_millis(self.collaborator_timeout_ms)
    }
}

impl Default for WardenSection {
    fn default() -> Self {
        Self {
            issuer: default_issuer(),
            access_token_lifespan_secs: default_access_token_lifespan(),
            collaborator_timeout_ms: default_collaborator_timeout(),
        }
    }
}

fn default_issuer() -> String {
    "http://localhost:4444".to_string()
}

fn default_access_token_lifespan() -> u64 {
    3600
}

fn default_collaborator_timeout() -> u64 {
    5000
}

/// Log output format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// JSON lines.
    #[default]
    Json,
    /// Human-readable.
    Pretty,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Filter directive (e.g., "info", "warden=debug").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include file and line in log lines.
    #[serde(default)]
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::Json,
            include_location: false,
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

    /// Prometheus endpoint address. Unset or empty disables the listener.
    #[serde(default = "default_metrics_addr")]
    pub addr: Option<String>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            addr: default_metrics_addr(),
        }
    }
}

#[allow(clippy::unnecessary_wraps)]
fn default_metrics_addr() -> Option<String> {
    Some("0.0.0.0:9090".to_string())
}

/// Telemetry configuration section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TelemetryConfigSection {
    /// Service name.
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Metrics settings.
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl Default for TelemetryConfigSection {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            logging: LoggingConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl TelemetryConfigSection {
    /// Converts the section into the telemetry crate's runtime configuration.
    pub fn to_telemetry_config(&self) -> warden_telemetry::TelemetryConfig {
        let json_format = self.logging.format == LogFormat::Json;
        warden_telemetry::TelemetryConfig {
            service_name: self.service_name.clone(),
            logging: warden_telemetry::LogConfig {
                enabled: self.logging.enabled,
                level: self.logging.level.clone(),
                json_format,
                span_events: !json_format,
                file_line_info: self.logging.include_location,
                include_target: true,
            },
            metrics: warden_telemetry::MetricsConfig {
                enabled: self.metrics.enabled,
                addr: self.metrics.addr.clone().filter(|a| !a.is_empty()),
            },
        }
    }
}

fn default_service_name() -> String {
    "warden".to_string()
}

fn default_true() -> bool {
    true
}
