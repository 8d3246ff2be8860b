//! # Warden Telemetry
//!
//! Observability for the Warden authorization engine:
//!
//! - **Logging**: structured JSON or pretty output via `tracing-subscriber`
//! - **Metrics**: Prometheus counters via the `metrics` crate, exposed to the
//!   engine as [`PrometheusMetricsSink`]
//! - **Audit**: one log line per decision via [`TracingAuditSink`]
//!
//! # Example
//!
//! ```rust,ignore
//! use warden_telemetry::{init_telemetry, TelemetryConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let _ = init_telemetry(&TelemetryConfig::production("warden"));
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/warden-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod audit;
pub mod error;
pub mod logging;
pub mod metrics;

pub use audit::{TracingAuditSink, AUDIT_TARGET};
pub use error::TelemetryError;
pub use logging::{init_logging, LogConfig};
pub use metrics::{init_metrics, render_metrics, MetricsConfig, PrometheusMetricsSink};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Configuration for all telemetry subsystems.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Service name, attached to the startup log line.
    pub service_name: String,
    /// Logging configuration.
    pub logging: LogConfig,
    /// Metrics configuration.
    pub metrics: MetricsConfig,
}

impl TelemetryConfig {
    /// Development preset: pretty logs, metrics without a listener.
    pub fn development(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            logging: LogConfig::development(),
            metrics: MetricsConfig {
                enabled: true,
                addr: None,
            },
        }
    }

    /// Production preset: JSON logs, metrics on `0.0.0.0:9090`.
    pub fn production(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            logging: LogConfig::production(),
            metrics: MetricsConfig::default(),
        }
    }
}

/// Initializes logging, then metrics.
///
/// # Errors
///
/// Returns `TelemetryError` if any subsystem fails to initialize.
pub fn init_telemetry(config: &TelemetryConfig) -> TelemetryResult<()> {
    init_logging(&config.logging)?;
    init_metrics(&config.metrics)?;
    tracing::info!(service = %config.service_name, "telemetry initialized");
    Ok(())
}
