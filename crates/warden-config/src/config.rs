//! Main configuration struct.

use serde::{Deserialize, Serialize};

use crate::schema::{LogFormat, TelemetryConfigSection, WardenSection};
use crate::ConfigError;

/// Complete Warden configuration.
///
/// # Example
///
/// ```
/// use warden_config::WardenConfig;
///
/// let config = WardenConfig::default();
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct WardenConfig {
    /// Decision engine settings.
    #[serde(default)]
    pub warden: WardenSection,

    /// Telemetry settings.
    #[serde(default)]
    pub telemetry: TelemetryConfigSection,
}

impl WardenConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - The issuer is empty
    /// - The access token lifespan or collaborator timeout is zero
    /// - The metrics address is set but invalid
    /// - The log level is not a valid filter directive
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.warden.issuer.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "warden.issuer",
                "must not be empty",
            ));
        }

        if self.warden.access_token_lifespan_secs == 0 {
            return Err(ConfigError::invalid_value(
                "warden.access_token_lifespan_secs",
                "must be greater than zero",
            ));
        }

        if self.warden.collaborator_timeout_ms == 0 {
            return Err(ConfigError::invalid_value(
                "warden.collaborator_timeout_ms",
                "must be greater than zero",
            ));
        }

        if let Some(addr) = self
            .telemetry
            .metrics
            .addr
            .as_deref()
            .filter(|a| self.telemetry.metrics.enabled && !a.is_empty())
        {
            if addr.parse::<std::net::SocketAddr>().is_err() {
                return Err(ConfigError::invalid_value(
                    "telemetry.metrics.addr",
                    format!("invalid socket address: {addr}"),
                ));
            }
        }

        if self.telemetry.logging.enabled {
            warden_telemetry::logging::create_env_filter(&self.telemetry.logging.level)
                .map_err(|e| ConfigError::invalid_value("telemetry.logging.level", e.to_string()))?;
        }

        Ok(())
    }

    /// Development preset: pretty debug logs, short lifespan, metrics
    /// without a listener.
    ///
    /// ```
    /// use warden_config::WardenConfig;
    ///
    /// let config = WardenConfig::development();
    /// assert_eq!(config.telemetry.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();

        config.telemetry.logging.level = "debug".to_string();
        config.telemetry.logging.format = LogFormat::Pretty;
        config.telemetry.logging.include_location = true;
        config.telemetry.metrics.addr = None;

        config.warden.access_token_lifespan_secs = 600;

        config
    }

    /// Production preset: JSON info logs, metrics on `0.0.0.0:9090`.
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();

        config.telemetry.logging.level = "info".to_string();
        config.telemetry.logging.format = LogFormat::Json;
        config.telemetry.logging.include_location = false;

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(WardenConfig::default().validate().is_ok());
        assert!(WardenConfig::development().validate().is_ok());
        assert!(WardenConfig::production().validate().is_ok());
    }

    #[test]
    fn test_empty_issuer_rejected() {
        let mut config = WardenConfig::default();
        config.warden.issuer = "  ".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("warden.issuer"));
    }

    #[test]
    fn test_zero_lifespan_rejected() {
        let mut config = WardenConfig::default();
        config.warden.access_token_lifespan_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = WardenConfig::default();
        config.warden.collaborator_timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_metrics_addr_rejected() {
        let mut config = WardenConfig::default();
        config.telemetry.metrics.addr = Some("localhost".to_string());
        assert!(config.validate().is_err());

        config.telemetry.metrics.enabled = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bad_log_level_rejected() {
        let mut config = WardenConfig::default();
        config.telemetry.logging.level = "warden=loud".to_string();
        assert!(config.validate().is_err());
    }
}
