//! Typed configuration for the Warden.
//!
//! - TOML and JSON configuration files
//! - Environment variable overrides (`WARDEN__SECTION__KEY`)
//! - Strict validation (fails on unknown fields)
//! - Layered configuration (defaults → file → env)
//!
//! # Configuration File Format
//!
//! ```toml
//! [warden]
//! issuer = "https://auth.example.com"
//! access_token_lifespan_secs = 3600
//! collaborator_timeout_ms = 5000
//!
//! [telemetry]
//! service_name = "warden"
//!
//! [telemetry.logging]
//! level = "info"
//! format = "json"
//!
//! [telemetry.metrics]
//! enabled = true
//! addr = "0.0.0.0:9090"
//! ```

#![doc(html_root_url = "https://docs.rs/warden-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::WardenConfig;
pub use error::ConfigError;
pub use loader::{ConfigLoader, DEFAULT_ENV_PREFIX};
pub use schema::{LogFormat, LoggingConfig, MetricsConfig, TelemetryConfigSection, WardenSection};
