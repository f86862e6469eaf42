//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gate
//! service. All types derive Serde traits for deserialization from TOML.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::gate::{TransportSettings, DEFAULT_GATE_PREFIX, DEFAULT_UPSTREAM_HOST};

/// Root configuration for the gate service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GateServiceConfig {
    /// Listener configuration.
    pub listener: ListenerConfig,

    /// Upstream identity and gate routing.
    pub gate: GateSettings,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Inbound request limits.
    pub limits: LimitsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Gate settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GateSettings {
    /// Affiliate ID issued by the Vcms operator. Required.
    pub affiliate_id: String,

    /// Path segment that marks gate URLs (e.g. `/RWD/`).
    pub gate_prefix: String,

    /// Upstream Vcms host, optionally with a port.
    pub upstream_host: String,

    /// Scheme used for the gate URL when the request does not reveal one.
    /// Unset keeps the gate URL protocol-relative.
    pub default_scheme: Option<String>,

    /// Widget IDs requested for paths without a gate suffix.
    pub widgets: Vec<String>,

    /// Route upstream calls through `HTTP_PROXY`/`NO_PROXY` settings.
    pub use_system_proxy: bool,
}

impl Default for GateSettings {
    fn default() -> Self {
        Self {
            affiliate_id: String::new(),
            gate_prefix: DEFAULT_GATE_PREFIX.to_string(),
            upstream_host: DEFAULT_UPSTREAM_HOST.to_string(),
            default_scheme: None,
            widgets: Vec::new(),
            use_system_proxy: true,
        }
    }
}

/// Timeout configuration for upstream calls.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
        }
    }
}

impl GateServiceConfig {
    /// Transport limits for gate clients built from this config.
    pub fn transport_settings(&self) -> TransportSettings {
        TransportSettings {
            connect_timeout: Duration::from_secs(self.timeouts.connect_secs),
            request_timeout: Duration::from_secs(self.timeouts.request_secs),
            use_system_proxy: self.gate.use_system_proxy,
        }
    }
}

/// Inbound request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum buffered POST body in bytes.
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
