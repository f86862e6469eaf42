//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Reject empty gate identity values
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GateServiceConfig → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::GateServiceConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("gate.affiliate_id must not be empty")]
    EmptyAffiliateId,

    #[error("gate.gate_prefix must not be empty")]
    EmptyGatePrefix,

    #[error("gate.gate_prefix '{0}' must not contain '/'")]
    PrefixContainsSlash(String),

    #[error("gate.upstream_host must not be empty")]
    EmptyUpstreamHost,

    #[error("gate.default_scheme '{0}' must be http or https")]
    UnsupportedScheme(String),

    #[error("gate.widgets contains an empty id")]
    EmptyWidgetId,

    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),

    #[error("{field} '{value}' is not a socket address")]
    InvalidAddress { field: &'static str, value: String },
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &GateServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let gate = &config.gate;

    if gate.affiliate_id.trim().is_empty() {
        errors.push(ValidationError::EmptyAffiliateId);
    }
    if gate.gate_prefix.is_empty() {
        errors.push(ValidationError::EmptyGatePrefix);
    } else if gate.gate_prefix.contains('/') {
        errors.push(ValidationError::PrefixContainsSlash(gate.gate_prefix.clone()));
    }
    if gate.upstream_host.trim().is_empty() {
        errors.push(ValidationError::EmptyUpstreamHost);
    }
    if let Some(scheme) = &gate.default_scheme {
        if scheme != "http" && scheme != "https" {
            errors.push(ValidationError::UnsupportedScheme(scheme.clone()));
        }
    }
    if gate.widgets.iter().any(|w| w.trim().is_empty()) {
        errors.push(ValidationError::EmptyWidgetId);
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroValue("timeouts.connect_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroValue("timeouts.request_secs"));
    }
    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroValue("limits.max_body_bytes"));
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
