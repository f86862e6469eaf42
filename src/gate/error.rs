//! Gate error definitions.

use thiserror::Error;

/// Errors that can occur while constructing or running the gate.
#[derive(Debug, Error)]
pub enum GateError {
    /// A required construction argument is empty.
    #[error("gate configuration error: {field} is empty")]
    Config { field: &'static str },

    /// Connection, DNS, TLS or protocol failure talking to the upstream.
    #[error("upstream transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Upstream did not answer within the configured request timeout.
    #[error("upstream timeout after {0} seconds")]
    Timeout(u64),

    /// The resolved upstream URL does not parse.
    #[error("invalid upstream url '{url}': {reason}")]
    InvalidUpstreamUrl { url: String, reason: String },

    /// Upstream answered 302 without anywhere to go.
    #[error("upstream redirect carried no Location header")]
    MissingRedirectLocation,

    /// Widget-mode body is not a JSON object.
    #[error("invalid widget payload: {0}")]
    WidgetPayload(String),
}

impl GateError {
    /// Whether the failure happened on the wire rather than in the gate itself.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            GateError::Transport(_) | GateError::Timeout(_) | GateError::MissingRedirectLocation
        )
    }
}

/// Result type for gate operations.
pub type GateResult<T> = Result<T, GateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GateError::Config { field: "affiliate_id" };
        assert_eq!(err.to_string(), "gate configuration error: affiliate_id is empty");

        let err = GateError::Timeout(30);
        assert_eq!(err.to_string(), "upstream timeout after 30 seconds");
        assert!(err.is_upstream());
        assert!(!GateError::WidgetPayload("x".into()).is_upstream());
    }
}
