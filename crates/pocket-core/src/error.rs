//! Error types for dispatch, relay and report operations.

use thiserror::Error;

/// Failures while reaching a node, the dispatcher or the report endpoint.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// HTTP request failed (connection refused, DNS, TLS, body read, etc.).
    #[error("HTTP error: {0}")]
    Http(String),

    /// The peer answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Request timed out after the configured duration.
    #[error("Request timed out after {ms}ms")]
    Timeout { ms: u64 },

    /// An unexpected error.
    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Returns `true` if the failure should be reported against the node
    /// that was being contacted.
    pub fn is_node_fault(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::Status { .. } | Self::Timeout { .. } | Self::Other(_)
        )
    }
}

/// Errors surfaced by the public PocketRelay operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PocketError {
    /// The relay failed local validation; nothing was sent.
    #[error("invalid relay: {0}")]
    InvalidRelay(String),

    /// The report failed local validation; nothing was sent.
    #[error("invalid report: {0}")]
    InvalidReport(String),

    /// No node serves the chain, even after a dispatch round.
    #[error("no node found for {chain} (net id {net_id})")]
    NodeNotFound { chain: String, net_id: String },

    /// The dispatch response could not be turned into a node pool.
    #[error("failed to parse node pool: {0}")]
    NodePoolParse(String),

    /// Network or timeout failure.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The node answered, but the answer is a JSON-RPC error.
    #[error("application error: {0}")]
    Application(String),

    /// Invalid configuration value.
    #[error("config error: {0}")]
    Config(String),

    /// Failure inside the ABI encoder/decoder.
    #[error("codec error: {0}")]
    Codec(String),

    /// Failure inside the wallet keystore.
    #[error("keystore error: {0}")]
    Keystore(String),
}

impl PocketError {
    /// Returns the underlying transport failure, if any.
    pub fn as_transport(&self) -> Option<&TransportError> {
        match self {
            Self::Transport(e) => Some(e),
            _ => None,
        }
    }

    /// Returns `true` if the error was produced before any network call.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidRelay(_) | Self::InvalidReport(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_error_display_is_transparent() {
        let err: PocketError = TransportError::Timeout { ms: 250 }.into();
        assert_eq!(err.to_string(), "Request timed out after 250ms");
        assert!(err.as_transport().is_some());
        assert!(!err.is_validation());
    }

    #[test]
    fn every_transport_failure_is_a_node_fault() {
        let all = [
            TransportError::Http("connection refused".into()),
            TransportError::Status {
                status: 502,
                body: "bad gateway".into(),
            },
            TransportError::Timeout { ms: 50 },
            TransportError::Other("broken pipe".into()),
        ];
        for err in all {
            assert!(err.is_node_fault(), "{err}");
        }
    }
}
