//! Error types for the discovery system.

use std::fmt;

/// Error type for discovery operations.
///
/// Only socket-level failures escape a discovery round. Responses that fail to
/// parse and fallback connections that fail to connect are dropped inside the round.
#[derive(Debug)]
pub enum DiscoveryError {
    /// The multicast socket could not be created, configured or written to
    SocketError(String),
    /// The discovery configuration is not usable
    Configuration(String),
}

impl fmt::Display for DiscoveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscoveryError::SocketError(msg) => write!(f, "Discovery socket error: {}", msg),
            DiscoveryError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for DiscoveryError {}

/// Convenience Result type alias for discovery operations.
pub type Result<T> = std::result::Result<T, DiscoveryError>;
