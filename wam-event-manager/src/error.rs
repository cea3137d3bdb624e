use thiserror::Error;

use crate::hub::ListenerId;

/// Errors that can occur in the notification hub
#[derive(Error, Debug)]
pub enum EventManagerError {
    /// A notification could not be encoded for the wire
    #[error("Failed to serialize notification: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The listener is not (or no longer) subscribed
    #[error("Listener {0} not found")]
    ListenerNotFound(ListenerId),

    /// The hub configuration is not usable
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Result type for Event Manager operations
pub type Result<T> = std::result::Result<T, EventManagerError>;
